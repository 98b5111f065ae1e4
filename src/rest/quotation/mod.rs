//! Quotation (market data) REST endpoints, no authentication required.

mod types;

pub use types::*;

use crate::error::UpbitError;
use crate::rest::UpbitRestClient;
use crate::rest::client::QueryParams;
use crate::rest::endpoints::quotation;

impl UpbitRestClient {
    /// List all markets.
    ///
    /// With `is_details`, each market also carries its warning flag.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use upbit_api_client::rest::UpbitRestClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = UpbitRestClient::new();
    ///     let krw: Vec<_> = client
    ///         .markets(false)
    ///         .await?
    ///         .into_iter()
    ///         .filter(|m| m.quote_currency() == "KRW")
    ///         .collect();
    ///     println!("{} KRW markets", krw.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn markets(&self, is_details: bool) -> Result<Vec<Market>, UpbitError> {
        let query = QueryParams::new().push("isDetails", is_details);
        self.public_get(quotation::MARKETS, query).await
    }

    /// Get minute candles.
    ///
    /// `unit` must be one of [`MINUTE_UNITS`].
    pub async fn minute_candles(
        &self,
        unit: u32,
        request: &CandlesRequest,
    ) -> Result<Vec<MinuteCandle>, UpbitError> {
        if !MINUTE_UNITS.contains(&unit) {
            return Err(UpbitError::Validation(format!(
                "Invalid minute unit {unit}, expected one of {MINUTE_UNITS:?}"
            )));
        }
        let path = format!("{}/{}", quotation::CANDLES_MINUTES, unit);
        self.public_get(&path, candles_query(request)).await
    }

    /// Get day candles.
    ///
    /// # Arguments
    ///
    /// * `request` - Market and paging parameters.
    /// * `converting_price_unit` - Also report closes converted to this
    ///   currency (e.g. `KRW` for BTC markets).
    pub async fn day_candles(
        &self,
        request: &CandlesRequest,
        converting_price_unit: Option<&str>,
    ) -> Result<Vec<DayCandle>, UpbitError> {
        let query = candles_query(request).push_opt("convertingPriceUnit", converting_price_unit);
        self.public_get(quotation::CANDLES_DAYS, query).await
    }

    /// Get week candles.
    pub async fn week_candles(
        &self,
        request: &CandlesRequest,
    ) -> Result<Vec<PeriodCandle>, UpbitError> {
        self.public_get(quotation::CANDLES_WEEKS, candles_query(request))
            .await
    }

    /// Get month candles.
    pub async fn month_candles(
        &self,
        request: &CandlesRequest,
    ) -> Result<Vec<PeriodCandle>, UpbitError> {
        self.public_get(quotation::CANDLES_MONTHS, candles_query(request))
            .await
    }

    /// Get ticker snapshots for one or more markets.
    pub async fn tickers<S: AsRef<str>>(&self, markets: &[S]) -> Result<Vec<Ticker>, UpbitError> {
        let query = markets_query(markets)?;
        self.public_get(quotation::TICKER, query).await
    }

    /// Get order book snapshots for one or more markets.
    pub async fn orderbooks<S: AsRef<str>>(
        &self,
        markets: &[S],
    ) -> Result<Vec<Orderbook>, UpbitError> {
        let query = markets_query(markets)?;
        self.public_get(quotation::ORDERBOOK, query).await
    }

    /// Get recent trades for a market.
    pub async fn trades(&self, request: &TradesRequest) -> Result<Vec<Trade>, UpbitError> {
        let query = QueryParams::new()
            .push("market", &request.market)
            .push_opt("to", request.to.as_deref())
            .push_opt("count", request.count)
            .push_opt("cursor", request.cursor.as_deref())
            .push_opt("daysAgo", request.days_ago);
        self.public_get(quotation::TRADES, query).await
    }
}

fn candles_query(request: &CandlesRequest) -> QueryParams {
    QueryParams::new()
        .push("market", &request.market)
        .push_opt("to", request.to.as_deref())
        .push_opt("count", request.count)
}

fn markets_query<S: AsRef<str>>(markets: &[S]) -> Result<QueryParams, UpbitError> {
    if markets.is_empty() {
        return Err(UpbitError::Validation(
            "At least one market must be provided".to_string(),
        ));
    }
    Ok(QueryParams::new().push_joined("markets", markets))
}
