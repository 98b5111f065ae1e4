//! Upbit REST API endpoint constants.

/// Base URL for the Upbit REST API.
pub const UPBIT_BASE_URL: &str = "https://api.upbit.com";

/// Quotation endpoints (no authentication required).
pub mod quotation {
    /// List all markets.
    pub const MARKETS: &str = "/v1/market/all";
    /// Minute candles; the unit is appended as a path segment.
    pub const CANDLES_MINUTES: &str = "/v1/candles/minutes";
    /// Day candles.
    pub const CANDLES_DAYS: &str = "/v1/candles/days";
    /// Week candles.
    pub const CANDLES_WEEKS: &str = "/v1/candles/weeks";
    /// Month candles.
    pub const CANDLES_MONTHS: &str = "/v1/candles/months";
    /// Current ticker snapshot.
    pub const TICKER: &str = "/v1/ticker";
    /// Order book snapshot.
    pub const ORDERBOOK: &str = "/v1/orderbook";
    /// Recent trades.
    pub const TRADES: &str = "/v1/trades/ticks";
}

/// Exchange endpoints (authentication required).
pub mod exchange {
    /// Account balances.
    pub const ACCOUNTS: &str = "/v1/accounts";
    /// API key list.
    pub const API_KEYS: &str = "/v1/api_keys";
    /// Place an order (POST) or list orders (GET).
    pub const ORDERS: &str = "/v1/orders";
    /// Get (GET) or cancel (DELETE) a single order.
    pub const ORDER: &str = "/v1/order";
}

/// Deposit endpoints (authentication required).
pub mod deposit {
    /// List deposits.
    pub const DEPOSITS: &str = "/v1/deposits";
    /// Single deposit.
    pub const DEPOSIT: &str = "/v1/deposit";
    /// Request a deposit address.
    pub const GENERATE_COIN_ADDRESS: &str = "/v1/deposits/generate_coin_address";
    /// All deposit addresses.
    pub const COIN_ADDRESSES: &str = "/v1/deposits/coin_addresses";
    /// Deposit address for one currency.
    pub const COIN_ADDRESS: &str = "/v1/deposits/coin_address";
    /// Deposit KRW from the linked bank account.
    pub const KRW: &str = "/v1/deposits/krw";
}

/// Withdrawal endpoints (authentication required).
pub mod withdrawal {
    /// List withdrawals.
    pub const WITHDRAWS: &str = "/v1/withdraws";
    /// Single withdrawal.
    pub const WITHDRAW: &str = "/v1/withdraw";
    /// Withdrawal availability for a currency.
    pub const CHANCE: &str = "/v1/withdraws/chance";
    /// Withdraw a digital asset.
    pub const COIN: &str = "/v1/withdraws/coin";
    /// Withdraw KRW.
    pub const KRW: &str = "/v1/withdraws/krw";
}
