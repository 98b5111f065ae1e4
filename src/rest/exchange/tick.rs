//! Price tick size rules.

use rust_decimal::Decimal;

/// Minimum price increment for `market` at `price`.
///
/// Returns `None` for quote currencies without known rules.
pub fn tick_size(market: &str, price: Decimal) -> Option<Decimal> {
    let quote = market.split('-').next().unwrap_or(market);
    let at_least = |threshold: i64| price >= Decimal::from(threshold);

    let tick = match quote {
        "KRW" => {
            if at_least(2_000_000) {
                Decimal::from(1000)
            } else if at_least(1_000_000) {
                Decimal::from(500)
            } else if at_least(500_000) {
                Decimal::from(100)
            } else if at_least(100_000) {
                Decimal::from(50)
            } else if at_least(10_000) {
                Decimal::from(10)
            } else if at_least(1_000) {
                Decimal::from(5)
            } else if at_least(100) {
                Decimal::ONE
            } else {
                Decimal::new(1, 1)
            }
        }
        "BTC" => Decimal::new(1, 8),
        "USDT" => {
            if at_least(1000) {
                Decimal::ONE
            } else if at_least(100) {
                Decimal::new(1, 1)
            } else if at_least(10) {
                Decimal::new(1, 2)
            } else if at_least(1) {
                Decimal::new(1, 3)
            } else {
                Decimal::new(1, 4)
            }
        }
        _ => return None,
    };
    Some(tick)
}

/// Whether `price` is a multiple of the market's tick size.
///
/// Markets with unknown quote currencies always pass.
pub fn validate_price_tick(market: &str, price: Decimal) -> bool {
    tick_size(market, price).is_none_or(|tick| (price % tick).is_zero())
}
