//! Rounding helpers for USDT amounts.
//!
//! Order amounts are quoted to 2 decimal places, commissions and balances to
//! 3 (matching the settlement precision the platform advertises).

/// Round to 2 decimal places (order amounts, unit prices).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 3 decimal places (commissions, balances, deficits).
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
