//! Engine constants.

/// Once-per-day task ceiling; the 26th request returns "no more tasks".
pub const MAX_TASKS_PER_DAY: u32 = 25;

/// Floor for randomly drawn order amounts (USDT).
pub const MIN_ORDER_AMOUNT: f64 = 10.0;

/// Cap for randomly drawn order amounts (USDT).
pub const ORDER_AMOUNT_CAP: f64 = 120.0;

/// Random draws span `[balance * LOW, balance * HIGH]` before clamping.
pub const DRAW_LOW_FRACTION: f64 = 0.25;
pub const DRAW_HIGH_FRACTION: f64 = 0.75;

/// Balance bracket boundaries for the three store tiers. Brackets are
/// contiguous: amazon runs up to the alibaba minimum, alibaba up to the
/// aliexpress minimum, so every balance qualifies for exactly one tier.
pub const ALIBABA_MIN_BALANCE: f64 = 499.0;
pub const ALIEXPRESS_MIN_BALANCE: f64 = 901.0;

/// Per-tier commission rates, as advertised to users.
pub const AMAZON_COMMISSION_RATE: f64 = 0.04;
pub const ALIBABA_COMMISSION_RATE: f64 = 0.08;
pub const ALIEXPRESS_COMMISSION_RATE: f64 = 0.12;
