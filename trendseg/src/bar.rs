use chrono::{DateTime, Utc};

/// One OHLCV observation. Timestamps are strictly increasing within a series
/// and `low <= open,close <= high`; both are enforced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: u64,
}

impl Bar {
    /// Bullish bar: close strictly above its own open.
    pub fn is_green(&self) -> bool {
        self.close_price > self.open_price
    }

    /// Bearish bar: close strictly below its own open.
    pub fn is_red(&self) -> bool {
        self.close_price < self.open_price
    }

    pub(crate) fn is_price_sane(&self) -> bool {
        let body_low = self.open_price.min(self.close_price);
        let body_high = self.open_price.max(self.close_price);
        self.low_price <= body_low && body_high <= self.high_price
    }
}
