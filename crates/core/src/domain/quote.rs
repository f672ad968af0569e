use serde::{Deserialize, Serialize};

/// One stock snapshot as returned by `GET /stocks/{symbol}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub price_change: f64,
    pub percent_change: f64,
    #[serde(default, deserialize_with = "super::lenient_count")]
    pub volume: u64,
}

impl Quote {
    /// `(price_change / previous_close) * 100`, recomputed locally. `None` when
    /// the previous close is zero.
    pub fn derived_percent_change(&self) -> Option<f64> {
        if self.previous_close == 0.0 {
            return None;
        }
        Some(self.price_change / self.previous_close * 100.0)
    }

    /// Uses the derived percentage, or the server's when there is no
    /// previous close to derive from.
    pub fn change_line(&self) -> String {
        let pct = self
            .derived_percent_change()
            .unwrap_or(self.percent_change);
        format!("Change: ${:.2} ({pct:.2}%)", self.price_change)
    }
}
