pub mod expected_value;
pub mod filter;
pub mod history;
pub mod option;
pub mod profile;
pub mod quote;
pub mod suggestion;
pub mod watchlist;

use serde::{Deserialize, Deserializer};

/// Uppercase, whitespace-trimmed ticker. Every symbol sent to the backend goes
/// through this first.
pub fn canonical_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

/// Non-negative count that the data source may send as null or as a float
/// (`123.0`). Null decodes as 0.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<f64>::deserialize(deserializer)?;
    Ok(v.filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n.round() as u64)
        .unwrap_or(0))
}
