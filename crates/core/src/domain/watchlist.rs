use crate::domain::canonical_symbol;
use crate::domain::option::OptionSide;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The `type` query parameter of `GET /get_watchlist/{uid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchlistKind {
    Stocks,
    Options,
}

impl WatchlistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchlistKind::Stocks => "stocks",
            WatchlistKind::Options => "options",
        }
    }
}

impl fmt::Display for WatchlistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchlistKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" | "stock" => Ok(WatchlistKind::Stocks),
            "options" | "option" => Ok(WatchlistKind::Options),
            other => Err(format!("unknown watchlist kind: {other}")),
        }
    }
}

/// Identity of a watchlist row. Two rows with equal keys are the same row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKey", into = "RawKey")]
pub enum WatchlistKey {
    Stock {
        symbol: String,
    },
    Option {
        symbol: String,
        strike: f64,
        expiration: String,
        side: OptionSide,
    },
}

impl WatchlistKey {
    pub fn stock(symbol: &str) -> Self {
        WatchlistKey::Stock {
            symbol: canonical_symbol(symbol),
        }
    }

    pub fn option(symbol: &str, strike: f64, expiration: &str, side: OptionSide) -> Self {
        WatchlistKey::Option {
            symbol: canonical_symbol(symbol),
            strike,
            expiration: expiration.trim().to_string(),
            side,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            WatchlistKey::Stock { symbol } | WatchlistKey::Option { symbol, .. } => symbol,
        }
    }

    pub fn kind(&self) -> WatchlistKind {
        match self {
            WatchlistKey::Stock { .. } => WatchlistKind::Stocks,
            WatchlistKey::Option { .. } => WatchlistKind::Options,
        }
    }
}

impl fmt::Display for WatchlistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchlistKey::Stock { symbol } => f.write_str(symbol),
            WatchlistKey::Option {
                symbol,
                strike,
                expiration,
                side,
            } => write!(f, "{symbol} {strike} {side} exp {expiration}"),
        }
    }
}

/// Flat row shape shared by the watchlist endpoints: option fields are either
/// all present or all null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawKey {
    symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strike: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    option_type: Option<OptionSide>,
}

impl TryFrom<RawKey> for WatchlistKey {
    type Error = String;

    fn try_from(raw: RawKey) -> Result<Self, Self::Error> {
        match (raw.strike, raw.expiration, raw.option_type) {
            (None, None, None) => Ok(WatchlistKey::stock(&raw.symbol)),
            (Some(strike), Some(expiration), Some(side)) => {
                Ok(WatchlistKey::option(&raw.symbol, strike, &expiration, side))
            }
            _ => Err(format!(
                "watchlist row for {} has a partial option key",
                raw.symbol
            )),
        }
    }
}

impl From<WatchlistKey> for RawKey {
    fn from(key: WatchlistKey) -> Self {
        match key {
            WatchlistKey::Stock { symbol } => RawKey {
                symbol,
                strike: None,
                expiration: None,
                option_type: None,
            },
            WatchlistKey::Option {
                symbol,
                strike,
                expiration,
                side,
            } => RawKey {
                symbol,
                strike: Some(strike),
                expiration: Some(expiration),
                option_type: Some(side),
            },
        }
    }
}

/// One row of `GET /get_watchlist/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub key: WatchlistKey,
    #[serde(default)]
    pub added_at: Option<String>,
}

impl WatchlistEntry {
    pub fn new(key: WatchlistKey) -> Self {
        Self {
            id: None,
            key,
            added_at: None,
        }
    }
}

/// Body of `POST /add_to_watchlist/` and `DELETE /remove_from_watchlist/`.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistMutation<'a> {
    pub firebase_uid: &'a str,
    #[serde(flatten)]
    pub key: &'a WatchlistKey,
}

/// True when `snapshot` holds a row whose key equals `candidate`. Stock keys
/// compare on symbol alone; option keys compare all four fields exactly.
pub fn is_in_watchlist(candidate: &WatchlistKey, snapshot: &[WatchlistEntry]) -> bool {
    snapshot.iter().any(|entry| &entry.key == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_stock_and_option_rows() {
        let rows: Vec<WatchlistEntry> = serde_json::from_value(json!([
            {"id": 1, "symbol": "aapl", "option_type": null, "strike": null, "expiration": null, "added_at": "2024-05-01T10:00:00"},
            {"id": 2, "symbol": "TSLA", "option_type": "puts", "strike": 180.0, "expiration": "2024-06-21"}
        ]))
        .unwrap();

        assert_eq!(rows[0].id, Some(1));
        assert_eq!(rows[0].key, WatchlistKey::stock("AAPL"));
        assert_eq!(
            rows[1].key,
            WatchlistKey::option("TSLA", 180.0, "2024-06-21", OptionSide::Puts)
        );
        assert_eq!(rows[1].key.kind(), WatchlistKind::Options);
    }

    #[test]
    fn rejects_partial_option_rows() {
        let res = serde_json::from_value::<WatchlistEntry>(json!({
            "id": 3, "symbol": "TSLA", "strike": 180.0
        }));
        assert!(res.is_err());
    }

    #[test]
    fn mutation_body_is_flat() {
        let key = WatchlistKey::option("spy", 450.0, "2024-06-21", OptionSide::Calls);
        let body = serde_json::to_value(WatchlistMutation {
            firebase_uid: "uid-1",
            key: &key,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "firebase_uid": "uid-1",
                "symbol": "SPY",
                "strike": 450.0,
                "expiration": "2024-06-21",
                "option_type": "calls"
            })
        );

        let stock = WatchlistKey::stock("spy");
        let body = serde_json::to_value(WatchlistMutation {
            firebase_uid: "uid-1",
            key: &stock,
        })
        .unwrap();
        assert_eq!(body["symbol"], "SPY");
        assert!(body["strike"].is_null());
    }

    #[test]
    fn membership_is_exact_key_equality() {
        let snapshot = vec![
            WatchlistEntry::new(WatchlistKey::stock("AAPL")),
            WatchlistEntry::new(WatchlistKey::option(
                "AAPL",
                150.0,
                "2025-01-17",
                OptionSide::Calls,
            )),
        ];

        assert!(is_in_watchlist(&WatchlistKey::stock("aapl"), &snapshot));
        assert!(!is_in_watchlist(&WatchlistKey::stock("MSFT"), &snapshot));
        assert!(is_in_watchlist(
            &WatchlistKey::option("AAPL", 150.0, "2025-01-17", OptionSide::Calls),
            &snapshot
        ));
        assert!(!is_in_watchlist(
            &WatchlistKey::option("AAPL", 150.0, "2025-01-17", OptionSide::Puts),
            &snapshot
        ));
        assert!(!is_in_watchlist(
            &WatchlistKey::option("AAPL", 150.01, "2025-01-17", OptionSide::Calls),
            &snapshot
        ));
        assert!(!is_in_watchlist(&WatchlistKey::stock("AAPL"), &[]));
    }
}
