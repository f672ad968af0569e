use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which half of the chain a contract belongs to. The backend speaks in the
/// plural form ("calls"/"puts"); the singular is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    #[serde(alias = "call")]
    Calls,
    #[serde(alias = "put")]
    Puts,
}

impl OptionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSide::Calls => "calls",
            OptionSide::Puts => "puts",
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calls" | "call" => Ok(OptionSide::Calls),
            "puts" | "put" => Ok(OptionSide::Puts),
            other => Err(format!("unknown option side: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_symbol: Option<String>,
    pub strike: f64,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub implied_volatility: f64,
    #[serde(default, deserialize_with = "super::lenient_count")]
    pub open_interest: u64,
    #[serde(default, deserialize_with = "super::lenient_count")]
    pub volume: u64,
    #[serde(default)]
    pub in_the_money: bool,
}

impl OptionContract {
    /// Implied volatility in percent, the unit every view and the `maxIV`
    /// filter use.
    pub fn iv_percent(&self) -> f64 {
        self.implied_volatility * 100.0
    }
}

/// One expiration's slice of a symbol's chain, as returned by
/// `GET /options/{symbol}?expiration=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub expirations: Vec<String>,
    #[serde(default)]
    pub calls: Vec<OptionContract>,
    #[serde(default)]
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    pub fn side(&self, side: OptionSide) -> &[OptionContract] {
        match side {
            OptionSide::Calls => &self.calls,
            OptionSide::Puts => &self.puts,
        }
    }

    /// Server order is kept, so the default expiration is simply the first.
    pub fn default_expiration(&self) -> Option<&str> {
        self.expirations.first().map(String::as_str)
    }
}
