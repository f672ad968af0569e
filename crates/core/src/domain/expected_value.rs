use crate::domain::option::OptionSide;
use serde::{Deserialize, Serialize};

/// `GET /option_details/{symbol}/{expiration}/{strike}/{type}`. `iv` is in
/// percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDetails {
    pub premium: f64,
    pub stock_price: f64,
    pub iv: f64,
}

/// Body of `POST /calculate_ev`. Field names are the backend's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvRequest {
    #[serde(rename = "S")]
    pub stock_price: f64,
    #[serde(rename = "K")]
    pub strike: f64,
    #[serde(rename = "T")]
    pub years_to_expiration: f64,
    pub r: f64,
    pub sigma: f64,
    pub option_type: OptionSide,
    pub premium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvResult {
    pub ev: f64,
    pub probability: f64,
    pub delta: f64,
    pub max_loss: f64,
    pub max_gain: f64,
    pub breakeven: f64,
}

impl EvResult {
    /// Label/value pairs in display order.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Expected Value", dollars(self.ev)),
            ("Probability ITM", percent(self.probability)),
            ("Delta", percent(self.delta)),
            ("Max Loss", dollars(self.max_loss)),
            ("Max Gain", dollars(self.max_gain)),
            ("Breakeven", dollars(self.breakeven)),
        ]
    }
}

pub fn dollars(v: f64) -> String {
    if v < 0.0 {
        format!("-${:.2}", -v)
    } else {
        format!("${v:.2}")
    }
}

/// Fraction rendered as a percentage with two decimals.
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
