use crate::domain::option::OptionSide;
use crate::domain::watchlist::WatchlistKey;
use serde::{Deserialize, Serialize};

const SHORT_ANALYSIS_MAX_CHARS: usize = 100;

/// One card of `GET /smart_suggestions`. `option_type` arrives singular
/// ("call"/"put") and is normalised by [`OptionSide`]'s aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub symbol: String,
    pub strike: f64,
    pub expiration: String,
    pub option_type: OptionSide,
    pub ev: f64,
    pub probability: f64,
    pub delta: f64,
    #[serde(default)]
    pub gpt_analysis: String,
}

impl Suggestion {
    pub fn watchlist_key(&self) -> WatchlistKey {
        WatchlistKey::option(&self.symbol, self.strike, &self.expiration, self.option_type)
    }

    /// First sentence of the analysis, capped at 100 characters.
    pub fn short_analysis(&self) -> String {
        let first = self.gpt_analysis.split('.').next().unwrap_or_default();
        let sentence = format!("{first}.");
        if sentence.chars().count() > SHORT_ANALYSIS_MAX_CHARS {
            let truncated: String = sentence.chars().take(SHORT_ANALYSIS_MAX_CHARS).collect();
            format!("{truncated}...")
        } else {
            sentence
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "{} ${} {} exp {} | EV: ${:.2} | Prob: {:.1}% | Δ: {:.2}",
            self.symbol,
            self.strike,
            self.option_type,
            self.expiration,
            self.ev,
            self.probability * 100.0,
            self.delta
        )
    }
}

/// `POST /ask_gpt`.
#[derive(Debug, Clone, Serialize)]
pub struct GptQuestion<'a> {
    pub question: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GptAnswer {
    pub response: String,
}
