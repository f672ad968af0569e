use crate::backend::{ApiError, ApiResult, BackendApi};
use crate::domain::expected_value::{EvRequest, EvResult, OptionDetails};
use crate::domain::option::OptionSide;
use crate::domain::watchlist::WatchlistKey;
use crate::time::expiry::{parse_expiration, years_to_expiration};
use chrono::{DateTime, Utc};

/// The contract an EV session is about.
#[derive(Debug, Clone, PartialEq)]
pub struct EvTarget {
    pub symbol: String,
    pub strike: f64,
    pub expiration: String,
    pub side: OptionSide,
}

impl EvTarget {
    /// `None` for stock keys.
    pub fn from_key(key: &WatchlistKey) -> Option<Self> {
        match key {
            WatchlistKey::Option {
                symbol,
                strike,
                expiration,
                side,
            } => Some(Self {
                symbol: symbol.clone(),
                strike: *strike,
                expiration: expiration.clone(),
                side: *side,
            }),
            WatchlistKey::Stock { .. } => None,
        }
    }
}

/// User-editable calculator inputs, kept as typed. `iv` and
/// `risk_free_rate` are percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct EvInputs {
    pub stock_price: String,
    pub premium: String,
    pub iv: String,
    pub risk_free_rate: String,
}

impl EvInputs {
    pub fn from_details(details: &OptionDetails, risk_free_rate_pct: f64) -> Self {
        Self {
            stock_price: details.stock_price.to_string(),
            premium: details.premium.to_string(),
            iv: details.iv.to_string(),
            risk_free_rate: risk_free_rate_pct.to_string(),
        }
    }

    pub fn to_request(&self, target: &EvTarget, now: DateTime<Utc>) -> ApiResult<EvRequest> {
        let stock_price = number("stock price", &self.stock_price)?;
        let premium = number("premium", &self.premium)?;
        let iv = number("implied volatility", &self.iv)?;
        let rate = number("risk-free rate", &self.risk_free_rate)?;
        let expiration = parse_expiration(&target.expiration)
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(EvRequest {
            stock_price,
            strike: target.strike,
            years_to_expiration: years_to_expiration(expiration, now),
            r: rate / 100.0,
            sigma: iv / 100.0,
            option_type: target.side,
            premium,
        })
    }
}

fn number(label: &str, raw: &str) -> ApiResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::Validation(format!("{label} must be a number, got {raw:?}")))
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvState {
    Idle,
    OptionSelected {
        target: EvTarget,
    },
    DetailsLoaded {
        target: EvTarget,
        details: OptionDetails,
        inputs: EvInputs,
    },
    ResultComputed {
        target: EvTarget,
        details: OptionDetails,
        inputs: EvInputs,
        result: EvResult,
    },
}

/// One run of the EV calculator. Failures fall back to the last stable
/// state: a failed details fetch stays in `OptionSelected`, a failed compute
/// in `DetailsLoaded`.
#[derive(Debug)]
pub struct EvSession {
    state: EvState,
    default_rate_pct: f64,
}

impl EvSession {
    pub fn new(default_rate_pct: f64) -> Self {
        Self {
            state: EvState::Idle,
            default_rate_pct,
        }
    }

    pub fn state(&self) -> &EvState {
        &self.state
    }

    pub fn target(&self) -> Option<&EvTarget> {
        match &self.state {
            EvState::Idle => None,
            EvState::OptionSelected { target }
            | EvState::DetailsLoaded { target, .. }
            | EvState::ResultComputed { target, .. } => Some(target),
        }
    }

    pub fn inputs(&self) -> Option<&EvInputs> {
        match &self.state {
            EvState::DetailsLoaded { inputs, .. } | EvState::ResultComputed { inputs, .. } => {
                Some(inputs)
            }
            _ => None,
        }
    }

    pub fn inputs_mut(&mut self) -> Option<&mut EvInputs> {
        match &mut self.state {
            EvState::DetailsLoaded { inputs, .. } | EvState::ResultComputed { inputs, .. } => {
                Some(inputs)
            }
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&EvResult> {
        match &self.state {
            EvState::ResultComputed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Starts over with a new contract, whatever the current state.
    pub fn select(&mut self, target: EvTarget) {
        self.state = EvState::OptionSelected { target };
    }

    /// Fetches market details for the selected contract and seeds the inputs
    /// from them.
    pub async fn load_details(&mut self, backend: &dyn BackendApi) -> ApiResult<OptionDetails> {
        let target = self
            .target()
            .cloned()
            .ok_or_else(|| ApiError::Validation("select an option first".into()))?;
        self.state = EvState::OptionSelected {
            target: target.clone(),
        };

        let details = backend
            .option_details(&target.symbol, &target.expiration, target.strike, target.side)
            .await
            .inspect_err(|err| {
                tracing::warn!(symbol = %target.symbol, error = %err, "option details unavailable");
            })?;

        let inputs = EvInputs::from_details(&details, self.default_rate_pct);
        self.state = EvState::DetailsLoaded {
            target,
            details: details.clone(),
            inputs,
        };
        Ok(details)
    }

    /// Validates the inputs and asks the backend for the EV. Recomputing from
    /// `ResultComputed` is allowed; any failure drops back to `DetailsLoaded`.
    pub async fn compute(
        &mut self,
        backend: &dyn BackendApi,
        now: DateTime<Utc>,
    ) -> ApiResult<EvResult> {
        let (target, details, inputs) = match &self.state {
            EvState::DetailsLoaded {
                target,
                details,
                inputs,
            }
            | EvState::ResultComputed {
                target,
                details,
                inputs,
                ..
            } => (target.clone(), details.clone(), inputs.clone()),
            _ => return Err(ApiError::Validation("load the option details first".into())),
        };
        self.state = EvState::DetailsLoaded {
            target: target.clone(),
            details: details.clone(),
            inputs: inputs.clone(),
        };

        let request = inputs.to_request(&target, now)?;
        tracing::debug!(symbol = %target.symbol, t = request.years_to_expiration, "calculating EV");
        let result = backend.calculate_ev(&request).await?;

        self.state = EvState::ResultComputed {
            target,
            details,
            inputs,
            result: result.clone(),
        };
        Ok(result)
    }
}
