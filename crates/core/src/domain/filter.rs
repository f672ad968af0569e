use crate::domain::option::OptionContract;
use serde::{Deserialize, Serialize};

/// Thresholds as the user typed them. Numeric fields stay strings until a
/// contract is tested against them.
///
/// A threshold is active when its string is non-empty, whether or not it
/// parses. An active threshold with no numeric prefix compares as NaN and so
/// rejects every contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub min_strike: String,
    #[serde(default)]
    pub max_strike: String,
    #[serde(default)]
    pub min_volume: String,
    #[serde(default, rename = "maxIV")]
    pub max_iv: String,
    #[serde(default)]
    pub itm_only: bool,
}

impl FilterCriteria {
    pub fn is_unconstrained(&self) -> bool {
        self.min_strike.is_empty()
            && self.max_strike.is_empty()
            && self.min_volume.is_empty()
            && self.max_iv.is_empty()
            && !self.itm_only
    }

    pub fn matches(&self, contract: &OptionContract) -> bool {
        bound(&self.min_strike, |min| contract.strike >= min)
            && bound(&self.max_strike, |max| contract.strike <= max)
            && bound(&self.min_volume, |min| contract.volume as f64 >= min)
            && bound(&self.max_iv, |max| contract.iv_percent() <= max)
            && (!self.itm_only || contract.in_the_money)
    }

    /// Stable subset of `contracts` satisfying every active threshold.
    pub fn apply(&self, contracts: &[OptionContract]) -> Vec<OptionContract> {
        contracts
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect()
    }
}

fn bound(raw: &str, check: impl FnOnce(f64) -> bool) -> bool {
    raw.is_empty() || check(parse_float_prefix(raw))
}

/// `parseFloat` semantics: skip leading whitespace, take the longest prefix
/// that reads as a decimal literal (optionally signed, optional fraction and
/// exponent, or `Infinity`), and return NaN when there is none.
pub fn parse_float_prefix(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    if s[i..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }

    if digits == 0 {
        return f64::NAN;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    s[..i].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(strike: f64, volume: u64, iv: f64, itm: bool) -> OptionContract {
        OptionContract {
            contract_symbol: None,
            strike,
            bid: 1.0,
            ask: 1.2,
            last_price: None,
            implied_volatility: iv,
            open_interest: 10,
            volume,
            in_the_money: itm,
        }
    }

    fn pair() -> Vec<OptionContract> {
        vec![
            contract(100.0, 50, 0.2, false),
            contract(150.0, 200, 0.5, true),
        ]
    }

    fn chain() -> Vec<OptionContract> {
        vec![
            contract(90.0, 0, 0.15, true),
            contract(100.0, 50, 0.2, false),
            contract(110.0, 500, 0.35, true),
            contract(120.0, 75, 0.45, false),
            contract(150.0, 200, 0.5, true),
        ]
    }

    #[test]
    fn min_strike_and_max_iv_exclude_both() {
        let criteria = FilterCriteria {
            min_strike: "120".into(),
            max_iv: "40".into(),
            ..Default::default()
        };
        assert!(criteria.apply(&pair()).is_empty());
    }

    #[test]
    fn itm_only_keeps_in_the_money() {
        let criteria = FilterCriteria {
            itm_only: true,
            ..Default::default()
        };
        let out = criteria.apply(&pair());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].strike, 150.0);
    }

    #[test]
    fn empty_criteria_is_identity() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unconstrained());
        assert_eq!(criteria.apply(&chain()), chain());
        assert!(criteria.apply(&[]).is_empty());
    }

    #[test]
    fn filtering_is_idempotent_and_order_preserving() {
        let criteria = FilterCriteria {
            min_strike: "95".into(),
            max_strike: "150".into(),
            min_volume: "50".into(),
            ..Default::default()
        };
        let once = criteria.apply(&chain());
        let strikes: Vec<f64> = once.iter().map(|c| c.strike).collect();
        assert_eq!(strikes, vec![100.0, 110.0, 120.0, 150.0]);
        assert_eq!(criteria.apply(&once), once);
    }

    #[test]
    fn output_is_exactly_the_matching_contracts() {
        let criteria = FilterCriteria {
            max_strike: "130".into(),
            max_iv: "40".into(),
            itm_only: true,
            ..Default::default()
        };
        let input = chain();
        let out = criteria.apply(&input);
        for c in &input {
            let expected = c.strike <= 130.0 && c.iv_percent() <= 40.0 && c.in_the_money;
            assert_eq!(out.contains(c), expected, "strike {}", c.strike);
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let criteria = FilterCriteria {
            min_strike: "100".into(),
            max_strike: "100".into(),
            min_volume: "50".into(),
            ..Default::default()
        };
        let out = criteria.apply(&chain());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].strike, 100.0);
    }

    #[test]
    fn non_numeric_threshold_rejects_everything() {
        let criteria = FilterCriteria {
            min_volume: "lots".into(),
            ..Default::default()
        };
        assert!(criteria.apply(&chain()).is_empty());

        let whitespace = FilterCriteria {
            max_strike: "   ".into(),
            ..Default::default()
        };
        assert!(whitespace.apply(&chain()).is_empty());
    }

    #[test]
    fn numeric_prefix_is_used() {
        let criteria = FilterCriteria {
            min_strike: " 120abc".into(),
            ..Default::default()
        };
        let strikes: Vec<f64> = criteria.apply(&chain()).iter().map(|c| c.strike).collect();
        assert_eq!(strikes, vec![120.0, 150.0]);
    }

    #[test]
    fn parse_float_prefix_follows_parse_float() {
        assert_eq!(parse_float_prefix("42"), 42.0);
        assert_eq!(parse_float_prefix("  -3.5e2xyz"), -350.0);
        assert_eq!(parse_float_prefix(".5"), 0.5);
        assert_eq!(parse_float_prefix("5."), 5.0);
        assert_eq!(parse_float_prefix("1e"), 1.0);
        assert_eq!(parse_float_prefix("+7"), 7.0);
        assert_eq!(parse_float_prefix("Infinity"), f64::INFINITY);
        assert_eq!(parse_float_prefix("-Infinityx"), f64::NEG_INFINITY);
        assert!(parse_float_prefix("").is_nan());
        assert!(parse_float_prefix(".").is_nan());
        assert!(parse_float_prefix("-").is_nan());
        assert!(parse_float_prefix("abc").is_nan());
    }

    #[test]
    fn decodes_criteria_wire_names() {
        let c: FilterCriteria =
            serde_json::from_str(r#"{"minStrike":"120","maxIV":"40","itmOnly":true}"#).unwrap();
        assert_eq!(c.min_strike, "120");
        assert_eq!(c.max_iv, "40");
        assert!(c.itm_only);
        assert!(c.max_strike.is_empty());
    }
}
