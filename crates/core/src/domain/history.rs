use serde::{Deserialize, Serialize};

/// One row of `GET /option_price_history/{watchlistId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub recorded_at: String,
    pub premium: f64,
}

/// One row of `GET /option_ev_history/{watchlistId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvPoint {
    pub recorded_at: String,
    pub ev: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub points: usize,
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub first_at: String,
    pub last_at: String,
}

impl SeriesSummary {
    /// `None` for an empty series. Points are taken in server order.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut iter = points.into_iter();
        let (first_at, first) = iter.next()?;
        let mut summary = SeriesSummary {
            points: 1,
            first,
            last: first,
            min: first,
            max: first,
            first_at: first_at.to_string(),
            last_at: first_at.to_string(),
        };
        for (at, v) in iter {
            summary.points += 1;
            summary.last = v;
            summary.last_at = at.to_string();
            summary.min = summary.min.min(v);
            summary.max = summary.max.max(v);
        }
        Some(summary)
    }

    pub fn change(&self) -> f64 {
        self.last - self.first
    }
}

pub fn summarize_premiums(history: &[PricePoint]) -> Option<SeriesSummary> {
    SeriesSummary::from_points(history.iter().map(|p| (p.recorded_at.as_str(), p.premium)))
}

pub fn summarize_ev(history: &[EvPoint]) -> Option<SeriesSummary> {
    SeriesSummary::from_points(history.iter().map(|p| (p.recorded_at.as_str(), p.ev)))
}

/// Probability ITM series in percent.
pub fn summarize_probability(history: &[EvPoint]) -> Option<SeriesSummary> {
    SeriesSummary::from_points(
        history
            .iter()
            .map(|p| (p.recorded_at.as_str(), p.probability * 100.0)),
    )
}
