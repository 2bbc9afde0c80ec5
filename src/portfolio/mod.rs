mod duration;
mod load;

use eframe::egui::{Pos2, pos2};
use thiserror::Error;

use crate::taxonomy::{Taxonomy, UnknownMetric};

pub use duration::parse_duration;
pub use load::load_portfolio;

pub const SCORE_MIN: f32 = 0.0;
pub const SCORE_MAX: f32 = 10.0;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("`{0}` is not a number")]
    NotNumeric(String),
    #[error("{0} is outside the range 0 to 10")]
    OutOfRange(f32),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PortfolioError {
    #[error(transparent)]
    UnknownMetric(#[from] UnknownMetric),
    #[error("metric `{0}` appears more than once")]
    DuplicateMetric(String),
    #[error("invalid {field} for `{metric}`: {source}")]
    InvalidScore {
        metric: String,
        field: &'static str,
        source: ScoreError,
    },
    #[error("time for `{metric}` must not be negative, got {minutes}")]
    NegativeTime { metric: String, minutes: f64 },
}

pub fn validate_score(raw: &str) -> Result<f32, ScoreError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<f32>()
        .map_err(|_| ScoreError::NotNumeric(trimmed.to_owned()))?;
    check_score(value)
}

pub fn check_score(value: f32) -> Result<f32, ScoreError> {
    if !value.is_finite() {
        return Err(ScoreError::NotNumeric(value.to_string()));
    }
    if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
        return Err(ScoreError::OutOfRange(value));
    }
    Ok(value)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub metric: String,
    pub importance: f32,
    pub satisfaction: f32,
    pub minutes: f64,
}

impl Record {
    /// Panics on out-of-range scores or negative time.
    pub fn new(metric: impl Into<String>, importance: f32, satisfaction: f32, minutes: f64) -> Self {
        assert!(
            (SCORE_MIN..=SCORE_MAX).contains(&importance),
            "importance {importance} outside 0..=10"
        );
        assert!(
            (SCORE_MIN..=SCORE_MAX).contains(&satisfaction),
            "satisfaction {satisfaction} outside 0..=10"
        );
        assert!(
            minutes.is_finite() && minutes >= 0.0,
            "minutes {minutes} must be finite and non-negative"
        );

        Self {
            metric: metric.into(),
            importance,
            satisfaction,
            minutes,
        }
    }

    pub fn anchor(&self) -> Pos2 {
        pos2(self.satisfaction, self.importance)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Portfolio {
    records: Vec<Record>,
}

impl Portfolio {
    pub fn from_records(taxonomy: &Taxonomy, records: Vec<Record>) -> Result<Self, PortfolioError> {
        let mut ranked = Vec::with_capacity(records.len());
        for mut record in records {
            let metric = taxonomy.resolve_metric(&record.metric)?;
            record.metric.clone_from(&metric.name);
            let rank = taxonomy.catalog_index(&metric.name).unwrap_or(usize::MAX);
            if ranked.iter().any(|(other, _)| *other == rank) {
                return Err(PortfolioError::DuplicateMetric(record.metric));
            }
            ranked.push((rank, record));
        }

        ranked.sort_by_key(|(rank, _)| *rank);
        Ok(Self {
            records: ranked.into_iter().map(|(_, record)| record).collect(),
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_minutes(&self) -> f64 {
        self.records.iter().map(|record| record.minutes).sum()
    }
}
