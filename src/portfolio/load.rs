use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::taxonomy::Taxonomy;

use super::{Portfolio, PortfolioError, Record, check_score, parse_duration};

#[derive(Debug, Deserialize)]
struct PortfolioFile {
    entries: Vec<EntryFile>,
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    metric: String,
    importance: f32,
    satisfaction: f32,
    #[serde(default)]
    time: TimeField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeField {
    Minutes(f64),
    Token(String),
}

impl Default for TimeField {
    fn default() -> Self {
        Self::Minutes(0.0)
    }
}

impl EntryFile {
    fn into_record(self) -> Result<Record, PortfolioError> {
        let score = |field: &'static str, value: f32| {
            check_score(value).map_err(|source| PortfolioError::InvalidScore {
                metric: self.metric.clone(),
                field,
                source,
            })
        };
        let importance = score("importance", self.importance)?;
        let satisfaction = score("satisfaction", self.satisfaction)?;

        let minutes = match self.time {
            TimeField::Minutes(minutes) => minutes,
            TimeField::Token(token) => parse_duration(&token),
        };
        if minutes < 0.0 {
            return Err(PortfolioError::NegativeTime {
                metric: self.metric,
                minutes,
            });
        }

        Ok(Record::new(self.metric, importance, satisfaction, minutes))
    }
}

/// Parses `{"entries": [{"metric", "importance", "satisfaction", "time"}]}`.
/// `time` is either a duration token or a number of minutes.
pub fn parse_portfolio(raw: &str, taxonomy: &Taxonomy) -> Result<Portfolio> {
    let file: PortfolioFile = serde_json::from_str(raw).context("invalid portfolio JSON")?;

    let records = file
        .entries
        .into_iter()
        .map(EntryFile::into_record)
        .collect::<Result<Vec<_>, _>>()?;

    let portfolio = Portfolio::from_records(taxonomy, records)?;
    debug!(entries = portfolio.len(), "parsed portfolio");
    Ok(portfolio)
}

pub fn load_portfolio(path: &Path, taxonomy: &Taxonomy) -> Result<Portfolio> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read portfolio {}", path.display()))?;
    parse_portfolio(&raw, taxonomy)
        .with_context(|| format!("failed to load portfolio {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_tokens_and_minute_counts() {
        let taxonomy = Taxonomy::builtin();
        let portfolio = parse_portfolio(
            r#"{"entries": [
                {"metric": "Job/career", "importance": 7, "satisfaction": 4, "time": "40h"},
                {"metric": "Family", "importance": 9, "satisfaction": 6.5, "time": 90},
                {"metric": "Finances", "importance": 5, "satisfaction": 5}
            ]}"#,
            &taxonomy,
        )
        .unwrap();

        let records = portfolio.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].metric, "Family");
        assert_eq!(records[0].minutes, 90.0);
        assert_eq!(records[1].metric, "Job/career");
        assert_eq!(records[1].minutes, 2400.0);
        assert_eq!(records[2].minutes, 0.0);
    }

    #[test]
    fn unparseable_time_token_becomes_zero() {
        let taxonomy = Taxonomy::builtin();
        let portfolio = parse_portfolio(
            r#"{"entries": [{"metric": "Family", "importance": 1, "satisfaction": 1, "time": "soon"}]}"#,
            &taxonomy,
        )
        .unwrap();
        assert_eq!(portfolio.records()[0].minutes, 0.0);
    }

    #[test]
    fn overflowing_time_token_becomes_zero() {
        let taxonomy = Taxonomy::builtin();
        let raw = format!(
            r#"{{"entries": [{{"metric": "Family", "importance": 1, "satisfaction": 1, "time": "{}h"}}]}}"#,
            "9".repeat(400)
        );
        let portfolio = parse_portfolio(&raw, &taxonomy).unwrap();
        assert_eq!(portfolio.records()[0].minutes, 0.0);
    }

    #[test]
    fn rejects_out_of_range_scores_with_field_name() {
        let taxonomy = Taxonomy::builtin();
        let error = parse_portfolio(
            r#"{"entries": [{"metric": "Family", "importance": 12, "satisfaction": 1}]}"#,
            &taxonomy,
        )
        .unwrap_err();

        let error = error.downcast::<PortfolioError>().unwrap();
        assert!(matches!(
            error,
            PortfolioError::InvalidScore { field: "importance", .. }
        ));
    }

    #[test]
    fn rejects_negative_minutes() {
        let taxonomy = Taxonomy::builtin();
        let error = parse_portfolio(
            r#"{"entries": [{"metric": "Family", "importance": 1, "satisfaction": 1, "time": -5}]}"#,
            &taxonomy,
        )
        .unwrap_err();
        assert!(error.to_string().contains("must not be negative"));
    }

    #[test]
    fn unknown_metric_error_carries_a_suggestion() {
        let taxonomy = Taxonomy::builtin();
        let error = parse_portfolio(
            r#"{"entries": [{"metric": "Hobbies", "importance": 1, "satisfaction": 1}]}"#,
            &taxonomy,
        )
        .unwrap_err();
        assert!(error.to_string().contains("did you mean `Hobbies/interests`"));
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        fs::write(&path, "{ not json").unwrap();

        let error = load_portfolio(&path, &Taxonomy::builtin()).unwrap_err();
        assert!(error.to_string().contains("portfolio.json"));
        assert!(format!("{error:#}").contains("invalid portfolio JSON"));
    }
}
