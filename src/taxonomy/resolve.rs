use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use thiserror::Error;

use super::{Metric, Taxonomy};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown metric `{name}`{}", suggestion_hint(.suggestion))]
pub struct UnknownMetric {
    pub name: String,
    pub suggestion: Option<String>,
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(", did you mean `{name}`?"),
        None => String::new(),
    }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl Taxonomy {
    /// Exact name first, then a case-insensitive match. Anything else fails
    /// with the closest fuzzy match as a suggestion.
    pub fn resolve_metric(&self, query: &str) -> Result<&Metric, UnknownMetric> {
        let query = query.trim();
        if let Some(metric) = self.metric(query) {
            return Ok(metric);
        }

        if let Some(metric) = self
            .metrics
            .iter()
            .find(|metric| metric.name.eq_ignore_ascii_case(query))
        {
            return Ok(metric);
        }

        Err(UnknownMetric {
            name: query.to_owned(),
            suggestion: self.closest_metric(query).map(|metric| metric.name.clone()),
        })
    }

    fn closest_metric(&self, query: &str) -> Option<&Metric> {
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        let mut best: Option<(i64, &Metric)> = None;
        for metric in &self.metrics {
            let Some(score) = fuzzy_match_score(&matcher, &metric.name, query) else {
                continue;
            };
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, metric));
            }
        }
        best.map(|(_, metric)| metric)
    }
}
