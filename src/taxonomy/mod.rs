mod color;
mod resolve;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use eframe::egui::Color32;
use serde::Deserialize;
use serde_json::{Map, Value};

pub use color::{parse_color, to_hex};
pub use resolve::UnknownMetric;

/// A strategic life area grouping related metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub name: String,
    pub color: Color32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
    pub category: String,
}

/// Immutable metric catalog. Metric order is the catalog order used for
/// prompting and for ordering a portfolio.
#[derive(Clone, Debug, PartialEq)]
pub struct Taxonomy {
    categories: Vec<Category>,
    metrics: Vec<Metric>,
}

const BUILTIN_CATEGORIES: [(&str, Color32); 6] = [
    ("Relationships", Color32::from_rgb(255, 0, 0)),
    ("Body, mind, & spirituality", Color32::from_rgb(0, 0, 255)),
    ("Community & society", Color32::from_rgb(0, 128, 0)),
    ("Job, learning, & finances", Color32::from_rgb(255, 255, 0)),
    ("Interests & entertainment", Color32::from_rgb(128, 0, 128)),
    ("Personal care", Color32::from_rgb(128, 128, 128)),
];

const BUILTIN_METRICS: [(&str, &str); 16] = [
    ("Significant other", "Relationships"),
    ("Family", "Relationships"),
    ("Friendship", "Relationships"),
    ("Physical health/sports", "Body, mind, & spirituality"),
    ("Spirituality/faith", "Body, mind, & spirituality"),
    ("Mental health/mindfulness", "Body, mind, & spirituality"),
    ("Community/citizenship", "Community & society"),
    ("Societal engagement", "Community & society"),
    ("Job/career", "Job, learning, & finances"),
    ("Education/learning", "Job, learning, & finances"),
    ("Finances", "Job, learning, & finances"),
    ("Hobbies/interests", "Interests & entertainment"),
    ("Online entertainment", "Interests & entertainment"),
    ("Offline entertainment", "Interests & entertainment"),
    ("Physiological needs", "Personal care"),
    ("Activities of daily living", "Personal care"),
];

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    categories: Map<String, Value>,
    metrics: Map<String, Value>,
}

impl Taxonomy {
    pub fn new(categories: Vec<Category>, metrics: Vec<Metric>) -> Result<Self> {
        if categories.is_empty() {
            return Err(anyhow!("taxonomy defines no categories"));
        }
        if metrics.is_empty() {
            return Err(anyhow!("taxonomy defines no metrics"));
        }

        for (index, category) in categories.iter().enumerate() {
            if categories[..index]
                .iter()
                .any(|other| other.name == category.name)
            {
                return Err(anyhow!("category `{}` is defined twice", category.name));
            }
        }

        for (index, metric) in metrics.iter().enumerate() {
            if metrics[..index].iter().any(|other| other.name == metric.name) {
                return Err(anyhow!("metric `{}` is defined twice", metric.name));
            }
            if !categories.iter().any(|category| category.name == metric.category) {
                return Err(anyhow!(
                    "metric `{}` refers to unknown category `{}`",
                    metric.name,
                    metric.category
                ));
            }
        }

        Ok(Self {
            categories,
            metrics,
        })
    }

    /// The sixteen metrics across six strategic life areas.
    pub fn builtin() -> Self {
        Self {
            categories: BUILTIN_CATEGORIES
                .iter()
                .map(|(name, color)| Category {
                    name: (*name).to_owned(),
                    color: *color,
                })
                .collect(),
            metrics: BUILTIN_METRICS
                .iter()
                .map(|(name, category)| Metric {
                    name: (*name).to_owned(),
                    category: (*category).to_owned(),
                })
                .collect(),
        }
    }

    /// Parses `{"categories": {name: color}, "metrics": {name: category}}`,
    /// keeping the key order of both maps.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: TaxonomyFile = serde_json::from_str(raw).context("invalid taxonomy JSON")?;

        let mut categories = Vec::with_capacity(file.categories.len());
        for (name, value) in file.categories {
            let color = value
                .as_str()
                .ok_or_else(|| anyhow!("color of category `{name}` must be a string"))?;
            let color =
                parse_color(color).with_context(|| format!("invalid color for category `{name}`"))?;
            categories.push(Category { name, color });
        }

        let mut metrics = Vec::with_capacity(file.metrics.len());
        for (name, value) in file.metrics {
            let category = value
                .as_str()
                .ok_or_else(|| anyhow!("category of metric `{name}` must be a string"))?
                .to_owned();
            metrics.push(Metric { name, category });
        }

        Self::new(categories, metrics)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read taxonomy {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to load taxonomy {}", path.display()))
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.name == name)
    }

    pub fn catalog_index(&self, name: &str) -> Option<usize> {
        self.metrics.iter().position(|metric| metric.name == name)
    }

    pub fn category_of(&self, metric_name: &str) -> Option<&Category> {
        let metric = self.metric(metric_name)?;
        self.categories
            .iter()
            .find(|category| category.name == metric.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_consistent() {
        let taxonomy = Taxonomy::builtin();
        assert_eq!(taxonomy.metrics().len(), 16);
        assert_eq!(taxonomy.categories().len(), 6);
        let rebuilt = Taxonomy::new(
            taxonomy.categories().to_vec(),
            taxonomy.metrics().to_vec(),
        )
        .unwrap();
        assert_eq!(rebuilt, taxonomy);
    }

    #[test]
    fn every_metric_maps_to_one_category() {
        let taxonomy = Taxonomy::builtin();
        for metric in taxonomy.metrics() {
            let category = taxonomy.category_of(&metric.name).unwrap();
            assert_eq!(category.name, metric.category);
        }
        assert_eq!(
            taxonomy.category_of("Finances").unwrap().color,
            Color32::from_rgb(255, 255, 0)
        );
    }

    #[test]
    fn json_keeps_insertion_order() {
        let taxonomy = Taxonomy::from_json_str(
            r##"{
                "categories": {"Zeta": "navy", "Alpha": "#ff8800"},
                "metrics": {"Walking": "Zeta", "Reading": "Alpha", "Cooking": "Zeta"}
            }"##,
        )
        .unwrap();

        let names = taxonomy
            .metrics()
            .iter()
            .map(|metric| metric.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Walking", "Reading", "Cooking"]);
        assert_eq!(taxonomy.categories()[0].name, "Zeta");
        assert_eq!(taxonomy.catalog_index("Cooking"), Some(2));
        assert_eq!(
            taxonomy.category_of("Reading").unwrap().color,
            Color32::from_rgb(0xff, 0x88, 0x00)
        );
    }

    #[test]
    fn rejects_metric_with_unknown_category() {
        let error = Taxonomy::from_json_str(
            r#"{"categories": {"Work": "red"}, "metrics": {"Job": "Career"}}"#,
        )
        .unwrap_err();
        assert!(format!("{error:#}").contains("unknown category `Career`"));
    }

    #[test]
    fn rejects_bad_colors_and_empty_tables() {
        assert!(
            Taxonomy::from_json_str(r#"{"categories": {"Work": 3}, "metrics": {"Job": "Work"}}"#)
                .is_err()
        );
        assert!(Taxonomy::from_json_str(r#"{"categories": {}, "metrics": {}}"#).is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.json");
        fs::write(
            &path,
            r#"{"categories": {"Work": "red"}, "metrics": {"Job": "Work"}}"#,
        )
        .unwrap();

        let taxonomy = Taxonomy::load(&path).unwrap();
        assert_eq!(taxonomy.metric("Job").unwrap().category, "Work");

        let missing = Taxonomy::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(missing.to_string().contains("failed to read taxonomy"));
    }
}
