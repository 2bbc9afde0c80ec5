mod layout;
mod raster;
mod render;
mod scale;
mod scene;
mod svg;

use tracing::info;

use crate::portfolio::Portfolio;
use crate::taxonomy::Taxonomy;

use render::ChartRenderer;

pub use layout::{
    DEFAULT_LABEL_OFFSET, DEFAULT_MAX_ITERATIONS, LayoutConfig, LayoutEngine, LayoutResult,
};
pub use scale::{DEFAULT_SCALE_K, SizeScaler, WEEK_MINUTES, marker_radius};
pub use scene::{ChartSurface, DrawOp, LineStyle, Scene};

pub const REFERENCE_PLOT_PT: f32 = 576.0;
pub const LABEL_FONT_PT: f32 = 9.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartConfig {
    pub scale_k: f64,
    pub week_minutes: f64,
    pub plot_size_pt: f32,
    pub layout: LayoutConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            scale_k: DEFAULT_SCALE_K,
            week_minutes: WEEK_MINUTES,
            plot_size_pt: REFERENCE_PLOT_PT,
            layout: LayoutConfig::for_font(LABEL_FONT_PT, REFERENCE_PLOT_PT),
        }
    }
}

/// A rendered chart: the recorded scene plus the label layout behind it.
#[derive(Clone, Debug)]
pub struct Chart {
    pub scene: Scene,
    pub layout: LayoutResult,
}

impl Chart {
    pub fn build(portfolio: &Portfolio, taxonomy: &Taxonomy, config: &ChartConfig) -> Self {
        let items = portfolio
            .records()
            .iter()
            .map(|record| (record.anchor(), record.metric.as_str()))
            .collect::<Vec<_>>();
        let layout = LayoutEngine::new(config.layout).layout(&items);
        info!(
            records = portfolio.len(),
            iterations = layout.iterations,
            converged = layout.converged,
            "laid out labels"
        );

        let renderer = ChartRenderer::new(SizeScaler::new(config.week_minutes, config.scale_k));
        let mut scene = Scene::new(config.plot_size_pt);
        renderer.render(portfolio, taxonomy, &layout, &mut scene);

        Self { scene, layout }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use eframe::egui::{Color32, Pos2};

    use super::*;
    use crate::portfolio::Record;
    use crate::taxonomy::{Category, Metric};

    fn two_metric_taxonomy() -> Taxonomy {
        Taxonomy::new(
            vec![
                Category {
                    name: "Left".to_owned(),
                    color: Color32::from_rgb(255, 0, 0),
                },
                Category {
                    name: "Right".to_owned(),
                    color: Color32::from_rgb(0, 0, 255),
                },
            ],
            vec![
                Metric {
                    name: "A".to_owned(),
                    category: "Left".to_owned(),
                },
                Metric {
                    name: "B".to_owned(),
                    category: "Right".to_owned(),
                },
            ],
        )
        .unwrap()
    }

    fn two_record_portfolio(taxonomy: &Taxonomy) -> Portfolio {
        Portfolio::from_records(
            taxonomy,
            vec![
                Record::new("A", 8.0, 3.0, 840.0),
                Record::new("B", 2.0, 8.0, 60.0),
            ],
        )
        .unwrap()
    }

    fn circles(scene: &Scene) -> Vec<(Pos2, f32)> {
        scene
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { center, area, .. } => Some((*center, *area)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn opposite_quadrant_scenario() {
        let taxonomy = two_metric_taxonomy();
        let portfolio = two_record_portfolio(&taxonomy);
        let chart = Chart::build(&portfolio, &taxonomy, &ChartConfig::default());

        assert!(chart.layout.converged);
        assert_eq!(chart.layout.overlapping_pairs, 0);

        let circles = circles(&chart.scene);
        assert_eq!(circles.len(), 2);
        let (a_center, a_area) = circles[0];
        let (b_center, b_area) = circles[1];
        assert!((a_area / b_area - 14.0).abs() < 1e-3);

        assert!(a_center.x < 5.0 && a_center.y > 5.0);
        assert!(b_center.x > 5.0 && b_center.y < 5.0);
    }

    #[test]
    fn saving_twice_is_byte_identical() {
        let taxonomy = two_metric_taxonomy();
        let portfolio = two_record_portfolio(&taxonomy);
        let dir = tempfile::tempdir().unwrap();

        let first = Chart::build(&portfolio, &taxonomy, &ChartConfig::default())
            .scene
            .save(dir.path(), "first.svg")
            .unwrap();
        let second = Chart::build(&portfolio, &taxonomy, &ChartConfig::default())
            .scene
            .save(dir.path(), "second.svg")
            .unwrap();

        let first = fs::read(first).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, fs::read(second).unwrap());
    }

    #[test]
    fn scale_constant_is_configurable() {
        let taxonomy = two_metric_taxonomy();
        let portfolio = two_record_portfolio(&taxonomy);
        let config = ChartConfig {
            scale_k: 10_000.0,
            ..ChartConfig::default()
        };

        let small = circles(&Chart::build(&portfolio, &taxonomy, &config).scene);
        let large = circles(&Chart::build(&portfolio, &taxonomy, &ChartConfig::default()).scene);
        assert!((large[0].1 / small[0].1 - 5.0).abs() < 1e-3);
    }

    #[test]
    fn full_catalog_renders_every_metric() {
        let taxonomy = Taxonomy::builtin();
        let records = taxonomy
            .metrics()
            .iter()
            .enumerate()
            .map(|(index, metric)| {
                let score = (index % 11) as f32;
                Record::new(metric.name.clone(), score, 10.0 - score, 30.0 * index as f64)
            })
            .collect();
        let portfolio = Portfolio::from_records(&taxonomy, records).unwrap();
        let chart = Chart::build(&portfolio, &taxonomy, &ChartConfig::default());

        assert_eq!(chart.layout.labels.len(), 16);
        assert_eq!(circles(&chart.scene).len(), 16);
        assert_eq!(chart.scene.legend().count(), 6);
    }
}
