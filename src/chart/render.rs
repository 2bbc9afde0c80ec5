use eframe::egui::{Color32, pos2};
use tracing::warn;

use crate::portfolio::Portfolio;
use crate::taxonomy::Taxonomy;

use super::layout::LayoutResult;
use super::scale::SizeScaler;
use super::scene::{Axes, ChartSurface, LineStyle};

const QUADRANT_SPLIT: f32 = 5.0;
const FALLBACK_COLOR: Color32 = Color32::from_rgb(128, 128, 128);

/// Draws a portfolio and its label layout onto a [`ChartSurface`].
#[derive(Clone, Debug, Default)]
pub struct ChartRenderer {
    scaler: SizeScaler,
    axes: Axes,
}

impl ChartRenderer {
    pub fn new(scaler: SizeScaler) -> Self {
        Self {
            scaler,
            axes: Axes::default(),
        }
    }

    /// Larger bubbles are drawn first so smaller ones stay visible on top.
    /// Legend entries follow the first appearance of each category in that
    /// draw order.
    pub fn render(
        &self,
        portfolio: &Portfolio,
        taxonomy: &Taxonomy,
        layout: &LayoutResult,
        surface: &mut dyn ChartSurface,
    ) {
        surface.draw_axes(&self.axes);
        for &tick in &self.axes.ticks {
            surface.draw_line(pos2(tick, 0.0), pos2(tick, 10.0), LineStyle::Grid);
            surface.draw_line(pos2(0.0, tick), pos2(10.0, tick), LineStyle::Grid);
        }

        let records = portfolio.records();
        let mut draw_order = (0..records.len()).collect::<Vec<_>>();
        draw_order.sort_by(|&a, &b| records[b].minutes.total_cmp(&records[a].minutes));

        let mut legend: Vec<(&str, Color32)> = Vec::new();
        for index in draw_order {
            let record = &records[index];
            let (category, color) = match taxonomy.category_of(&record.metric) {
                Some(category) => (category.name.as_str(), category.color),
                None => {
                    warn!(metric = %record.metric, "metric has no category, drawing it grey");
                    (record.metric.as_str(), FALLBACK_COLOR)
                }
            };

            let area = self.scaler.scale(record.minutes) as f32;
            surface.draw_circle(record.anchor(), area, color);

            if let Some(label) = layout.label(index) {
                let [from, to] = label.leader_line();
                surface.draw_line(from, to, LineStyle::Leader);
                surface.draw_text(label.position(), &label.text);
            }

            if !legend.iter().any(|(name, _)| *name == category) {
                legend.push((category, color));
            }
        }

        surface.draw_line(
            pos2(QUADRANT_SPLIT, 0.0),
            pos2(QUADRANT_SPLIT, 10.0),
            LineStyle::Quadrant,
        );
        surface.draw_line(
            pos2(0.0, QUADRANT_SPLIT),
            pos2(10.0, QUADRANT_SPLIT),
            LineStyle::Quadrant,
        );

        for (name, color) in legend {
            surface.add_legend_entry(name, color);
        }
    }
}
