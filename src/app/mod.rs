use anyhow::{Result, anyhow};
use eframe::egui::{self, Context, Pos2, Sense, Ui};
use tracing::info;

use crate::chart::{Scene, SizeScaler};
use crate::portfolio::Portfolio;
use crate::taxonomy::Taxonomy;
use crate::util::{format_minutes, week_share};

mod render_utils;

use render_utils::{PlotTransform, draw_background, paint_scene};

/// Hover target for one bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleInfo {
    pub anchor: Pos2,
    pub area: f32,
    pub description: String,
}

pub fn bubbles_for(portfolio: &Portfolio, taxonomy: &Taxonomy, scaler: &SizeScaler) -> Vec<BubbleInfo> {
    portfolio
        .records()
        .iter()
        .map(|record| {
            let category = taxonomy
                .category_of(&record.metric)
                .map(|category| category.name.as_str())
                .unwrap_or("uncategorised");
            BubbleInfo {
                anchor: record.anchor(),
                area: scaler.scale(record.minutes) as f32,
                description: format!(
                    "{}\n{category}\nimportance {:.1}, satisfaction {:.1}\n{} ({})",
                    record.metric,
                    record.importance,
                    record.satisfaction,
                    format_minutes(record.minutes),
                    week_share(record.minutes)
                ),
            }
        })
        .collect()
}

pub struct PortfolioViewer {
    scene: Scene,
    bubbles: Vec<BubbleInfo>,
}

impl PortfolioViewer {
    pub fn new(_cc: &eframe::CreationContext<'_>, scene: Scene, bubbles: Vec<BubbleInfo>) -> Self {
        Self { scene, bubbles }
    }

    fn draw_chart(&self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        let transform = PlotTransform::fit(rect, self.scene.plot_size_pt());
        paint_scene(&painter, &transform, &self.scene);

        if let Some(pointer) = response.hover_pos()
            && let Some(bubble) = hovered_bubble(&self.bubbles, &transform, pointer)
        {
            response.on_hover_text_at_pointer(bubble.description.as_str());
        }
    }
}

/// The smallest bubble under the pointer, since it is drawn on top.
fn hovered_bubble<'a>(
    bubbles: &'a [BubbleInfo],
    transform: &PlotTransform,
    pointer: Pos2,
) -> Option<&'a BubbleInfo> {
    bubbles
        .iter()
        .filter_map(|bubble| {
            let radius = transform.marker_radius(bubble.area).max(4.0);
            let center = transform.to_screen(bubble.anchor);
            (center.distance(pointer) <= radius).then_some((radius, bubble))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, bubble)| bubble)
}

impl eframe::App for PortfolioViewer {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_chart(ui);
        });
    }
}

pub fn run_viewer(scene: Scene, bubbles: Vec<BubbleInfo>) -> Result<()> {
    info!(bubbles = bubbles.len(), "opening chart window");
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Strategic Life Portfolio",
        options,
        Box::new(move |cc| Ok(Box::new(PortfolioViewer::new(cc, scene, bubbles)))),
    )
    .map_err(|error| anyhow!("failed to open the chart window: {error}"))
}
