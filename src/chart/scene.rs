use std::path::{Path, PathBuf};

use anyhow::Result;
use eframe::egui::{Color32, Pos2};

use super::svg::{SvgGeometry, SvgSurface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Leader,
    Quadrant,
    Grid,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axes {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub ticks: Vec<f32>,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            title: "Strategic Life Portfolio".to_owned(),
            x_label: "Satisfaction".to_owned(),
            y_label: "Importance".to_owned(),
            ticks: (0..=10).map(|tick| tick as f32).collect(),
        }
    }
}

/// Positions are chart-plane coordinates, y up.
pub trait ChartSurface {
    fn draw_axes(&mut self, axes: &Axes);
    fn draw_circle(&mut self, center: Pos2, area: f32, fill: Color32);
    fn draw_line(&mut self, from: Pos2, to: Pos2, style: LineStyle);
    fn draw_text(&mut self, origin: Pos2, text: &str);
    fn add_legend_entry(&mut self, label: &str, color: Color32);
    fn save(&mut self, dir: &Path, file_name: &str) -> Result<PathBuf>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Axes(Axes),
    Circle {
        center: Pos2,
        area: f32,
        fill: Color32,
    },
    Line {
        from: Pos2,
        to: Pos2,
        style: LineStyle,
    },
    Text {
        origin: Pos2,
        text: String,
    },
    LegendEntry {
        label: String,
        color: Color32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    plot_size_pt: f32,
    ops: Vec<DrawOp>,
}

impl Scene {
    pub fn new(plot_size_pt: f32) -> Self {
        Self {
            plot_size_pt,
            ops: Vec::new(),
        }
    }

    pub fn plot_size_pt(&self) -> f32 {
        self.plot_size_pt
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn legend(&self) -> impl Iterator<Item = (&str, Color32)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::LegendEntry { label, color } => Some((label.as_str(), *color)),
            _ => None,
        })
    }

    pub fn replay(&self, surface: &mut dyn ChartSurface) {
        for op in &self.ops {
            match op {
                DrawOp::Axes(axes) => surface.draw_axes(axes),
                DrawOp::Circle { center, area, fill } => surface.draw_circle(*center, *area, *fill),
                DrawOp::Line { from, to, style } => surface.draw_line(*from, *to, *style),
                DrawOp::Text { origin, text } => surface.draw_text(*origin, text),
                DrawOp::LegendEntry { label, color } => surface.add_legend_entry(label, *color),
            }
        }
    }
}

impl ChartSurface for Scene {
    fn draw_axes(&mut self, axes: &Axes) {
        self.ops.push(DrawOp::Axes(axes.clone()));
    }

    fn draw_circle(&mut self, center: Pos2, area: f32, fill: Color32) {
        self.ops.push(DrawOp::Circle { center, area, fill });
    }

    fn draw_line(&mut self, from: Pos2, to: Pos2, style: LineStyle) {
        self.ops.push(DrawOp::Line { from, to, style });
    }

    fn draw_text(&mut self, origin: Pos2, text: &str) {
        self.ops.push(DrawOp::Text {
            origin,
            text: text.to_owned(),
        });
    }

    fn add_legend_entry(&mut self, label: &str, color: Color32) {
        self.ops.push(DrawOp::LegendEntry {
            label: label.to_owned(),
            color,
        });
    }

    fn save(&mut self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        let mut svg = SvgSurface::new(SvgGeometry::for_plot(self.plot_size_pt));
        self.replay(&mut svg);
        svg.save(dir, file_name)
    }
}
