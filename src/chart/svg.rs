use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use eframe::egui::{Color32, Pos2};
use tracing::debug;

use crate::taxonomy::to_hex;
use crate::util::escape_xml;

use super::raster::{PNG_PIXELS_PER_PT, rasterize_svg, write_png};
use super::scale::marker_radius;
use super::scene::{Axes, ChartSurface, LineStyle};

const PLANE_MAX: f32 = 10.0;

/// Page layout in SVG user units, one unit per point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgGeometry {
    pub plot_size: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub legend_gap: f32,
    pub legend_width: f32,
    pub label_font: f32,
}

impl SvgGeometry {
    pub fn for_plot(plot_size: f32) -> Self {
        Self {
            plot_size,
            margin_left: 70.0,
            margin_top: 50.0,
            margin_bottom: 60.0,
            legend_gap: 24.0,
            legend_width: 230.0,
            label_font: 9.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.margin_left + self.plot_size + self.legend_gap + self.legend_width
    }

    pub fn height(&self) -> f32 {
        self.margin_top + self.plot_size + self.margin_bottom
    }

    fn x(&self, plane_x: f32) -> f32 {
        self.margin_left + (plane_x / PLANE_MAX) * self.plot_size
    }

    fn y(&self, plane_y: f32) -> f32 {
        self.margin_top + ((PLANE_MAX - plane_y) / PLANE_MAX) * self.plot_size
    }
}

/// Writes the chart as a standalone SVG document. Coordinates are printed
/// with fixed precision so equal scenes give byte-identical files.
pub struct SvgSurface {
    geometry: SvgGeometry,
    body: String,
    legend: Vec<(String, Color32)>,
}

impl SvgSurface {
    pub fn new(geometry: SvgGeometry) -> Self {
        Self {
            geometry,
            body: String::new(),
            legend: Vec::new(),
        }
    }

    pub fn to_svg_string(&self) -> String {
        let g = self.geometry;
        let mut s = String::new();
        s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            s,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\" font-family=\"sans-serif\">",
            g.width(),
            g.height(),
            g.width(),
            g.height()
        );
        s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
        s.push_str(&self.body);
        self.write_legend(&mut s);
        s.push_str("</svg>\n");
        s
    }

    fn write_legend(&self, s: &mut String) {
        if self.legend.is_empty() {
            return;
        }

        let g = self.geometry;
        let left = g.margin_left + g.plot_size + g.legend_gap;
        let row = 18.0;
        let height = row * self.legend.len() as f32 + 12.0;
        let _ = writeln!(
            s,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"#ffffff\" stroke=\"#cccccc\" stroke-width=\"0.8\" rx=\"3\"/>",
            left,
            g.margin_top,
            g.legend_width,
            height
        );
        for (index, (label, color)) in self.legend.iter().enumerate() {
            let center_y = g.margin_top + 6.0 + row * (index as f32 + 0.5);
            let _ = writeln!(
                s,
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"5.00\" fill=\"{}\" fill-opacity=\"0.6\"/>",
                left + 14.0,
                center_y,
                to_hex(*color)
            );
            let _ = writeln!(
                s,
                "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"middle\" font-size=\"11\" fill=\"#222222\">{}</text>",
                left + 26.0,
                center_y,
                escape_xml(label)
            );
        }
    }
}

impl ChartSurface for SvgSurface {
    fn draw_axes(&mut self, axes: &Axes) {
        let g = self.geometry;
        let s = &mut self.body;
        let (left, top) = (g.x(0.0), g.y(PLANE_MAX));
        let (right, bottom) = (g.x(PLANE_MAX), g.y(0.0));

        let _ = writeln!(
            s,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#333333\" stroke-width=\"1\"/>",
            left,
            top,
            right - left,
            bottom - top
        );
        for &tick in &axes.ticks {
            let label = format!("{tick:.0}");
            let _ = writeln!(
                s,
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#333333\">{}</text>",
                g.x(tick),
                bottom + 16.0,
                label
            );
            let _ = writeln!(
                s,
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" dominant-baseline=\"middle\" font-size=\"10\" fill=\"#333333\">{}</text>",
                left - 8.0,
                g.y(tick),
                label
            );
        }
        let _ = writeln!(
            s,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#111111\">{}</text>",
            (left + right) / 2.0,
            top - 18.0,
            escape_xml(&axes.title)
        );
        let _ = writeln!(
            s,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#111111\">{}</text>",
            (left + right) / 2.0,
            bottom + 40.0,
            escape_xml(&axes.x_label)
        );
        let y_label_x = left - 40.0;
        let y_label_y = (top + bottom) / 2.0;
        let _ = writeln!(
            s,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#111111\" transform=\"rotate(-90 {:.2} {:.2})\">{}</text>",
            y_label_x,
            y_label_y,
            y_label_x,
            y_label_y,
            escape_xml(&axes.y_label)
        );
    }

    fn draw_circle(&mut self, center: Pos2, area: f32, fill: Color32) {
        let radius = marker_radius(f64::from(area));
        let _ = writeln!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"0.6\" stroke=\"#ffffff\" stroke-width=\"0.5\"/>",
            self.geometry.x(center.x),
            self.geometry.y(center.y),
            radius,
            to_hex(fill)
        );
    }

    fn draw_line(&mut self, from: Pos2, to: Pos2, style: LineStyle) {
        let stroke = match style {
            LineStyle::Leader => "stroke=\"#555555\" stroke-width=\"0.6\"",
            LineStyle::Quadrant => "stroke=\"#808080\" stroke-width=\"1\" stroke-dasharray=\"6 4\"",
            LineStyle::Grid => "stroke=\"#e3e3e3\" stroke-width=\"0.5\"",
        };
        let _ = writeln!(
            self.body,
            "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" {stroke}/>",
            self.geometry.x(from.x),
            self.geometry.y(from.y),
            self.geometry.x(to.x),
            self.geometry.y(to.y)
        );
    }

    fn draw_text(&mut self, origin: Pos2, text: &str) {
        let _ = writeln!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"hanging\" font-size=\"{:.0}\" fill=\"#000000\">{}</text>",
            self.geometry.x(origin.x),
            self.geometry.y(origin.y),
            self.geometry.label_font,
            escape_xml(text)
        );
    }

    fn add_legend_entry(&mut self, label: &str, color: Color32) {
        self.legend.push((label.to_owned(), color));
    }

    fn save(&mut self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        if !dir.is_dir() {
            return Err(anyhow!("output directory {} does not exist", dir.display()));
        }

        let path = dir.join(file_name);
        let is_png = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("png"));

        if is_png {
            let pixmap = rasterize_svg(&self.to_svg_string(), PNG_PIXELS_PER_PT)?;
            write_png(&pixmap, &path)
                .with_context(|| format!("failed to write chart to {}", path.display()))?;
            debug!(path = %path.display(), "wrote png chart");
        } else {
            fs::write(&path, self.to_svg_string())
                .with_context(|| format!("failed to write chart to {}", path.display()))?;
            debug!(path = %path.display(), "wrote svg chart");
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use eframe::egui::pos2;

    use super::*;

    fn surface() -> SvgSurface {
        SvgSurface::new(SvgGeometry::for_plot(576.0))
    }

    #[test]
    fn maps_the_plane_onto_the_plot_square() {
        let g = SvgGeometry::for_plot(576.0);
        assert_eq!(g.x(0.0), 70.0);
        assert_eq!(g.x(10.0), 646.0);
        assert_eq!(g.y(10.0), 50.0);
        assert_eq!(g.y(0.0), 626.0);
    }

    #[test]
    fn circle_radius_matches_marker_area() {
        let mut svg = surface();
        svg.draw_circle(pos2(5.0, 5.0), (PI * 100.0) as f32, Color32::from_rgb(0, 128, 0));
        let text = svg.to_svg_string();
        assert!(text.contains("cx=\"358.00\" cy=\"338.00\" r=\"10.00\" fill=\"#008000\""));
    }

    #[test]
    fn quadrant_lines_are_dashed() {
        let mut svg = surface();
        svg.draw_line(pos2(5.0, 0.0), pos2(5.0, 10.0), LineStyle::Quadrant);
        assert!(svg.to_svg_string().contains("stroke-dasharray"));
    }

    #[test]
    fn escapes_label_text_and_legend() {
        let mut svg = surface();
        svg.draw_text(pos2(1.0, 1.0), "Body, mind, & spirituality");
        svg.add_legend_entry("Community & society", Color32::RED);
        let text = svg.to_svg_string();
        assert!(text.contains("Body, mind, &amp; spirituality"));
        assert!(text.contains("Community &amp; society"));
        assert!(text.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn save_requires_an_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nested");
        let error = surface().save(&missing, "chart.svg").unwrap_err();
        assert!(error.to_string().contains("does not exist"));

        let path = surface().save(dir.path(), "chart.svg").unwrap();
        assert_eq!(path, dir.path().join("chart.svg"));
        assert!(fs::read_to_string(path).unwrap().starts_with("<?xml"));
    }

    #[test]
    fn png_extension_writes_a_raster_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = surface();
        surface.draw_axes(&Axes::default());
        surface.draw_circle(pos2(5.0, 5.0), 400.0, Color32::BLUE);

        let path = surface.save(dir.path(), "chart.PNG").unwrap();
        let bytes = fs::read(path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let expected = (surface.geometry.width() * PNG_PIXELS_PER_PT).ceil() as u32;
        assert_eq!(width, expected);
    }
}
