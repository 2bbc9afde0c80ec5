use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, pos2, vec2};

use crate::chart::{DrawOp, LineStyle, Scene, marker_radius};

const PLANE_MAX: f32 = 10.0;
const MARGIN_LEFT: f32 = 64.0;
const MARGIN_TOP: f32 = 44.0;
const MARGIN_BOTTOM: f32 = 52.0;
const LEGEND_GAP: f32 = 20.0;
const LEGEND_WIDTH: f32 = 220.0;
const TEXT_COLOR: Color32 = Color32::from_rgb(20, 20, 20);

/// Maps the chart plane onto the largest square that fits the window next
/// to the legend column.
#[derive(Clone, Copy, Debug)]
pub(super) struct PlotTransform {
    plot: Rect,
    pixels_per_pt: f32,
}

impl PlotTransform {
    pub(super) fn fit(available: Rect, plot_size_pt: f32) -> Self {
        let side = (available.width() - MARGIN_LEFT - LEGEND_GAP - LEGEND_WIDTH)
            .min(available.height() - MARGIN_TOP - MARGIN_BOTTOM)
            .max(80.0);
        let plot = Rect::from_min_size(available.min + vec2(MARGIN_LEFT, MARGIN_TOP), vec2(side, side));

        Self {
            plot,
            pixels_per_pt: side / plot_size_pt.max(1.0),
        }
    }

    pub(super) fn to_screen(&self, plane: Pos2) -> Pos2 {
        pos2(
            self.plot.left() + (plane.x / PLANE_MAX) * self.plot.width(),
            self.plot.bottom() - (plane.y / PLANE_MAX) * self.plot.height(),
        )
    }

    pub(super) fn marker_radius(&self, area: f32) -> f32 {
        marker_radius(f64::from(area)) as f32 * self.pixels_per_pt
    }

    fn font(&self, size_pt: f32) -> FontId {
        FontId::proportional((size_pt * self.pixels_per_pt).max(8.0))
    }
}

pub(super) fn fade(color: Color32, alpha: f32) -> Color32 {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::WHITE);
}

pub(super) fn paint_scene(painter: &Painter, transform: &PlotTransform, scene: &Scene) {
    for op in scene.ops() {
        match op {
            DrawOp::Axes(axes) => {
                let plot = transform.plot;
                let frame = Stroke::new(1.0, Color32::from_gray(60));
                for [from, to] in [
                    [plot.left_top(), plot.right_top()],
                    [plot.right_top(), plot.right_bottom()],
                    [plot.right_bottom(), plot.left_bottom()],
                    [plot.left_bottom(), plot.left_top()],
                ] {
                    painter.line_segment([from, to], frame);
                }

                for &tick in &axes.ticks {
                    let label = format!("{tick:.0}");
                    painter.text(
                        transform.to_screen(pos2(tick, 0.0)) + vec2(0.0, 6.0),
                        Align2::CENTER_TOP,
                        &label,
                        transform.font(10.0),
                        TEXT_COLOR,
                    );
                    painter.text(
                        transform.to_screen(pos2(0.0, tick)) - vec2(8.0, 0.0),
                        Align2::RIGHT_CENTER,
                        &label,
                        transform.font(10.0),
                        TEXT_COLOR,
                    );
                }

                painter.text(
                    pos2(plot.center().x, plot.top() - 14.0),
                    Align2::CENTER_BOTTOM,
                    &axes.title,
                    transform.font(14.0),
                    TEXT_COLOR,
                );
                painter.text(
                    pos2(plot.center().x, plot.bottom() + 40.0),
                    Align2::CENTER_BOTTOM,
                    &axes.x_label,
                    transform.font(12.0),
                    TEXT_COLOR,
                );
                painter.text(
                    pos2(plot.left(), plot.top() - 4.0),
                    Align2::RIGHT_BOTTOM,
                    &axes.y_label,
                    transform.font(12.0),
                    TEXT_COLOR,
                );
            }
            DrawOp::Circle { center, area, fill } => {
                painter.circle(
                    transform.to_screen(*center),
                    transform.marker_radius(*area),
                    fade(*fill, 0.6),
                    Stroke::new(0.5, Color32::WHITE),
                );
            }
            DrawOp::Line { from, to, style } => {
                let points = [transform.to_screen(*from), transform.to_screen(*to)];
                match style {
                    LineStyle::Leader => {
                        painter.line_segment(points, Stroke::new(0.8, Color32::from_gray(85)));
                    }
                    LineStyle::Grid => {
                        painter.line_segment(points, Stroke::new(0.5, Color32::from_gray(227)));
                    }
                    LineStyle::Quadrant => {
                        painter.extend(Shape::dashed_line(
                            &points,
                            Stroke::new(1.0, Color32::from_gray(128)),
                            6.0,
                            4.0,
                        ));
                    }
                }
            }
            DrawOp::Text { origin, text } => {
                painter.text(
                    transform.to_screen(*origin),
                    Align2::LEFT_TOP,
                    text,
                    transform.font(9.0),
                    Color32::BLACK,
                );
            }
            DrawOp::LegendEntry { .. } => {}
        }
    }

    let left = transform.plot.right() + LEGEND_GAP;
    for (index, (label, color)) in scene.legend().enumerate() {
        let center = pos2(left + 10.0, transform.plot.top() + 12.0 + index as f32 * 20.0);
        painter.circle_filled(center, 6.0, fade(color, 0.6));
        painter.text(
            center + vec2(12.0, 0.0),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(12.0),
            TEXT_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_corners_map_to_the_plot_square() {
        let available = Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 700.0));
        let transform = PlotTransform::fit(available, 576.0);

        assert_eq!(transform.plot.width(), transform.plot.height());
        assert_eq!(transform.to_screen(pos2(0.0, 0.0)), transform.plot.left_bottom());
        assert_eq!(transform.to_screen(pos2(10.0, 10.0)), transform.plot.right_top());
    }

    #[test]
    fn marker_radius_scales_with_the_plot() {
        let small = PlotTransform::fit(Rect::from_min_size(Pos2::ZERO, vec2(600.0, 400.0)), 576.0);
        let large = PlotTransform::fit(Rect::from_min_size(Pos2::ZERO, vec2(1200.0, 800.0)), 576.0);
        assert!(large.marker_radius(500.0) > small.marker_radius(500.0));
        assert_eq!(small.marker_radius(0.0), 0.0);
    }

    #[test]
    fn fade_keeps_the_hue() {
        let faded = fade(Color32::from_rgb(255, 0, 0), 0.6);
        assert_eq!(faded.a(), 153);
    }
}
