use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};
use tracing::{debug, info};

pub const DEFAULT_LABEL_OFFSET: f32 = 0.5;
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub label_offset: f32,
    pub max_iterations: usize,
    pub char_width: f32,
    pub line_height: f32,
    pub padding: f32,
    pub restoring: f32,
    pub max_step: f32,
    pub bounds: Rect,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::for_font(9.0, 576.0)
    }
}

impl LayoutConfig {
    pub fn for_font(font_pt: f32, plot_size_pt: f32) -> Self {
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0));
        let units_per_pt = bounds.width() / plot_size_pt.max(1.0);

        Self {
            label_offset: DEFAULT_LABEL_OFFSET,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            char_width: font_pt * 0.6 * units_per_pt,
            line_height: font_pt * 1.3 * units_per_pt,
            padding: 0.05,
            restoring: 0.1,
            max_step: 0.6,
            bounds,
        }
    }
}

/// A placed label. `rect` lives in the y-up chart plane, so `rect.max.y` is
/// the top edge.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelBox {
    pub anchor_id: usize,
    pub anchor: Pos2,
    pub text: String,
    pub rect: Rect,
}

impl LabelBox {
    pub fn position(&self) -> Pos2 {
        pos2(self.rect.min.x, self.rect.max.y)
    }

    pub fn leader_line(&self) -> [Pos2; 2] {
        [self.anchor, nearest_corner(self.rect, self.anchor)]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
    pub labels: Vec<LabelBox>,
    pub iterations: usize,
    pub converged: bool,
    pub overlapping_pairs: usize,
}

impl LayoutResult {
    pub fn empty() -> Self {
        Self {
            labels: Vec::new(),
            iterations: 0,
            converged: true,
            overlapping_pairs: 0,
        }
    }

    pub fn label(&self, anchor_id: usize) -> Option<&LabelBox> {
        self.labels.iter().find(|label| label.anchor_id == anchor_id)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn label_size(&self, text: &str) -> Vec2 {
        let chars = text.chars().count().max(1) as f32;
        vec2(chars * self.config.char_width, self.config.line_height)
    }

    pub fn initial_rect(&self, anchor: Pos2, size: Vec2) -> Rect {
        let bounds = self.config.bounds;
        let offset = self.config.label_offset;

        let fits_right = anchor.x + offset + size.x <= bounds.max.x;
        let fits_left = anchor.x - offset - size.x >= bounds.min.x;
        let fits_below = anchor.y - offset - size.y >= bounds.min.y;
        let fits_above = anchor.y + offset + size.y <= bounds.max.y;

        let left = if fits_right || !fits_left {
            anchor.x + offset
        } else {
            anchor.x - offset - size.x
        };
        let top = if fits_below || !fits_above {
            anchor.y - offset
        } else {
            anchor.y + offset + size.y
        };

        keep_inside(Rect::from_min_size(pos2(left, top - size.y), size), bounds)
    }

    pub fn layout<S: AsRef<str>>(&self, items: &[(Pos2, S)]) -> LayoutResult {
        let n = items.len();
        if n == 0 {
            return LayoutResult::empty();
        }

        let homes = items
            .iter()
            .map(|(anchor, text)| self.initial_rect(*anchor, self.label_size(text.as_ref())))
            .collect::<Vec<_>>();
        let mut rects = homes.clone();
        let mut overlaps = count_overlaps(&rects);
        let mut best_overlaps = overlaps;
        let mut best_rects = rects.clone();

        let mut iterations = 0;
        let mut displacement = vec![Vec2::ZERO; n];
        let mut crowded = vec![false; n];

        while overlaps > 0 && iterations < self.config.max_iterations {
            iterations += 1;
            displacement.fill(Vec2::ZERO);
            crowded.fill(false);

            for i in 0..n {
                for j in (i + 1)..n {
                    let Some(push) = separation(rects[i], rects[j], self.config.padding) else {
                        continue;
                    };
                    displacement[i] += push;
                    displacement[j] -= push;
                    crowded[i] = true;
                    crowded[j] = true;
                }
            }

            for index in 0..n {
                let mut step = displacement[index];
                if !crowded[index] {
                    step += (homes[index].min - rects[index].min) * self.config.restoring;
                }

                let length = step.length();
                if length > self.config.max_step {
                    step = step / length * self.config.max_step;
                }
                rects[index] = keep_inside(rects[index].translate(step), self.config.bounds);
            }

            overlaps = count_overlaps(&rects);
            // the cap may stop a worse round than an earlier one
            if overlaps < best_overlaps {
                best_overlaps = overlaps;
                best_rects.clone_from(&rects);
            }
        }

        let converged = best_overlaps == 0;
        if converged {
            debug!(labels = n, iterations, "label layout converged");
        } else {
            info!(
                labels = n,
                iterations,
                overlapping_pairs = best_overlaps,
                "label layout stopped at the iteration cap"
            );
        }

        let labels = items
            .iter()
            .zip(best_rects)
            .enumerate()
            .map(|(anchor_id, ((anchor, text), rect))| LabelBox {
                anchor_id,
                anchor: *anchor,
                text: text.as_ref().to_owned(),
                rect,
            })
            .collect();

        LayoutResult {
            labels,
            iterations,
            converged,
            overlapping_pairs: best_overlaps,
        }
    }
}

pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

pub fn count_overlaps(rects: &[Rect]) -> usize {
    let mut count = 0;
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if boxes_overlap(rects[i], rects[j]) {
                count += 1;
            }
        }
    }
    count
}

// half the push, along the axis of least penetration
fn separation(a: Rect, b: Rect, padding: f32) -> Option<Vec2> {
    let overlap_x = a.max.x.min(b.max.x) - a.min.x.max(b.min.x) + padding;
    let overlap_y = a.max.y.min(b.max.y) - a.min.y.max(b.min.y) + padding;
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }

    let delta = a.center() - b.center();
    if overlap_x < overlap_y {
        Some(vec2(push_sign(delta.x) * overlap_x * 0.5, 0.0))
    } else {
        Some(vec2(0.0, push_sign(delta.y) * overlap_y * 0.5))
    }
}

// coincident boxes: the earlier one moves up/right
fn push_sign(component: f32) -> f32 {
    if component < 0.0 { -1.0 } else { 1.0 }
}

fn keep_inside(rect: Rect, bounds: Rect) -> Rect {
    let mut shift = Vec2::ZERO;

    if rect.max.x > bounds.max.x {
        shift.x = bounds.max.x - rect.max.x;
    }
    if rect.min.x + shift.x < bounds.min.x {
        shift.x = bounds.min.x - rect.min.x;
    }
    if rect.max.y > bounds.max.y {
        shift.y = bounds.max.y - rect.max.y;
    }
    if rect.min.y + shift.y < bounds.min.y {
        shift.y = bounds.min.y - rect.min.y;
    }

    rect.translate(shift)
}

fn nearest_corner(rect: Rect, point: Pos2) -> Pos2 {
    [
        pos2(rect.min.x, rect.max.y),
        pos2(rect.max.x, rect.max.y),
        pos2(rect.min.x, rect.min.y),
        pos2(rect.max.x, rect.min.y),
    ]
    .into_iter()
    .min_by(|a, b| a.distance_sq(point).total_cmp(&b.distance_sq(point)))
    .unwrap_or(rect.center())
}
