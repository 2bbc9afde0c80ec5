use std::f64::consts::PI;

pub const WEEK_MINUTES: f64 = 7.0 * 24.0 * 60.0;
pub const DEFAULT_SCALE_K: f64 = 50_000.0;

/// Maps time invested to marker area: the share of a week times `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeScaler {
    week_minutes: f64,
    k: f64,
}

impl Default for SizeScaler {
    fn default() -> Self {
        Self::new(WEEK_MINUTES, DEFAULT_SCALE_K)
    }
}

impl SizeScaler {
    pub fn new(week_minutes: f64, k: f64) -> Self {
        assert!(
            week_minutes.is_finite() && week_minutes > 0.0,
            "week length must be positive"
        );
        assert!(k.is_finite() && k >= 0.0, "scale constant must be non-negative");
        Self { week_minutes, k }
    }

    pub fn scale(&self, minutes: f64) -> f64 {
        if minutes.is_nan() || minutes <= 0.0 {
            return 0.0;
        }
        (minutes / self.week_minutes) * self.k
    }
}

/// Radius of a marker whose area is `area` square units.
pub fn marker_radius(area: f64) -> f64 {
    (area.max(0.0) / PI).sqrt()
}
