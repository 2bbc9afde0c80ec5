use anyhow::{Result, anyhow};
use eframe::egui::Color32;

const NAMED_COLORS: [(&str, Color32); 16] = [
    ("red", Color32::from_rgb(255, 0, 0)),
    ("blue", Color32::from_rgb(0, 0, 255)),
    ("green", Color32::from_rgb(0, 128, 0)),
    ("yellow", Color32::from_rgb(255, 255, 0)),
    ("purple", Color32::from_rgb(128, 0, 128)),
    ("grey", Color32::from_rgb(128, 128, 128)),
    ("gray", Color32::from_rgb(128, 128, 128)),
    ("orange", Color32::from_rgb(255, 165, 0)),
    ("black", Color32::from_rgb(0, 0, 0)),
    ("white", Color32::from_rgb(255, 255, 255)),
    ("brown", Color32::from_rgb(165, 42, 42)),
    ("pink", Color32::from_rgb(255, 192, 203)),
    ("cyan", Color32::from_rgb(0, 255, 255)),
    ("magenta", Color32::from_rgb(255, 0, 255)),
    ("olive", Color32::from_rgb(128, 128, 0)),
    ("navy", Color32::from_rgb(0, 0, 128)),
];

/// Parses a named color or a `#rrggbb` hex triplet.
pub fn parse_color(value: &str) -> Result<Color32> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(anyhow!("invalid hex color `{value}`, expected #rrggbb"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|error| anyhow!("invalid hex color `{value}`: {error}"))
        };
        return Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, color)| *color)
        .ok_or_else(|| anyhow!("unknown color name `{value}`"))
}

pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
