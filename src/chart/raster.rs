use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use tracing::debug;

pub const PNG_PIXELS_PER_PT: f32 = 2.0;

pub fn rasterize_svg(svg: &str, pixels_per_pt: f32) -> Result<tiny_skia::Pixmap> {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    if fontdb.faces().next().is_none() {
        debug!("no system fonts found, png labels will be missing");
    }

    let mut options = usvg::Options::default();
    options.fontdb = Arc::new(fontdb);
    let tree = usvg::Tree::from_str(svg, &options).context("failed to parse chart svg")?;

    let size = tree.size();
    let width = (size.width() * pixels_per_pt).ceil() as u32;
    let height = (size.height() * pixels_per_pt).ceil() as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("cannot allocate a {width}x{height} image"))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(pixels_per_pt, pixels_per_pt),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

pub fn write_png(pixmap: &tiny_skia::Pixmap, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;

    let mut encoder = Encoder::new(BufWriter::new(file), pixmap.width(), pixmap.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_filter(FilterType::NoFilter);
    encoder.set_compression(Compression::Default);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixmap.data())?;
    writer.finish()?;
    Ok(())
}
