mod app;
mod chart;
mod collect;
mod portfolio;
mod taxonomy;
mod util;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chart::{
    Chart, ChartConfig, ChartSurface, DEFAULT_LABEL_OFFSET, DEFAULT_MAX_ITERATIONS,
    DEFAULT_SCALE_K, LayoutConfig, SizeScaler,
};
use taxonomy::Taxonomy;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON portfolio to chart; prompts interactively when omitted
    #[arg(long)]
    portfolio: Option<PathBuf>,
    /// JSON taxonomy replacing the built-in metric catalog
    #[arg(long)]
    taxonomy: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long)]
    create_out_dir: bool,
    /// A `.png` extension writes a raster image, anything else SVG
    #[arg(long, default_value = "strategic_life_portfolio.svg")]
    file_name: String,
    /// Marker area, in square points, of an activity filling the whole week
    #[arg(long, default_value_t = DEFAULT_SCALE_K)]
    scale_k: f64,
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,
    #[arg(long, default_value_t = DEFAULT_LABEL_OFFSET)]
    label_offset: f32,
    /// Open the chart in a window after saving it
    #[arg(long)]
    show: bool,
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn chart_config(&self) -> Result<ChartConfig> {
        if !self.scale_k.is_finite() || self.scale_k < 0.0 {
            return Err(anyhow!("--scale-k must be a non-negative number"));
        }
        if !self.label_offset.is_finite() || self.label_offset < 0.0 {
            return Err(anyhow!("--label-offset must be a non-negative number"));
        }

        let defaults = ChartConfig::default();
        Ok(ChartConfig {
            scale_k: self.scale_k,
            layout: LayoutConfig {
                max_iterations: self.max_iterations,
                label_offset: self.label_offset,
                ..defaults.layout
            },
            ..defaults
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = args.chart_config()?;

    let taxonomy = match &args.taxonomy {
        Some(path) => Taxonomy::load(path)?,
        None => Taxonomy::builtin(),
    };
    info!(
        categories = taxonomy.categories().len(),
        metrics = taxonomy.metrics().len(),
        "taxonomy loaded"
    );

    let portfolio = match &args.portfolio {
        Some(path) => portfolio::load_portfolio(path, &taxonomy)?,
        None => {
            let stdin = io::stdin();
            collect::collect_portfolio(&taxonomy, &mut stdin.lock(), &mut io::stdout())?
        }
    };
    info!(
        records = portfolio.len(),
        total = %util::format_minutes(portfolio.total_minutes()),
        "portfolio ready"
    );
    if portfolio.is_empty() {
        warn!("portfolio has no entries, the chart will only show the axes");
    }

    if args.create_out_dir {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    }

    let mut rendered = Chart::build(&portfolio, &taxonomy, &config);
    let path = rendered.scene.save(&args.out_dir, &args.file_name)?;
    info!(
        path = %path.display(),
        residual_overlaps = rendered.layout.overlapping_pairs,
        "chart written"
    );

    if args.show {
        let scaler = SizeScaler::new(config.week_minutes, config.scale_k);
        let bubbles = app::bubbles_for(&portfolio, &taxonomy, &scaler);
        app::run_viewer(rendered.scene, bubbles)?;
    }

    Ok(())
}
