//! Map symbology tool.
//!
//! Symbolizes vector features from a JSON symbol spec and contours JSON
//! grids into lines and filled bands. Results are written to stdout as JSON,
//! logs go to stderr.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contour_engine::{contour_grid, generate_contour_levels, ContourConfig, LevelSpec};
use map_common::Grid;
use serde_json::json;
use symbolizer::{symbolize, FeatureCollection, SymbolSpecConfig};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "map-tool")]
#[command(about = "Attribute-driven symbolization and grid contouring")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "MAP_TOOL_LOG_JSON", global = true)]
    log_json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a symbol spec against a feature collection
    Symbolize {
        /// Symbol spec JSON file
        #[arg(long, env = "MAP_TOOL_SPEC")]
        spec: PathBuf,

        /// Feature collection JSON file
        #[arg(long)]
        features: PathBuf,
    },

    /// Contour a grid into lines and filled bands
    Contour {
        /// Grid JSON file (`{"rows": [[...], ...]}`, null for missing samples)
        #[arg(long)]
        grid: PathBuf,

        /// Contour configuration JSON file (defaults apply when omitted)
        #[arg(long, env = "MAP_TOOL_CONTOUR_CONFIG")]
        config: Option<PathBuf>,

        /// Override the configured levels with a fixed interval
        #[arg(long)]
        interval: Option<f64>,
    },

    /// Print the levels an interval produces for a value range
    Levels {
        #[arg(long, allow_hyphen_values = true)]
        min: f64,

        #[arg(long, allow_hyphen_values = true)]
        max: f64,

        #[arg(long)]
        interval: f64,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let logger = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        logger.json().init();
    } else {
        logger.init();
    }

    let output = match &args.command {
        Command::Symbolize { spec, features } => run_symbolize(spec, features)?,
        Command::Contour {
            grid,
            config,
            interval,
        } => run_contour(grid, config.as_deref(), *interval)?,
        Command::Levels { min, max, interval } => json!(
            generate_contour_levels(*min, *max, *interval).context("Failed to generate levels")?
        ),
    };

    write_output(&output, args.pretty)
}

fn run_symbolize(spec_path: &Path, features_path: &Path) -> Result<serde_json::Value> {
    let spec = SymbolSpecConfig::from_file(spec_path)
        .with_context(|| format!("Failed to load symbol spec {}", spec_path.display()))?
        .compile()
        .context("Failed to compile symbol spec")?;
    let features = FeatureCollection::from_file(features_path)
        .with_context(|| format!("Failed to load features {}", features_path.display()))?;

    info!(
        properties = spec.properties.len(),
        features = features.len(),
        "Symbolizing features"
    );

    let table = symbolize(&spec, &features).context("Failed to symbolize features")?;

    let rows: Vec<serde_json::Value> = (0..table.feature_count())
        .map(|k| {
            let pairs: Vec<serde_json::Value> = table
                .properties_for(k)
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| json!([name, value]))
                .collect();
            json!({ "feature": k + 1, "properties": pairs })
        })
        .collect();

    Ok(serde_json::Value::Array(rows))
}

fn run_contour(
    grid_path: &Path,
    config_path: Option<&Path>,
    interval: Option<f64>,
) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(grid_path)
        .with_context(|| format!("Failed to read grid {}", grid_path.display()))?;
    let grid: Grid = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse grid {}", grid_path.display()))?;

    let mut config = match config_path {
        Some(path) => ContourConfig::from_file(path)
            .with_context(|| format!("Failed to load contour config {}", path.display()))?,
        None => ContourConfig::default(),
    };
    if let Some(interval) = interval {
        config.levels = LevelSpec::Interval(interval);
    }
    debug!(?config, "Resolved contour configuration");

    info!(rows = grid.rows(), cols = grid.cols(), "Contouring grid");
    let result = contour_grid(&grid, &config).context("Failed to contour grid")?;
    info!(
        lines = result.lines.len(),
        bands = result.bands.len(),
        "Contouring complete"
    );

    Ok(serde_json::to_value(&result)?)
}

fn write_output(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
