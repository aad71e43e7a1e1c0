//! `backstrip` — invert recorded paleo water depths into tectonic
//! subsidence at a single drill site (§4.8, §6).

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use paleo_backtrack::backstrip::{self, BackstripContext};
use paleo_backtrack::config::{self, EngineConfig};
use paleo_backtrack::io::{drill_site, output, table};
use paleo_backtrack::registry::LithologyRegistry;
use paleo_backtrack::sea_level::SeaLevelModel;
use paleo_backtrack::types::default_backstrip_columns;

/// Backstrip a single drill site: invert recorded min/max paleo water
/// depths into tectonic subsidence through the same isostatic equation the
/// backtrack driver uses in the other direction.
#[derive(Parser, Debug)]
#[command(name = "backstrip")]
struct Args {
    /// Drill-site file with recorded min/max water depths per layer (§6).
    #[arg(long)]
    drill_site: PathBuf,

    /// Lithology registry file(s); later files override earlier ones on
    /// name collision (§4.1). May be repeated.
    #[arg(long = "lithology")]
    lithology_files: Vec<PathBuf>,

    /// Eustatic sea-level table file (§4.6). Omit for no sea-level
    /// correction.
    #[arg(long)]
    sea_level: Option<PathBuf>,

    /// Output path for the decompacted table (§6). Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Engine config TOML file; falls back to `$PALEOBACKTRACK_CONFIG` /
    /// `./paleo_config.toml` / built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let engine_config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("loading engine config from {}", path.display()))?,
        None => EngineConfig::load(),
    };
    config::init(engine_config);

    let mut registry = LithologyRegistry::with_builtin_defaults();
    for path in &args.lithology_files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading lithology file {}", path.display()))?;
        let loaded = LithologyRegistry::from_text(&text)
            .with_context(|| format!("parsing lithology file {}", path.display()))?;
        registry.merge(loaded);
    }

    let well = drill_site::parse_well_file(&args.drill_site, &registry)
        .with_context(|| format!("parsing drill-site file {}", args.drill_site.display()))?;

    let sea_level = match &args.sea_level {
        Some(path) => {
            let points = table::parse_two_column_file(path)
                .with_context(|| format!("parsing sea-level file {}", path.display()))?;
            SeaLevelModel::from_points(points)
        }
        None => SeaLevelModel::none(),
    };

    let ctx = BackstripContext { sea_level: &sea_level };

    let (rows, warnings) = backstrip::run(&well, &ctx)
        .context("running the backstrip driver")?;

    for warning in &warnings {
        tracing::warn!("{}", warning.message);
    }

    let table_text = output::format_backstrip_table(&rows, &default_backstrip_columns());
    match &args.output {
        Some(path) => fs::write(path, table_text)
            .with_context(|| format!("writing output table to {}", path.display()))?,
        None => print!("{table_text}"),
    }

    Ok(())
}
