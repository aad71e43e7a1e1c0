//! `backtrack` — reconstruct water depth through time at a single drill site
//! (§4.7, §6).
//!
//! Reads a drill-site file and one or more lithology files, builds the
//! chosen oceanic or continental subsidence model, and writes the
//! decompacted/subsidence time series plus the amended drill-site record.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use paleo_backtrack::age_depth::{AgeDepthModel, Crosby2007, Gdh1, Rhcw18, UserAgeDepthTable};
use paleo_backtrack::backtrack::{self, BacktrackContext};
use paleo_backtrack::config::{self, EngineConfig};
use paleo_backtrack::io::{drill_site, manifest, output, raster_text, table};
use paleo_backtrack::reconstruction::StaticPlateModel;
use paleo_backtrack::registry::LithologyRegistry;
use paleo_backtrack::sea_level::SeaLevelModel;
use paleo_backtrack::types::default_backtrack_columns;
use paleo_backtrack::types::dynamic_topography::{DynamicTopographyFrame, DynamicTopographyModel};

/// Backtrack a single drill site: compute paleo water depth from a
/// subsidence model and sediment decompaction.
#[derive(Parser, Debug)]
#[command(name = "backtrack")]
struct Args {
    /// Drill-site file (§6).
    #[arg(long)]
    drill_site: PathBuf,

    /// Lithology registry file(s); later files override earlier ones on
    /// name collision (§4.1). May be repeated.
    #[arg(long = "lithology")]
    lithology_files: Vec<PathBuf>,

    /// Oceanic age-to-depth model: `gdh1`, `crosby2007`, `rhcw18`, or a path
    /// to a user-supplied piecewise-linear table (§4.3). Ignored for
    /// continental sites.
    #[arg(long, default_value = "gdh1")]
    age_depth_model: String,

    /// 0-indexed age column in a user-supplied age-depth table (§6).
    #[arg(long, default_value_t = 0)]
    age_depth_age_column: usize,

    /// 0-indexed depth column in a user-supplied age-depth table (§6).
    #[arg(long, default_value_t = 1)]
    age_depth_value_column: usize,

    /// Eustatic sea-level table file (§4.6). Omit for no sea-level
    /// correction.
    #[arg(long)]
    sea_level: Option<PathBuf>,

    /// Dynamic-topography model descriptor (§6): a manifest listing
    /// mantle-frame grid files by age, plus optional static-polygons and
    /// rotation files. Omit for no dynamic-topography correction.
    #[arg(long)]
    dynamic_topography_manifest: Option<PathBuf>,

    /// Total sediment thickness sampled at the site [m], used to
    /// synthesize a base sediment layer (§4.2). Omit if unknown.
    #[arg(long)]
    total_sediment_thickness_m: Option<f64>,

    /// Present-day water depth at the site [m], positive downward.
    #[arg(long)]
    present_day_water_depth_m: f64,

    /// Output path for the decompacted table (§6). Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output path for the amended drill-site echo (§6). Omit to skip.
    #[arg(long)]
    amended_output: Option<PathBuf>,

    /// Engine config TOML file; falls back to `$PALEOBACKTRACK_CONFIG` /
    /// `./paleo_config.toml` / built-in defaults (see `config::load`).
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

    let age_depth_model = load_age_depth_model(
        &args.age_depth_model,
        args.age_depth_age_column,
        args.age_depth_value_column,
    )?;
    let plates = StaticPlateModel::identity();
    let dynamic_topography = args
        .dynamic_topography_manifest
        .as_ref()
        .map(|path| load_dynamic_topography(path))
        .transpose()?;

    let ctx = BacktrackContext {
        registry: &registry,
        age_depth_model: Some(age_depth_model.as_ref()),
        rift_params: None,
        dynamic_topography: dynamic_topography.as_ref(),
        plates: &plates,
        sea_level: &sea_level,
        total_sediment_thickness_m: args.total_sediment_thickness_m,
        present_day_water_depth_m: args.present_day_water_depth_m,
    };

    let (rows, warnings) = backtrack::run(&well, &ctx)
        .context("running the backtrack driver")?;

    for warning in &warnings {
        tracing::warn!("{}", warning.message);
    }

    let table_text = output::format_backtrack_table(&rows, &default_backtrack_columns());
    match &args.output {
        Some(path) => fs::write(path, table_text)
            .with_context(|| format!("writing output table to {}", path.display()))?,
        None => print!("{table_text}"),
    }

    if let Some(path) = &args.amended_output {
        let amended = output::format_amended_well(&well);
        fs::write(path, amended)
            .with_context(|| format!("writing amended drill-site output to {}", path.display()))?;
    }

    Ok(())
}

fn load_age_depth_model(
    spec: &str,
    age_col: usize,
    value_col: usize,
) -> anyhow::Result<Box<dyn AgeDepthModel>> {
    match spec.to_ascii_lowercase().as_str() {
        "gdh1" => Ok(Box::new(Gdh1)),
        "crosby2007" => Ok(Box::new(Crosby2007::default())),
        "rhcw18" => Ok(Box::new(Rhcw18::default())),
        _ => {
            let path = PathBuf::from(spec);
            let points = table::parse_two_column_file_with_columns(&path, age_col, value_col)
                .with_context(|| format!("parsing user age-depth table {}", path.display()))?;
            Ok(Box::new(UserAgeDepthTable::from_points(points)))
        }
    }
}

/// Load the dynamic-topography manifest's grids into a model (§6). The
/// manifest's static-polygons/rotation paths are echoed as a warning rather
/// than applied: parsing their contents is out of scope (§1), so the
/// reconstruction stays the fixed-point `StaticPlateModel::identity()`
/// supplied by the caller.
fn load_dynamic_topography(path: &PathBuf) -> anyhow::Result<DynamicTopographyModel> {
    let parsed = manifest::parse_manifest_file(path)
        .with_context(|| format!("parsing dynamic-topography manifest {}", path.display()))?;

    if parsed.static_polygons_path.is_some() || !parsed.rotation_paths.is_empty() {
        tracing::warn!(
            "dynamic-topography manifest {} names static-polygons/rotation files; parsing their \
             contents is not implemented, so reconstruction falls back to a fixed-point model",
            path.display()
        );
    }

    let mut frames = Vec::with_capacity(parsed.grids.len());
    for entry in &parsed.grids {
        let raster = raster_text::load_raster_text_file(&entry.grid_path)
            .with_context(|| format!("loading dynamic-topography grid {}", entry.grid_path.display()))?;
        frames.push(DynamicTopographyFrame {
            age_ma: entry.age_ma,
            raster,
        });
    }
    Ok(DynamicTopographyModel::new(frames))
}
