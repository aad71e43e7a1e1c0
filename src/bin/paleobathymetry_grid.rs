//! `paleobathymetry-grid` — apply the backtrack core to a grid of
//! present-day points with no stratigraphic column (§5).
//!
//! Reads a point list and the rasters the gridding driver needs, runs the
//! core in parallel across points via [`paleo_backtrack::grid`], and writes
//! one water-depth value per point.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use clap::Parser;

use paleo_backtrack::age_depth::{AgeDepthModel, Crosby2007, Gdh1, Rhcw18, UserAgeDepthTable};
use paleo_backtrack::config::{self, EngineConfig};
use paleo_backtrack::grid::{self, GridInputs, GridPoint};
use paleo_backtrack::io::{manifest, raster_text, table};
use paleo_backtrack::raster::InMemoryRaster;
use paleo_backtrack::reconstruction::StaticPlateModel;
use paleo_backtrack::sea_level::SeaLevelModel;
use paleo_backtrack::types::dynamic_topography::{DynamicTopographyFrame, DynamicTopographyModel};

/// Reconstruct water depth at a single past time over a grid of present-day
/// points with no recorded sediment column — each point is bare crust, and
/// the isostatic equation degenerates to tectonic subsidence alone (§5).
#[derive(Parser, Debug)]
#[command(name = "paleobathymetry-grid")]
struct Args {
    /// Text file of `lon lat` points, one per line.
    #[arg(long)]
    points: PathBuf,

    /// Oceanic-age raster (Ma); nodata marks continental crust.
    #[arg(long)]
    oceanic_age_raster: PathBuf,

    /// Present-day bathymetry raster (negative below sea level).
    #[arg(long)]
    bathymetry_raster: PathBuf,

    /// Crustal-thickness raster [m], required for continental points.
    #[arg(long)]
    crustal_thickness_raster: Option<PathBuf>,

    /// Rift-start-age raster [Ma], required for continental points.
    #[arg(long)]
    rift_start_raster: Option<PathBuf>,

    /// Rift-end-age raster [Ma], required for continental points.
    #[arg(long)]
    rift_end_raster: Option<PathBuf>,

    /// Oceanic age-to-depth model: `gdh1`, `crosby2007`, `rhcw18`, or a path
    /// to a user-supplied piecewise-linear table (§4.3).
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

    /// Past time to reconstruct [Ma].
    #[arg(long)]
    age_ma: f64,

    /// Output path for the `lon lat water_depth_m` table. Defaults to
    /// stdout.
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

    let points = load_points(&args.points)?;
    tracing::info!(count = points.len(), "loaded grid points");

    let oceanic_age = load_raster_text(&args.oceanic_age_raster)?;
    let bathymetry = load_raster_text(&args.bathymetry_raster)?;
    let crustal_thickness = args
        .crustal_thickness_raster
        .as_ref()
        .map(load_raster_text)
        .transpose()?;
    let rift_start = args.rift_start_raster.as_ref().map(load_raster_text).transpose()?;
    let rift_end = args.rift_end_raster.as_ref().map(load_raster_text).transpose()?;

    let sea_level = match &args.sea_level {
        Some(path) => {
            let pts = table::parse_two_column_file(path)
                .with_context(|| format!("parsing sea-level file {}", path.display()))?;
            SeaLevelModel::from_points(pts)
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

    let inputs = GridInputs {
        oceanic_age: &oceanic_age,
        bathymetry: &bathymetry,
        crustal_thickness: crustal_thickness.as_ref().map(|r| r as &dyn paleo_backtrack::raster::RasterSource),
        rift_start: rift_start.as_ref().map(|r| r as &dyn paleo_backtrack::raster::RasterSource),
        rift_end: rift_end.as_ref().map(|r| r as &dyn paleo_backtrack::raster::RasterSource),
        age_depth_model: age_depth_model.as_ref(),
        dynamic_topography: dynamic_topography.as_ref(),
        plates: &plates,
        sea_level: &sea_level,
    };

    // Cooperative cancellation point (§5): this binary runs to completion
    // without wiring an external signal handler, but the flag is exposed so
    // an embedding caller can cancel a long-running grid from another
    // thread.
    let cancel = AtomicBool::new(false);
    let results = grid::run_grid(&points, args.age_ma, &inputs, &cancel);

    let mut out = String::new();
    out.push_str("lon\tlat\twater_depth_m\n");
    for result in &results {
        for warning in &result.warnings {
            tracing::warn!(lon = result.point.lon, lat = result.point.lat, "{}", warning.message);
        }
        out.push_str(&format!(
            "{}\t{}\t{:.6}\n",
            result.point.lon, result.point.lat, result.water_depth_m
        ));
    }

    match &args.output {
        Some(path) => fs::write(path, out)
            .with_context(|| format!("writing grid output to {}", path.display()))?,
        None => print!("{out}"),
    }

    Ok(())
}

fn load_points(path: &PathBuf) -> anyhow::Result<Vec<GridPoint>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading points file {}", path.display()))?;
    let pairs = table::parse_two_column(&text)
        .with_context(|| format!("parsing points file {}", path.display()))?;
    Ok(pairs
        .into_iter()
        .map(|(lon, lat)| GridPoint { lon, lat })
        .collect())
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

/// Load a regular lat-lon raster via [`raster_text`]'s shared text format —
/// a header line `lon_min lon_step n_lon lat_min lat_step n_lat nodata`
/// followed by `n_lon * n_lat` whitespace-separated values in row-major
/// order from the south-west corner. A real deployment would plug in a
/// NetCDF reader against the same [`paleo_backtrack::raster::RasterSource`]
/// trait instead (§9) — full raster-format support is out of scope here
/// (§1).
fn load_raster_text(path: &PathBuf) -> anyhow::Result<InMemoryRaster> {
    Ok(raster_text::load_raster_text_file(path)
        .with_context(|| format!("loading raster file {}", path.display()))?)
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
        let raster = load_raster_text(&entry.grid_path)
            .with_context(|| format!("loading dynamic-topography grid {}", entry.grid_path.display()))?;
        frames.push(DynamicTopographyFrame {
            age_ma: entry.age_ma,
            raster,
        });
    }
    Ok(DynamicTopographyModel::new(frames))
}
