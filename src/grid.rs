//! Paleobathymetry gridding driver (§5).
//!
//! Applies the backtrack core to many present-day points with no
//! stratigraphic column — each point is bare crust, so the isostatic
//! equation degenerates to tectonic subsidence alone (no sediment load).
//! Points are partitioned across a `rayon` thread pool; each worker holds
//! only immutable references to the shared rasters and models (§5's no-
//! shared-mutable-state rule). Cancellation is cooperative, checked once
//! per point boundary via a shared `AtomicBool`.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::age_depth::AgeDepthModel;
use crate::config;
use crate::dynamic_topography::{self, OldestAgeWarningLatch};
use crate::raster::RasterSource;
use crate::reconstruction::PlateReconstruction;
use crate::rift::{self, RiftParameters};
use crate::sea_level::SeaLevelModel;
use crate::types::{DynamicTopographyModel, Warning};

/// A single present-day location to reconstruct.
#[derive(Debug, Clone, Copy)]
pub struct GridPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Shared, read-only inputs every worker samples from (§5).
pub struct GridInputs<'a> {
    pub oceanic_age: &'a dyn RasterSource,
    pub bathymetry: &'a dyn RasterSource,
    pub crustal_thickness: Option<&'a dyn RasterSource>,
    pub rift_start: Option<&'a dyn RasterSource>,
    pub rift_end: Option<&'a dyn RasterSource>,
    pub age_depth_model: &'a dyn AgeDepthModel,
    pub dynamic_topography: Option<&'a DynamicTopographyModel>,
    pub plates: &'a dyn PlateReconstruction,
    pub sea_level: &'a SeaLevelModel,
}

/// A per-point reconstruction result. `water_depth_m` is `NaN` when the
/// point's calculation failed in a way that shouldn't abort the whole grid
/// (§7: "otherwise surfaces as NaN in the affected column").
#[derive(Debug, Clone)]
pub struct GridResult {
    pub point: GridPoint,
    pub water_depth_m: f64,
    pub warnings: Vec<Warning>,
}

/// Reconstruct water depth at time `t_ma` for every point, in parallel.
/// Points still in flight when `cancel` is set abandon their partial work
/// and are omitted from the result entirely (§5).
pub fn run_grid(points: &[GridPoint], t_ma: f64, inputs: &GridInputs, cancel: &AtomicBool) -> Vec<GridResult> {
    points
        .par_iter()
        .filter_map(|point| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some(reconstruct_point(*point, t_ma, inputs))
        })
        .collect()
}

fn reconstruct_point(point: GridPoint, t_ma: f64, inputs: &GridInputs) -> GridResult {
    let cfg = config::get();
    let rho_m = cfg.densities.mantle_kg_m3;
    let rho_w = cfg.densities.water_kg_m3;
    let mut warnings = Vec::new();

    let delta_sl = inputs.sea_level.mean_over(0.0, t_ma) * rho_m / (rho_m - rho_w);

    let age_at_site = inputs.oceanic_age.sample(point.lon, point.lat);

    let water_depth_m = match age_at_site {
        Some(age_crust_ma) => match oceanic_subsidence(point, age_crust_ma, t_ma, inputs) {
            Ok(s) => s + delta_sl,
            Err(e) => {
                warnings.push(Warning::from(&e));
                f64::NAN
            }
        },
        None => match continental_subsidence(point, t_ma, inputs, &mut warnings) {
            Ok(s) => s + delta_sl,
            Err(e) => {
                warnings.push(Warning::from(&e));
                f64::NAN
            }
        },
    };

    GridResult {
        point,
        water_depth_m,
        warnings,
    }
}

fn oceanic_subsidence(
    point: GridPoint,
    age_crust_ma: f64,
    t_ma: f64,
    inputs: &GridInputs,
) -> Result<f64, crate::error::PaleoError> {
    let s0 = inputs
        .bathymetry
        .sample_or_err(point.lon, point.lat)
        .map(|v| -v)?;

    let latch = OldestAgeWarningLatch::new();
    let dyn_h0 = dynamic_topography_contribution(point, 0.0, 0.0, inputs, &latch)?;
    let offset_m = s0 - dyn_h0 - inputs.age_depth_model.depth(age_crust_ma);

    let dyn_ht = dynamic_topography_contribution(point, t_ma, 0.0, inputs, &latch)?;
    let subsidence = inputs.age_depth_model.depth((age_crust_ma - t_ma).max(0.0)) + offset_m + dyn_ht;
    Ok(subsidence)
}

fn continental_subsidence(
    point: GridPoint,
    t_ma: f64,
    inputs: &GridInputs,
    warnings: &mut Vec<Warning>,
) -> Result<f64, crate::error::PaleoError> {
    use crate::error::PaleoError;

    let (rift_start, rift_end, crustal_thickness) = match (inputs.rift_start, inputs.rift_end, inputs.crustal_thickness)
    {
        (Some(rs), Some(re), Some(ct)) => (
            rs.sample_or_err(point.lon, point.lat)?,
            re.sample_or_err(point.lon, point.lat)?,
            ct.sample_or_err(point.lon, point.lat)?,
        ),
        _ => return Err(PaleoError::RiftParametersMissing),
    };

    let cfg = config::get();
    let params = RiftParameters {
        rift_start_age_ma: rift_start,
        rift_end_age_ma: rift_end,
        crustal_thickness_present_m: crustal_thickness,
        lithospheric_thickness_m: cfg.rift.lithospheric_thickness_m,
    };

    let s0 = inputs.bathymetry.sample_or_err(point.lon, point.lat).map(|v| -v)?;
    let latch = OldestAgeWarningLatch::new();
    let dyn_h0 = dynamic_topography_contribution(point, 0.0, rift_start, inputs, &latch)?;

    let beta = rift::estimate_beta(&params, s0 - dyn_h0)?;
    if beta.was_clamped && beta.residual_m > cfg.rift.beta_residual_tolerance_m {
        warnings.push(Warning::from(&PaleoError::InfeasibleStretching {
            beta_max: rift::beta_max(&params),
            residual_m: beta.residual_m,
        }));
    }

    let beta_t = rift::beta_at_time(&params, beta.clamped, t_ma);
    let syn = rift::syn_rift_subsidence(&params, beta_t);
    let value = if t_ma <= rift_end {
        syn + rift::post_rift_subsidence(beta_t, (rift_end - t_ma).max(0.0))
    } else {
        syn
    };

    let dyn_ht = dynamic_topography_contribution(point, t_ma, rift_start, inputs, &latch)?;
    Ok(value + dyn_ht)
}

fn dynamic_topography_contribution(
    point: GridPoint,
    t_ma: f64,
    reference_ma: f64,
    inputs: &GridInputs,
    latch: &OldestAgeWarningLatch,
) -> Result<f64, crate::error::PaleoError> {
    match inputs.dynamic_topography {
        None => Ok(0.0),
        Some(model) => dynamic_topography::contribution(
            model,
            inputs.plates,
            point.lon,
            point.lat,
            t_ma,
            reference_ma,
            latch,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age_depth::Gdh1;
    use crate::config::{self as engine_config, EngineConfig};
    use crate::raster::InMemoryRaster;
    use crate::reconstruction::StaticPlateModel;

    fn init_config() {
        if !engine_config::is_initialized() {
            engine_config::init(EngineConfig::default());
        }
    }

    #[test]
    fn oceanic_points_reconstruct_without_error() {
        init_config();
        let age_raster = InMemoryRaster::constant("age", 50.0);
        let bathymetry = InMemoryRaster::constant("bathy", -4000.0);
        let model = Gdh1;
        let plates = StaticPlateModel::identity();
        let sea_level = SeaLevelModel::none();

        let inputs = GridInputs {
            oceanic_age: &age_raster,
            bathymetry: &bathymetry,
            crustal_thickness: None,
            rift_start: None,
            rift_end: None,
            age_depth_model: &model,
            dynamic_topography: None,
            plates: &plates,
            sea_level: &sea_level,
        };

        let points = vec![GridPoint { lon: 10.0, lat: 10.0 }, GridPoint { lon: -30.0, lat: 5.0 }];
        let cancel = AtomicBool::new(false);
        let results = run_grid(&points, 25.0, &inputs, &cancel);
        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(r.water_depth_m.is_finite());
        }
    }

    #[test]
    fn continental_points_without_rift_rasters_yield_nan_with_warning() {
        init_config();
        let age_raster = InMemoryRaster::new("age", -180.0, 360.0, 2, -90.0, 180.0, 2, vec![f64::NAN; 4], f64::NAN);
        let bathymetry = InMemoryRaster::constant("bathy", -200.0);
        let model = Gdh1;
        let plates = StaticPlateModel::identity();
        let sea_level = SeaLevelModel::none();

        let inputs = GridInputs {
            oceanic_age: &age_raster,
            bathymetry: &bathymetry,
            crustal_thickness: None,
            rift_start: None,
            rift_end: None,
            age_depth_model: &model,
            dynamic_topography: None,
            plates: &plates,
            sea_level: &sea_level,
        };

        let points = vec![GridPoint { lon: 10.0, lat: 10.0 }];
        let cancel = AtomicBool::new(false);
        let results = run_grid(&points, 25.0, &inputs, &cancel);
        assert_eq!(results.len(), 1);
        assert!(results[0].water_depth_m.is_nan());
        assert!(!results[0].warnings.is_empty());
    }

    #[test]
    fn cancellation_before_start_yields_no_results() {
        init_config();
        let age_raster = InMemoryRaster::constant("age", 50.0);
        let bathymetry = InMemoryRaster::constant("bathy", -4000.0);
        let model = Gdh1;
        let plates = StaticPlateModel::identity();
        let sea_level = SeaLevelModel::none();

        let inputs = GridInputs {
            oceanic_age: &age_raster,
            bathymetry: &bathymetry,
            crustal_thickness: None,
            rift_start: None,
            rift_end: None,
            age_depth_model: &model,
            dynamic_topography: None,
            plates: &plates,
            sea_level: &sea_level,
        };

        let points = vec![GridPoint { lon: 10.0, lat: 10.0 }];
        let cancel = AtomicBool::new(true);
        let results = run_grid(&points, 25.0, &inputs, &cancel);
        assert!(results.is_empty());
    }
}
