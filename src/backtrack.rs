//! Backtrack driver (§4.7).
//!
//! Given a drill site's present-day stratigraphic column and a subsidence
//! model (oceanic age-to-depth curve or continental rift model), reconstruct
//! water depth through time: decompact the column at each layer's top age
//! (plus the base of the deepest layer), derive tectonic subsidence from the
//! chosen model, and close the isostatic load-balance equation for water
//! depth.

use tracing::warn;

use crate::age_depth::AgeDepthModel;
use crate::config;
use crate::decompaction::{base_sediment_layer, decompact_column};
use crate::dynamic_topography::{self, OldestAgeWarningLatch};
use crate::error::PaleoError;
use crate::reconstruction::PlateReconstruction;
use crate::registry::LithologyRegistry;
use crate::rift::{self, BetaEstimate, RiftParameters};
use crate::sea_level::SeaLevelModel;
use crate::types::{BacktrackRow, DynamicTopographyModel, StratigraphicUnit, Warning, Well};

/// Everything the backtrack driver needs beyond the well record itself.
pub struct BacktrackContext<'a> {
    pub registry: &'a LithologyRegistry,
    pub age_depth_model: Option<&'a dyn AgeDepthModel>,
    pub rift_params: Option<RiftParameters>,
    pub dynamic_topography: Option<&'a DynamicTopographyModel>,
    pub plates: &'a dyn PlateReconstruction,
    pub sea_level: &'a SeaLevelModel,
    /// Total sediment thickness sampled from a present-day raster at the
    /// site, if available (§4.2's base-layer rule).
    pub total_sediment_thickness_m: Option<f64>,
    /// Present-day water depth from a bathymetry raster (positive down).
    pub present_day_water_depth_m: f64,
}

/// Run the backtrack driver, producing one row per query age plus any
/// recoverable warnings encountered along the way.
pub fn run(
    well: &Well,
    ctx: &BacktrackContext,
) -> Result<(Vec<BacktrackRow>, Vec<Warning>), PaleoError> {
    well.validate()?;

    let mut warnings = Vec::new();
    let cfg = config::get();

    let mut units = well.units.clone();
    append_base_layer(well, ctx, &mut units, &mut warnings);

    let query_ages = query_ages(&units);

    let rho_m = cfg.densities.mantle_kg_m3;
    let rho_w = cfg.densities.water_kg_m3;

    let subsidence_model = build_subsidence_model(well, ctx, &units, &mut warnings)?;

    let mut rows = Vec::with_capacity(query_ages.len());
    let mut prev_depth: Option<(f64, f64)> = None; // (age, decompacted_depth) for sediment rate

    for t_k in query_ages {
        let column = decompact_column(
            &units,
            t_k,
            rho_w,
            cfg.numerics.decompaction_tolerance_m,
            cfg.numerics.max_bisection_iterations,
        )?;

        let tectonic_subsidence_m = subsidence_model.subsidence_at(t_k, &mut warnings)?;
        let dynamic_topography_m = subsidence_model.dynamic_topography_at(t_k, &mut warnings)?;

        let delta_sl = ctx.sea_level.mean_over(0.0, t_k);
        let water_depth_m = tectonic_subsidence_m
            - (rho_m - column.average_density_kg_m3) / (rho_m - rho_w) * column.total_thickness_m
            + delta_sl * rho_m / (rho_m - rho_w);

        let decompacted_depth_m = column.total_thickness_m;
        let decompacted_sediment_rate_m_per_myr = match prev_depth {
            Some((prev_age, prev_d)) if (prev_age - t_k).abs() > 1e-9 => {
                (decompacted_depth_m - prev_d) / (prev_age - t_k)
            }
            _ => 0.0,
        };
        prev_depth = Some((t_k, decompacted_depth_m));

        let lithology_label = units
            .iter()
            .find(|u| t_k >= u.top_age_ma && t_k < u.bottom_age_ma)
            .or_else(|| units.last())
            .map(label_for_unit)
            .unwrap_or_default();

        let (compacted_depth_m, compacted_thickness_m) = compacted_depth_at_age(&units, t_k);

        rows.push(BacktrackRow {
            age_ma: t_k,
            compacted_depth_m,
            compacted_thickness_m,
            decompacted_thickness_m: column.total_thickness_m,
            decompacted_density_kg_m3: column.average_density_kg_m3,
            decompacted_sediment_rate_m_per_myr,
            decompacted_depth_m,
            dynamic_topography_m,
            tectonic_subsidence_m,
            water_depth_m,
            lithology_label,
        });
    }

    Ok((rows, warnings))
}

fn append_base_layer(
    well: &Well,
    ctx: &BacktrackContext,
    units: &mut Vec<StratigraphicUnit>,
    warnings: &mut Vec<Warning>,
) {
    let Some(total_thickness) = ctx.total_sediment_thickness_m else {
        return;
    };
    let bottom_age_ma = if well.is_continental() {
        well.rift_start_age_ma.unwrap_or(well.surface_age_ma)
    } else {
        well.crust_age_ma.unwrap_or(well.surface_age_ma)
    };

    if well.recorded_depth_m() > total_thickness {
        let w = PaleoError::BasementShallowerThanDrillSite {
            drill_site_depth_m: well.recorded_depth_m(),
            total_thickness_m: total_thickness,
        };
        warn!(error = %w, "omitting base sediment layer");
        warnings.push(Warning::from(&w));
        return;
    }

    if let Some(layer) = base_sediment_layer(well, total_thickness, bottom_age_ma, ctx.registry) {
        units.push(layer);
    }
}

fn query_ages(units: &[StratigraphicUnit]) -> Vec<f64> {
    let mut ages: Vec<f64> = units.iter().map(|u| u.top_age_ma).collect();
    if let Some(last) = units.last() {
        ages.push(last.bottom_age_ma);
    }
    ages.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ages.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    ages
}

fn label_for_unit(unit: &StratigraphicUnit) -> String {
    unit.lithology
        .components
        .iter()
        .map(|c| format!("{}:{:.2}", c.name, c.fraction))
        .collect::<Vec<_>>()
        .join("+")
}

fn compacted_depth_at_age(units: &[StratigraphicUnit], t_ma: f64) -> (f64, f64) {
    for unit in units {
        if t_ma >= unit.top_age_ma && t_ma < unit.bottom_age_ma {
            return (unit.top_depth_m, unit.thickness_m());
        }
    }
    match units.last() {
        Some(u) => (u.bottom_depth_m, 0.0),
        None => (0.0, 0.0),
    }
}

/// The tectonic subsidence model selected for a well: oceanic age-to-depth
/// with an anomalous-crust offset, or continental rift subsidence.
enum SubsidenceModel<'a> {
    Oceanic {
        model: &'a dyn AgeDepthModel,
        age_crust_ma: f64,
        offset_m: f64,
    },
    Continental {
        params: RiftParameters,
        beta: BetaEstimate,
    },
}

impl<'a> SubsidenceModel<'a> {
    fn subsidence_at(&self, t_ma: f64, warnings: &mut Vec<Warning>) -> Result<f64, PaleoError> {
        match self {
            SubsidenceModel::Oceanic {
                model,
                age_crust_ma,
                offset_m,
            } => Ok(model.depth((age_crust_ma - t_ma).max(0.0)) + offset_m),
            SubsidenceModel::Continental { params, beta } => {
                let beta_t = rift::beta_at_time(params, beta.clamped, t_ma);
                let syn = rift::syn_rift_subsidence(params, beta_t);
                let value = if t_ma <= params.rift_end_age_ma {
                    let tau = (params.rift_end_age_ma - t_ma).max(0.0);
                    syn + rift::post_rift_subsidence(beta_t, tau)
                } else {
                    syn
                };
                if beta.was_clamped && (beta.residual_m - 0.0).abs() > 0.0 {
                    let cfg = config::get();
                    if beta.residual_m > cfg.rift.beta_residual_tolerance_m {
                        let w = PaleoError::InfeasibleStretching {
                            beta_max: rift::beta_max(params),
                            residual_m: beta.residual_m,
                        };
                        if !warnings.iter().any(|existing| existing.message == w.to_string()) {
                            warn!(error = %w, "stretching-factor estimation residual exceeds tolerance");
                            warnings.push(Warning::from(&w));
                        }
                    }
                }
                Ok(value)
            }
        }
    }
}

/// Wraps [`SubsidenceModel`] together with the dynamic-topography context
/// needed to evaluate its contribution term, since the enum above only
/// carries what's needed for the bare tectonic-subsidence calculation.
struct BoundSubsidenceModel<'a> {
    inner: SubsidenceModel<'a>,
    dynamic_topography: Option<&'a DynamicTopographyModel>,
    plates: &'a dyn PlateReconstruction,
    lon: f64,
    lat: f64,
    reference_ma: f64,
    latch: OldestAgeWarningLatch,
}

impl<'a> BoundSubsidenceModel<'a> {
    fn subsidence_at(&self, t_ma: f64, warnings: &mut Vec<Warning>) -> Result<f64, PaleoError> {
        self.inner.subsidence_at(t_ma, warnings)
    }

    fn dynamic_topography_at(&self, t_ma: f64, _warnings: &mut Vec<Warning>) -> Result<f64, PaleoError> {
        match self.dynamic_topography {
            None => Ok(0.0),
            Some(model) => dynamic_topography::contribution(
                model,
                self.plates,
                self.lon,
                self.lat,
                t_ma,
                self.reference_ma,
                &self.latch,
            ),
        }
    }
}

fn build_subsidence_model<'a>(
    well: &Well,
    ctx: &BacktrackContext<'a>,
    units: &[StratigraphicUnit],
    warnings: &mut Vec<Warning>,
) -> Result<BoundSubsidenceModel<'a>, PaleoError> {
    let cfg = config::get();
    let rho_m = cfg.densities.mantle_kg_m3;
    let rho_w = cfg.densities.water_kg_m3;

    let present_day_column = decompact_column(
        units,
        0.0,
        rho_w,
        cfg.numerics.decompaction_tolerance_m,
        cfg.numerics.max_bisection_iterations,
    )?;
    let delta_sl0 = ctx.sea_level.mean_over(0.0, 0.0);
    let s0 = ctx.present_day_water_depth_m
        + (rho_m - present_day_column.average_density_kg_m3) / (rho_m - rho_w)
            * present_day_column.total_thickness_m
        - delta_sl0 * rho_m / (rho_m - rho_w);

    if well.is_continental() {
        let rift_start = well.rift_start_age_ma.ok_or(PaleoError::RiftParametersMissing)?;
        let rift_end = well.rift_end_age_ma.ok_or(PaleoError::RiftParametersMissing)?;
        let params = ctx.rift_params.unwrap_or(RiftParameters {
            rift_start_age_ma: rift_start,
            rift_end_age_ma: rift_end,
            crustal_thickness_present_m: cfg.rift.crustal_thickness_present_m,
            lithospheric_thickness_m: cfg.rift.lithospheric_thickness_m,
        });

        let latch = OldestAgeWarningLatch::new();
        let dyn_h0 = match ctx.dynamic_topography {
            None => 0.0,
            Some(model) => dynamic_topography::contribution(
                model,
                ctx.plates,
                well.site_longitude,
                well.site_latitude,
                0.0,
                params.rift_start_age_ma,
                &latch,
            )?,
        };

        let beta = rift::estimate_beta(&params, s0 - dyn_h0)?;

        Ok(BoundSubsidenceModel {
            inner: SubsidenceModel::Continental { params, beta },
            dynamic_topography: ctx.dynamic_topography,
            plates: ctx.plates,
            lon: well.site_longitude,
            lat: well.site_latitude,
            reference_ma: params.rift_start_age_ma,
            latch,
        })
    } else {
        let age_crust_ma = well.crust_age_ma.ok_or_else(|| PaleoError::BadInputFormat {
            path: Default::default(),
            line: 0,
            message: "oceanic site requires crust_age_ma".to_string(),
        })?;
        let model = ctx.age_depth_model.ok_or_else(|| PaleoError::BadInputFormat {
            path: Default::default(),
            line: 0,
            message: "oceanic site requires an age-to-depth model".to_string(),
        })?;

        let latch = OldestAgeWarningLatch::new();
        let dyn_h0 = match ctx.dynamic_topography {
            None => 0.0,
            Some(dt_model) => dynamic_topography::contribution(
                dt_model,
                ctx.plates,
                well.site_longitude,
                well.site_latitude,
                0.0,
                0.0,
                &latch,
            )?,
        };
        let offset_m = s0 - dyn_h0 - model.depth(age_crust_ma);

        let _ = warnings;
        Ok(BoundSubsidenceModel {
            inner: SubsidenceModel::Oceanic {
                model,
                age_crust_ma,
                offset_m,
            },
            dynamic_topography: ctx.dynamic_topography,
            plates: ctx.plates,
            lon: well.site_longitude,
            lat: well.site_latitude,
            reference_ma: 0.0,
            latch,
        })
    }
}
