//! Backstrip driver (§4.8).
//!
//! Inverts the same isostatic load-balance equation as the backtrack driver,
//! but in the other direction: recorded min/max paleo water depths per layer
//! are known, and tectonic subsidence is solved for rather than assumed from
//! a model. No age-to-depth curve, rift parameters or dynamic topography
//! enter this calculation (§4.8) — only decompaction and sea level.

use crate::config;
use crate::decompaction::decompact_column;
use crate::error::PaleoError;
use crate::sea_level::SeaLevelModel;
use crate::types::{BackstripRow, StratigraphicUnit, Warning, Well};

pub struct BackstripContext<'a> {
    pub sea_level: &'a SeaLevelModel,
}

/// Run the backstrip driver, producing one row per layer top age (plus the
/// bottom of the deepest layer) with inverted min/max/average tectonic
/// subsidence.
pub fn run(
    well: &Well,
    ctx: &BackstripContext,
) -> Result<(Vec<BackstripRow>, Vec<Warning>), PaleoError> {
    well.validate()?;

    let cfg = config::get();
    let rho_m = cfg.densities.mantle_kg_m3;
    let rho_w = cfg.densities.water_kg_m3;

    let units = &well.units;
    let query_points = query_points(units);

    let mut rows = Vec::with_capacity(query_points.len());

    for (t_k, bracket) in query_points {
        let column = decompact_column(
            units,
            t_k,
            rho_w,
            cfg.numerics.decompaction_tolerance_m,
            cfg.numerics.max_bisection_iterations,
        )?;

        let delta_sl = ctx.sea_level.mean_over(0.0, t_k);
        let isostatic_term = (rho_m - column.average_density_kg_m3) / (rho_m - rho_w)
            * column.total_thickness_m
            - delta_sl * rho_m / (rho_m - rho_w);

        let (w_min, w_max) = match bracket {
            Some(b) => (b.min_m, b.max_m),
            None => (0.0, 0.0),
        };

        // Invert W = S - isostatic_term  =>  S = W + isostatic_term.
        let min_tectonic_subsidence_m = w_min + isostatic_term;
        let max_tectonic_subsidence_m = w_max + isostatic_term;
        let average_tectonic_subsidence_m =
            0.5 * (min_tectonic_subsidence_m + max_tectonic_subsidence_m);

        let lithology_label = units
            .iter()
            .find(|u| t_k >= u.top_age_ma && t_k < u.bottom_age_ma)
            .or_else(|| units.last())
            .map(label_for_unit)
            .unwrap_or_default();

        let (compacted_depth_m, compacted_thickness_m) = compacted_depth_at_age(units, t_k);

        rows.push(BackstripRow {
            age_ma: t_k,
            compacted_depth_m,
            compacted_thickness_m,
            decompacted_thickness_m: column.total_thickness_m,
            decompacted_density_kg_m3: column.average_density_kg_m3,
            min_tectonic_subsidence_m,
            max_tectonic_subsidence_m,
            average_tectonic_subsidence_m,
            min_water_depth_m: w_min,
            max_water_depth_m: w_max,
            average_water_depth_m: 0.5 * (w_min + w_max),
            lithology_label,
        });
    }

    Ok((rows, Vec::new()))
}

/// For each layer top age (plus the bottom of the deepest layer), pick the
/// water-depth bracket recorded for the layer that age belongs to. The
/// bottom-of-deepest-layer point reuses that layer's own bracket, matching
/// the base-sediment-layer rule in §4.2.
fn query_points(
    units: &[StratigraphicUnit],
) -> Vec<(f64, Option<crate::types::WaterDepthBracket>)> {
    let mut points = Vec::new();
    for unit in units {
        points.push((unit.top_age_ma, unit.water_depth));
    }
    if let Some(last) = units.last() {
        points.push((last.bottom_age_ma, last.water_depth));
    }
    points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    points.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-9);
    points
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
