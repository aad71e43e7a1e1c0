//! Stratigraphic column and well-record types (§3).

use serde::{Deserialize, Serialize};

use super::CompositeLithology;
use crate::error::PaleoError;

/// Recorded minimum/maximum paleo water depth for a stratigraphic unit,
/// present only when the well is destined for backstripping (§3, §9).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaterDepthBracket {
    pub min_m: f64,
    pub max_m: f64,
}

/// A single stratigraphic unit (layer), present-day compacted geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratigraphicUnit {
    /// Age of the top of the layer [Ma].
    pub top_age_ma: f64,
    /// Age of the bottom of the layer [Ma].
    pub bottom_age_ma: f64,
    /// Present-day compacted depth of the top of the layer [m bsf].
    pub top_depth_m: f64,
    /// Present-day compacted depth of the bottom of the layer [m bsf].
    pub bottom_depth_m: f64,
    pub lithology: CompositeLithology,
    /// Present only for backstripping wells (§3, §9).
    pub water_depth: Option<WaterDepthBracket>,
}

impl StratigraphicUnit {
    pub fn thickness_m(&self) -> f64 {
        self.bottom_depth_m - self.top_depth_m
    }
}

/// Site-level record: location, timing, ordered layers, optional rift
/// window, all per §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Well {
    pub site_longitude: f64,
    pub site_latitude: f64,
    /// Age of the present-day sediment surface [Ma]. Defaults to 0 (§3).
    #[serde(default)]
    pub surface_age_ma: f64,
    pub units: Vec<StratigraphicUnit>,
    /// Oceanic crust age [Ma], required for the oceanic branch (§4.7).
    #[serde(default)]
    pub crust_age_ma: Option<f64>,
    /// Continental rift start age [Ma] (t_rs).
    #[serde(default)]
    pub rift_start_age_ma: Option<f64>,
    /// Continental rift end age [Ma] (t_re).
    #[serde(default)]
    pub rift_end_age_ma: Option<f64>,
}

impl Well {
    /// Validate the ordering and gap-free invariants named in §3:
    /// `bottom_age > top_age`, `bottom_depth > top_depth`, layers ordered by
    /// depth with no gaps, and the first layer's top matching surface age
    /// and depth 0.
    pub fn validate(&self) -> Result<(), PaleoError> {
        if self.units.is_empty() {
            return Ok(());
        }

        let first = &self.units[0];
        if (first.top_depth_m - 0.0).abs() > 1e-9 {
            return Err(PaleoError::BadInputFormat {
                path: Default::default(),
                line: 0,
                message: format!(
                    "first stratigraphic unit must have top_depth = 0, got {}",
                    first.top_depth_m
                ),
            });
        }
        if (first.top_age_ma - self.surface_age_ma).abs() > 1e-9 {
            return Err(PaleoError::BadInputFormat {
                path: Default::default(),
                line: 0,
                message: format!(
                    "first stratigraphic unit top_age ({}) must equal surface age ({})",
                    first.top_age_ma, self.surface_age_ma
                ),
            });
        }

        for (i, unit) in self.units.iter().enumerate() {
            if unit.bottom_age_ma <= unit.top_age_ma {
                return Err(PaleoError::BadInputFormat {
                    path: Default::default(),
                    line: i,
                    message: format!(
                        "layer {i}: bottom_age ({}) must be strictly greater than top_age ({})",
                        unit.bottom_age_ma, unit.top_age_ma
                    ),
                });
            }
            if unit.bottom_depth_m <= unit.top_depth_m {
                return Err(PaleoError::BadInputFormat {
                    path: Default::default(),
                    line: i,
                    message: format!(
                        "layer {i}: bottom_depth ({}) must be strictly greater than top_depth ({})",
                        unit.bottom_depth_m, unit.top_depth_m
                    ),
                });
            }
            if i > 0 {
                let prev = &self.units[i - 1];
                if (unit.top_depth_m - prev.bottom_depth_m).abs() > 1e-6 {
                    return Err(PaleoError::BadInputFormat {
                        path: Default::default(),
                        line: i,
                        message: format!(
                            "layer {i}: top_depth ({}) must equal the previous layer's bottom_depth ({})",
                            unit.top_depth_m, prev.bottom_depth_m
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether this well is set up for the continental branch (a rift
    /// window is present) rather than the oceanic branch (a crust age is
    /// present). Mirrors the branch selection used in §4.7.
    pub fn is_continental(&self) -> bool {
        self.rift_end_age_ma.is_some()
    }

    /// Present-day (deepest) recorded drill-site depth, i.e. the bottom
    /// depth of the last recorded unit.
    pub fn recorded_depth_m(&self) -> f64 {
        self.units.last().map(|u| u.bottom_depth_m).unwrap_or(0.0)
    }
}

/// A column layer decompacted to a particular age `t` (§3, §4.2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecompactedLayer {
    pub decompacted_top_depth_m: f64,
    pub decompacted_bottom_depth_m: f64,
    pub decompacted_thickness_m: f64,
    /// Average density over the decompacted thickness [kg/m³].
    pub average_density_kg_m3: f64,
    /// Average porosity over the decompacted thickness.
    pub average_porosity: f64,
}
