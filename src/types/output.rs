//! Output column selection and diagnostic warning types (§6, §7).

use serde::{Deserialize, Serialize};

use crate::error::PaleoError;

/// Every selectable column in the decompacted output table (§6). Column
/// order in the written table follows the caller's `Vec<OutputColumn>`
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputColumn {
    Age,
    CompactedDepth,
    CompactedThickness,
    DecompactedThickness,
    DecompactedDensity,
    DecompactedSedimentRate,
    DecompactedDepth,
    DynamicTopography,
    TectonicSubsidence,
    WaterDepth,
    MinTectonicSubsidence,
    MaxTectonicSubsidence,
    AverageTectonicSubsidence,
    MinWaterDepth,
    MaxWaterDepth,
    AverageWaterDepth,
    Lithology,
}

impl OutputColumn {
    pub fn header(self) -> &'static str {
        match self {
            OutputColumn::Age => "age",
            OutputColumn::CompactedDepth => "compacted_depth",
            OutputColumn::CompactedThickness => "compacted_thickness",
            OutputColumn::DecompactedThickness => "decompacted_thickness",
            OutputColumn::DecompactedDensity => "decompacted_density",
            OutputColumn::DecompactedSedimentRate => "decompacted_sediment_rate",
            OutputColumn::DecompactedDepth => "decompacted_depth",
            OutputColumn::DynamicTopography => "dynamic_topography",
            OutputColumn::TectonicSubsidence => "tectonic_subsidence",
            OutputColumn::WaterDepth => "water_depth",
            OutputColumn::MinTectonicSubsidence => "min_tectonic_subsidence",
            OutputColumn::MaxTectonicSubsidence => "max_tectonic_subsidence",
            OutputColumn::AverageTectonicSubsidence => "average_tectonic_subsidence",
            OutputColumn::MinWaterDepth => "min_water_depth",
            OutputColumn::MaxWaterDepth => "max_water_depth",
            OutputColumn::AverageWaterDepth => "average_water_depth",
            OutputColumn::Lithology => "lithology",
        }
    }
}

/// The default column set used by the backtrack driver when a caller does
/// not supply an explicit selection.
pub fn default_backtrack_columns() -> Vec<OutputColumn> {
    use OutputColumn::*;
    vec![
        Age,
        CompactedDepth,
        CompactedThickness,
        DecompactedThickness,
        DecompactedDensity,
        DecompactedDepth,
        DynamicTopography,
        TectonicSubsidence,
        WaterDepth,
        Lithology,
    ]
}

/// The default column set used by the backstrip driver.
pub fn default_backstrip_columns() -> Vec<OutputColumn> {
    use OutputColumn::*;
    vec![
        Age,
        CompactedDepth,
        CompactedThickness,
        DecompactedThickness,
        DecompactedDensity,
        MinTectonicSubsidence,
        MaxTectonicSubsidence,
        AverageTectonicSubsidence,
        MinWaterDepth,
        MaxWaterDepth,
        AverageWaterDepth,
        Lithology,
    ]
}

/// A non-fatal condition encountered during a driver run (§7): recoverable
/// error kinds are reported here in addition to being logged via
/// `tracing::warn!`, so a non-interactive caller can inspect what happened.
#[derive(Debug, Clone)]
pub struct Warning {
    pub message: String,
}

impl From<&PaleoError> for Warning {
    fn from(e: &PaleoError) -> Self {
        Warning {
            message: e.to_string(),
        }
    }
}

/// One row of the backtrack driver's output: the decompacted/subsidence
/// state of the column at a single stratigraphic age (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktrackRow {
    pub age_ma: f64,
    pub compacted_depth_m: f64,
    pub compacted_thickness_m: f64,
    pub decompacted_thickness_m: f64,
    pub decompacted_density_kg_m3: f64,
    pub decompacted_sediment_rate_m_per_myr: f64,
    pub decompacted_depth_m: f64,
    pub dynamic_topography_m: f64,
    pub tectonic_subsidence_m: f64,
    pub water_depth_m: f64,
    pub lithology_label: String,
}

/// One row of the backstrip driver's output (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackstripRow {
    pub age_ma: f64,
    pub compacted_depth_m: f64,
    pub compacted_thickness_m: f64,
    pub decompacted_thickness_m: f64,
    pub decompacted_density_kg_m3: f64,
    pub min_tectonic_subsidence_m: f64,
    pub max_tectonic_subsidence_m: f64,
    pub average_tectonic_subsidence_m: f64,
    pub min_water_depth_m: f64,
    pub max_water_depth_m: f64,
    pub average_water_depth_m: f64,
    pub lithology_label: String,
}
