//! Decompacted output and amended drill-site writers (§6).
//!
//! Column order in the written table follows the caller's `Vec<OutputColumn>`
//! verbatim; a column that doesn't apply to the row kind being written (e.g.
//! a backstrip-only bracket column on a backtrack row) is written empty
//! rather than omitted, so the header and data rows always line up.

use crate::types::{BackstripRow, BacktrackRow, OutputColumn, Well};

const COLUMN_SEPARATOR: &str = "\t";

/// Render backtrack rows as a tab-separated table with the given column
/// selection and order (§6).
pub fn format_backtrack_table(rows: &[BacktrackRow], columns: &[OutputColumn]) -> String {
    let mut out = String::new();
    out.push_str(&header_line(columns));
    out.push('\n');
    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|c| backtrack_field(row, *c).unwrap_or_default())
            .collect();
        out.push_str(&fields.join(COLUMN_SEPARATOR));
        out.push('\n');
    }
    out
}

/// Render backstrip rows as a tab-separated table with the given column
/// selection and order (§6).
pub fn format_backstrip_table(rows: &[BackstripRow], columns: &[OutputColumn]) -> String {
    let mut out = String::new();
    out.push_str(&header_line(columns));
    out.push('\n');
    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|c| backstrip_field(row, *c).unwrap_or_default())
            .collect();
        out.push_str(&fields.join(COLUMN_SEPARATOR));
        out.push('\n');
    }
    out
}

fn header_line(columns: &[OutputColumn]) -> String {
    columns
        .iter()
        .map(|c| c.header())
        .collect::<Vec<_>>()
        .join(COLUMN_SEPARATOR)
}

fn backtrack_field(row: &BacktrackRow, column: OutputColumn) -> Option<String> {
    use OutputColumn::*;
    Some(match column {
        Age => fmt(row.age_ma),
        CompactedDepth => fmt(row.compacted_depth_m),
        CompactedThickness => fmt(row.compacted_thickness_m),
        DecompactedThickness => fmt(row.decompacted_thickness_m),
        DecompactedDensity => fmt(row.decompacted_density_kg_m3),
        DecompactedSedimentRate => fmt(row.decompacted_sediment_rate_m_per_myr),
        DecompactedDepth => fmt(row.decompacted_depth_m),
        DynamicTopography => fmt(row.dynamic_topography_m),
        TectonicSubsidence => fmt(row.tectonic_subsidence_m),
        WaterDepth => fmt(row.water_depth_m),
        Lithology => row.lithology_label.clone(),
        MinTectonicSubsidence | MaxTectonicSubsidence | AverageTectonicSubsidence | MinWaterDepth
        | MaxWaterDepth | AverageWaterDepth => return None,
    })
}

fn backstrip_field(row: &BackstripRow, column: OutputColumn) -> Option<String> {
    use OutputColumn::*;
    Some(match column {
        Age => fmt(row.age_ma),
        CompactedDepth => fmt(row.compacted_depth_m),
        CompactedThickness => fmt(row.compacted_thickness_m),
        DecompactedThickness => fmt(row.decompacted_thickness_m),
        DecompactedDensity => fmt(row.decompacted_density_kg_m3),
        MinTectonicSubsidence => fmt(row.min_tectonic_subsidence_m),
        MaxTectonicSubsidence => fmt(row.max_tectonic_subsidence_m),
        AverageTectonicSubsidence => fmt(row.average_tectonic_subsidence_m),
        MinWaterDepth => fmt(row.min_water_depth_m),
        MaxWaterDepth => fmt(row.max_water_depth_m),
        AverageWaterDepth => fmt(row.average_water_depth_m),
        Lithology => row.lithology_label.clone(),
        DecompactedSedimentRate | DecompactedDepth | DynamicTopography | TectonicSubsidence
        | WaterDepth => return None,
    })
}

fn fmt(value: f64) -> String {
    format!("{value:.6}")
}

/// Echo a well back out in the same textual format [`crate::io::drill_site`]
/// reads, including any synthesized base sediment layer (§6's "amended
/// drill-site output").
pub fn format_amended_well(well: &Well) -> String {
    let mut out = String::new();
    out.push_str(&format!("# SiteLongitude = {}\n", well.site_longitude));
    out.push_str(&format!("# SiteLatitude = {}\n", well.site_latitude));
    out.push_str(&format!("# SurfaceAge = {}\n", well.surface_age_ma));
    if let Some(crust_age) = well.crust_age_ma {
        out.push_str(&format!("# CrustAge = {crust_age}\n"));
    }
    if let Some(rift_start) = well.rift_start_age_ma {
        out.push_str(&format!("# RiftStartAge = {rift_start}\n"));
    }
    if let Some(rift_end) = well.rift_end_age_ma {
        out.push_str(&format!("# RiftEndAge = {rift_end}\n"));
    }

    for unit in &well.units {
        let mut fields = vec![format!("{}", unit.bottom_age_ma), format!("{}", unit.bottom_depth_m)];
        for component in &unit.lithology.components {
            fields.push(component.name.clone());
            fields.push(format!("{}", component.fraction));
        }
        if let Some(bracket) = unit.water_depth {
            fields.push(format!("{}", bracket.min_m));
            fields.push(format!("{}", bracket.max_m));
        }
        out.push_str(&fields.join(" "));
        out.push('\n');
    }
    out
}
