//! Drill-site file format (§6).
//!
//! `# Key = value` header lines supply site attributes (`SiteLongitude`,
//! `SiteLatitude`, `SurfaceAge`, `RiftStartAge`, `RiftEndAge`, plus an
//! engine-added `CrustAge` for the oceanic branch). Data lines are
//! whitespace-separated: `bottom_age bottom_depth (lithology_name fraction)+
//! [min_water_depth max_water_depth]`. A lithology token is distinguished
//! from the trailing water-depth pair by trying to parse it as a number —
//! lithology names never do.

use std::path::Path;

use crate::error::PaleoError;
use crate::registry::LithologyRegistry;
use crate::types::{
    CompositeLithology, LithologyFraction, StratigraphicUnit, WaterDepthBracket, Well,
};

/// Tolerance on lithology-fraction sums (§6): accepted within `1 ± 1e-3`.
const FRACTION_SUM_TOLERANCE: f64 = 1.0e-3;

#[derive(Debug, Default)]
struct Header {
    site_longitude: Option<f64>,
    site_latitude: Option<f64>,
    surface_age_ma: Option<f64>,
    rift_start_age_ma: Option<f64>,
    rift_end_age_ma: Option<f64>,
    crust_age_ma: Option<f64>,
}

/// Parse a drill-site file's textual contents into a [`Well`], resolving
/// lithology references against `registry`.
pub fn parse_well(source: &str, registry: &LithologyRegistry) -> Result<Well, PaleoError> {
    let mut header = Header::default();
    let mut units = Vec::new();

    let mut top_age_ma = 0.0;
    let mut top_depth_m = 0.0;
    let mut first_data_line = true;

    for (lineno, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            if let Some((key, value)) = rest.split_once('=') {
                apply_header(&mut header, key.trim(), value.trim(), lineno + 1)?;
            }
            // A bare `#` comment with no `key = value` is skipped.
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(bad_format(
                lineno + 1,
                format!(
                    "data line needs at least bottom_age, bottom_depth and one lithology pair, got {} fields",
                    fields.len()
                ),
            ));
        }

        let bottom_age_ma = parse_number(fields[0], lineno + 1)?;
        let bottom_depth_m = parse_number(fields[1], lineno + 1)?;

        if first_data_line {
            top_age_ma = header.surface_age_ma.unwrap_or(0.0);
            top_depth_m = 0.0;
        }

        let (lithology_fields, water_depth_fields) = split_tail(&fields[2..], lineno + 1)?;
        let components = parse_lithology_fractions(lithology_fields, lineno + 1)?;
        verify_fraction_sum(&components, lineno + 1)?;

        let lithology = CompositeLithology::resolve(&components, |name| registry.lookup(name))
            .map_err(PaleoError::UnknownLithology)?;

        let water_depth = match water_depth_fields {
            Some((min_raw, max_raw)) => Some(WaterDepthBracket {
                min_m: parse_number(min_raw, lineno + 1)?,
                max_m: parse_number(max_raw, lineno + 1)?,
            }),
            None => None,
        };

        units.push(StratigraphicUnit {
            top_age_ma,
            bottom_age_ma,
            top_depth_m,
            bottom_depth_m,
            lithology,
            water_depth,
        });

        top_age_ma = bottom_age_ma;
        top_depth_m = bottom_depth_m;
        first_data_line = false;
    }

    let well = Well {
        site_longitude: header.site_longitude.unwrap_or(0.0),
        site_latitude: header.site_latitude.unwrap_or(0.0),
        surface_age_ma: header.surface_age_ma.unwrap_or(0.0),
        units,
        crust_age_ma: header.crust_age_ma,
        rift_start_age_ma: header.rift_start_age_ma,
        rift_end_age_ma: header.rift_end_age_ma,
    };
    well.validate()?;
    Ok(well)
}

/// Parse a drill-site file from disk, attaching its path to parse errors.
pub fn parse_well_file(path: &Path, registry: &LithologyRegistry) -> Result<Well, PaleoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| PaleoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_well(&contents, registry).map_err(|e| with_path(e, path))
}

fn with_path(e: PaleoError, path: &Path) -> PaleoError {
    match e {
        PaleoError::BadInputFormat { line, message, .. } => PaleoError::BadInputFormat {
            path: path.to_path_buf(),
            line,
            message,
        },
        other => other,
    }
}

fn apply_header(header: &mut Header, key: &str, value: &str, lineno: usize) -> Result<(), PaleoError> {
    let parsed = || parse_number(value, lineno);
    match key {
        "SiteLongitude" => header.site_longitude = Some(parsed()?),
        "SiteLatitude" => header.site_latitude = Some(parsed()?),
        "SurfaceAge" => header.surface_age_ma = Some(parsed()?),
        "RiftStartAge" => header.rift_start_age_ma = Some(parsed()?),
        "RiftEndAge" => header.rift_end_age_ma = Some(parsed()?),
        "CrustAge" => header.crust_age_ma = Some(parsed()?),
        _ => {
            // Unrecognized header keys are ignored rather than rejected, so a
            // file carrying forward-compatible metadata still parses.
        }
    }
    Ok(())
}

/// Split the fields after `bottom_age`/`bottom_depth` into the lithology
/// `(name, fraction)` run and an optional trailing `(min, max)` water-depth
/// pair, disambiguated by whether a field parses as a number.
fn split_tail<'a>(
    fields: &'a [&'a str],
    lineno: usize,
) -> Result<(&'a [&'a str], Option<(&'a str, &'a str)>), PaleoError> {
    let mut split_at = fields.len();
    let mut idx = 0;
    while idx < fields.len() {
        if fields[idx].parse::<f64>().is_ok() {
            split_at = idx;
            break;
        }
        // Skip the fraction value that follows this lithology name.
        idx += 2;
    }

    if split_at == fields.len() {
        return Ok((fields, None));
    }

    let remainder = &fields[split_at..];
    if remainder.len() != 2 {
        return Err(bad_format(
            lineno,
            format!(
                "trailing numeric fields must be exactly min_water_depth and max_water_depth, got {} fields",
                remainder.len()
            ),
        ));
    }
    Ok((&fields[..split_at], Some((remainder[0], remainder[1]))))
}

fn parse_lithology_fractions(
    fields: &[&str],
    lineno: usize,
) -> Result<Vec<LithologyFraction>, PaleoError> {
    if fields.is_empty() || fields.len() % 2 != 0 {
        return Err(bad_format(
            lineno,
            format!(
                "lithology tokens must come in (name, fraction) pairs, got {} fields",
                fields.len()
            ),
        ));
    }
    let mut components = Vec::with_capacity(fields.len() / 2);
    for pair in fields.chunks(2) {
        let name = pair[0].to_string();
        let fraction = parse_number(pair[1], lineno)?;
        components.push(LithologyFraction { name, fraction });
    }
    Ok(components)
}

fn verify_fraction_sum(components: &[LithologyFraction], lineno: usize) -> Result<(), PaleoError> {
    let sum: f64 = components.iter().map(|c| c.fraction).sum();
    if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
        return Err(bad_format(
            lineno,
            format!("lithology fractions must sum to 1.0 +/- {FRACTION_SUM_TOLERANCE}, got {sum}"),
        ));
    }
    Ok(())
}

fn parse_number(field: &str, lineno: usize) -> Result<f64, PaleoError> {
    field
        .parse::<f64>()
        .map_err(|_| bad_format(lineno, format!("could not parse '{field}' as a number")))
}

fn bad_format(line: usize, message: String) -> PaleoError {
    PaleoError::BadInputFormat {
        path: Default::default(),
        line,
        message,
    }
}
