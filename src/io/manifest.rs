//! Dynamic-topography model descriptor (§6).
//!
//! A small manifest format listing mantle-frame grid files with their ages,
//! a static-polygons file, and one or more rotation files. Reading the grid
//! files themselves (NetCDF-like rasters) and the rotation/polygon files is
//! out of scope (§1) — this module only parses the manifest's *structure* so
//! a caller can drive its own raster/rotation loader from it.

use std::path::{Path, PathBuf};

use crate::error::PaleoError;

/// One `grid <age_ma> <path>` manifest entry.
#[derive(Debug, Clone)]
pub struct ManifestGridEntry {
    pub age_ma: f64,
    pub grid_path: PathBuf,
}

/// The parsed structure of a dynamic-topography model descriptor (§6).
#[derive(Debug, Clone, Default)]
pub struct DynamicTopographyManifest {
    /// Sorted ascending by age, matching the §3 grid-collection invariant.
    pub grids: Vec<ManifestGridEntry>,
    pub static_polygons_path: Option<PathBuf>,
    pub rotation_paths: Vec<PathBuf>,
}

/// Parse a manifest. Recognized line forms, one directive per line:
///
/// ```text
/// grid <age_ma> <path>
/// polygons <path>
/// rotation <path>
/// ```
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_manifest(source: &str) -> Result<DynamicTopographyManifest, PaleoError> {
    let mut manifest = DynamicTopographyManifest::default();

    for (lineno, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["grid", age, path] => {
                let age_ma = age.parse::<f64>().map_err(|_| {
                    bad_format(lineno + 1, format!("could not parse '{age}' as an age"))
                })?;
                manifest.grids.push(ManifestGridEntry {
                    age_ma,
                    grid_path: PathBuf::from(path),
                });
            }
            ["polygons", path] => {
                manifest.static_polygons_path = Some(PathBuf::from(path));
            }
            ["rotation", path] => {
                manifest.rotation_paths.push(PathBuf::from(path));
            }
            _ => {
                return Err(bad_format(
                    lineno + 1,
                    format!("unrecognized manifest directive: '{line}'"),
                ));
            }
        }
    }

    manifest
        .grids
        .sort_by(|a, b| a.age_ma.partial_cmp(&b.age_ma).unwrap());
    Ok(manifest)
}

/// Parse a manifest from disk, attaching its path to parse errors.
pub fn parse_manifest_file(path: &Path) -> Result<DynamicTopographyManifest, PaleoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| PaleoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_manifest(&contents).map_err(|e| with_path(e, path))
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

fn bad_format(line: usize, message: String) -> PaleoError {
    PaleoError::BadInputFormat {
        path: Default::default(),
        line,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grids_polygons_and_rotations() {
        let text = "\
# dynamic topography manifest
grid 0 grids/dt_000.nc
grid 100 grids/dt_100.nc
polygons polygons/static.shp
rotation rotations/model_a.rot
rotation rotations/model_b.rot
";
        let manifest = parse_manifest(text).unwrap();
        assert_eq!(manifest.grids.len(), 2);
        assert_eq!(manifest.static_polygons_path, Some(PathBuf::from("polygons/static.shp")));
        assert_eq!(manifest.rotation_paths.len(), 2);
    }

    #[test]
    fn grids_are_sorted_by_age_regardless_of_file_order() {
        let text = "grid 100 a.nc\ngrid 0 b.nc\ngrid 50 c.nc\n";
        let manifest = parse_manifest(text).unwrap();
        let ages: Vec<f64> = manifest.grids.iter().map(|g| g.age_ma).collect();
        assert_eq!(ages, vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn unrecognized_directive_is_an_error() {
        assert!(parse_manifest("bogus line here").is_err());
    }
}
