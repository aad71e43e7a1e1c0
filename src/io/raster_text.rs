//! A minimal text raster format shared by the drivers that load gridded
//! inputs (§6, §9): a header line `lon_min lon_step n_lon lat_min lat_step
//! n_lat nodata` followed by `n_lon * n_lat` whitespace-separated values in
//! row-major order from the south-west corner. A real deployment would plug
//! in a NetCDF reader against the same [`crate::raster::RasterSource`] trait
//! instead — full raster-format support is out of scope here (§1).

use std::path::Path;

use crate::error::PaleoError;
use crate::raster::InMemoryRaster;

/// Parse a raster in the text format described above, tagging the raster
/// with `path` for `LocationOutOfGrid` diagnostics.
pub fn parse_raster_text(path: &Path, text: &str) -> Result<InMemoryRaster, PaleoError> {
    let mut lines = text
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim().starts_with('#'));

    let header = lines.next().ok_or_else(|| PaleoError::BadInputFormat {
        path: path.to_path_buf(),
        line: 1,
        message: "raster file is empty".to_string(),
    })?;
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    if header_fields.len() != 7 {
        return Err(PaleoError::BadInputFormat {
            path: path.to_path_buf(),
            line: 1,
            message: format!(
                "header must have 7 fields (lon_min lon_step n_lon lat_min lat_step n_lat nodata), got {}",
                header_fields.len()
            ),
        });
    }
    let field = |i: usize, name: &str| -> Result<f64, PaleoError> {
        header_fields[i].parse::<f64>().map_err(|_| PaleoError::BadInputFormat {
            path: path.to_path_buf(),
            line: 1,
            message: format!("could not parse '{}' as {name}", header_fields[i]),
        })
    };
    let lon_min = field(0, "lon_min")?;
    let lon_step = field(1, "lon_step")?;
    let n_lon = field(2, "n_lon")? as usize;
    let lat_min = field(3, "lat_min")?;
    let lat_step = field(4, "lat_step")?;
    let n_lat = field(5, "n_lat")? as usize;
    let nodata = field(6, "nodata")?;

    let mut values = Vec::with_capacity(n_lon * n_lat);
    for (offset, line) in lines.enumerate() {
        for field in line.split_whitespace() {
            let value = field.parse::<f64>().map_err(|_| PaleoError::BadInputFormat {
                path: path.to_path_buf(),
                line: offset + 2,
                message: format!("could not parse '{field}' as a raster value"),
            })?;
            values.push(value);
        }
    }
    if values.len() != n_lon * n_lat {
        return Err(PaleoError::BadInputFormat {
            path: path.to_path_buf(),
            line: 1,
            message: format!(
                "declares {n_lon}x{n_lat} values but file contains {}",
                values.len()
            ),
        });
    }

    Ok(InMemoryRaster::new(
        path.display().to_string(),
        lon_min,
        lon_step,
        n_lon,
        lat_min,
        lat_step,
        n_lat,
        values,
        nodata,
    ))
}

/// Read and parse a raster file in the text format described above.
pub fn load_raster_text_file(path: &Path) -> Result<InMemoryRaster, PaleoError> {
    let text = std::fs::read_to_string(path).map_err(|e| PaleoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_raster_text(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_row_major_values() {
        let text = "0 1 2 0 1 2 -9999\n1 2\n3 4\n";
        let raster = load_raster_text_from_str(text);
        assert_eq!(raster.sample(0.0, 0.0), Some(1.0));
        assert_eq!(raster.sample(1.0, 1.0), Some(4.0));
    }

    #[test]
    fn rejects_value_count_mismatch() {
        let text = "0 1 2 0 1 2 -9999\n1 2 3\n";
        assert!(parse_raster_text(Path::new("test.raster"), text).is_err());
    }

    fn load_raster_text_from_str(text: &str) -> InMemoryRaster {
        parse_raster_text(Path::new("test.raster"), text).unwrap()
    }
}
