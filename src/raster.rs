//! Raster sampling (§4.9, §6, §9).
//!
//! Readers for bathymetry, total-sediment-thickness, crustal-thickness,
//! oceanic-age and dynamic-topography grids are abstracted behind a
//! `sample(lon, lat) -> value or nodata` capability (§9 design note), so a
//! caller can plug in a native NetCDF reader or shell out to an external
//! tool without the core depending on either. [`InMemoryRaster`] is the
//! built-in implementation: a regular lat-lon grid held in memory, enough to
//! drive and test the core end-to-end.

use crate::error::PaleoError;

/// A raster sampling capability: regular lat-lon grids with nodata
/// propagation (§4.9).
pub trait RasterSource: Send + Sync {
    /// Bilinearly sample the raster at `(lon, lat)`. Returns `None` for a
    /// nodata region (propagated per §4.5/§7 rather than panicking).
    fn sample(&self, lon: f64, lat: f64) -> Option<f64>;

    /// A short name used in `LocationOutOfGrid` diagnostics.
    fn name(&self) -> &str;

    /// Sample or fail with `LocationOutOfGrid` if the location is nodata.
    fn sample_or_err(&self, lon: f64, lat: f64) -> Result<f64, PaleoError> {
        self.sample(lon, lat).ok_or(PaleoError::LocationOutOfGrid {
            lon,
            lat,
            raster: self.name().to_string(),
        })
    }
}

/// A regular lat-lon grid stored row-major from the south-west corner,
/// with a sentinel nodata value.
#[derive(Debug, Clone)]
pub struct InMemoryRaster {
    name: String,
    lon_min: f64,
    lon_step: f64,
    n_lon: usize,
    lat_min: f64,
    lat_step: f64,
    n_lat: usize,
    values: Vec<f64>,
    nodata: f64,
}

impl InMemoryRaster {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        lon_min: f64,
        lon_step: f64,
        n_lon: usize,
        lat_min: f64,
        lat_step: f64,
        n_lat: usize,
        values: Vec<f64>,
        nodata: f64,
    ) -> Self {
        assert_eq!(
            values.len(),
            n_lon * n_lat,
            "raster value buffer does not match n_lon * n_lat"
        );
        Self {
            name: name.into(),
            lon_min,
            lon_step,
            n_lon,
            lat_min,
            lat_step,
            n_lat,
            values,
            nodata,
        }
    }

    /// A raster covering a single constant value over the whole globe —
    /// useful for tests and for "no correction configured" defaults.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, -180.0, 360.0, 2, -90.0, 180.0, 2, vec![value; 4], f64::NAN)
    }

    fn is_nodata(&self, v: f64) -> bool {
        v.is_nan() || (v - self.nodata).abs() < 1e-9
    }

    fn value_at(&self, ix: usize, iy: usize) -> f64 {
        let ix = ix.min(self.n_lon - 1);
        let iy = iy.min(self.n_lat - 1);
        self.values[iy * self.n_lon + ix]
    }

    /// Nearest valid node lookup, used as the §4.5 fallback when a
    /// reconstructed location lies in a nodata cell and the caller has
    /// chosen "nearest valid node" over propagating `NaN`.
    pub fn nearest_valid(&self, lon: f64, lat: f64) -> Option<f64> {
        let (fx, fy) = self.grid_coords(lon, lat);
        let ix0 = fx.floor() as isize;
        let iy0 = fy.floor() as isize;

        let mut best: Option<(f64, f64)> = None;
        for radius in 0..self.n_lon.max(self.n_lat) {
            for dy in -(radius as isize)..=(radius as isize) {
                for dx in -(radius as isize)..=(radius as isize) {
                    if dx.abs().max(dy.abs()) != radius as isize {
                        continue;
                    }
                    let ix = ix0 + dx;
                    let iy = iy0 + dy;
                    if ix < 0 || iy < 0 || ix as usize >= self.n_lon || iy as usize >= self.n_lat {
                        continue;
                    }
                    let v = self.value_at(ix as usize, iy as usize);
                    if !self.is_nodata(v) {
                        let dist = ((dx * dx + dy * dy) as f64).sqrt();
                        if best.map(|(_, d)| dist < d).unwrap_or(true) {
                            best = Some((v, dist));
                        }
                    }
                }
            }
            if best.is_some() {
                return best.map(|(v, _)| v);
            }
        }
        None
    }

    fn grid_coords(&self, lon: f64, lat: f64) -> (f64, f64) {
        let fx = (lon - self.lon_min) / self.lon_step;
        let fy = (lat - self.lat_min) / self.lat_step;
        (fx, fy)
    }
}

impl RasterSource for InMemoryRaster {
    fn sample(&self, lon: f64, lat: f64) -> Option<f64> {
        let (fx, fy) = self.grid_coords(lon, lat);
        if fx < 0.0 || fy < 0.0 || fx > (self.n_lon - 1) as f64 || fy > (self.n_lat - 1) as f64 {
            return None;
        }

        let ix0 = fx.floor() as usize;
        let iy0 = fy.floor() as usize;
        let ix1 = (ix0 + 1).min(self.n_lon - 1);
        let iy1 = (iy0 + 1).min(self.n_lat - 1);
        let tx = fx - ix0 as f64;
        let ty = fy - iy0 as f64;

        let v00 = self.value_at(ix0, iy0);
        let v10 = self.value_at(ix1, iy0);
        let v01 = self.value_at(ix0, iy1);
        let v11 = self.value_at(ix1, iy1);

        if [v00, v10, v01, v11].iter().any(|v| self.is_nodata(*v)) {
            return None;
        }

        let top = v00 + tx * (v10 - v00);
        let bottom = v01 + tx * (v11 - v01);
        Some(top + ty * (bottom - top))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_interpolates_between_nodes() {
        // 2x2 grid: (0,0)=0, (1,0)=10, (0,1)=20, (1,1)=30
        let raster = InMemoryRaster::new(
            "test",
            0.0,
            1.0,
            2,
            0.0,
            1.0,
            2,
            vec![0.0, 10.0, 20.0, 30.0],
            f64::NAN,
        );
        let v = raster.sample(0.5, 0.5).unwrap();
        assert!((v - 15.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_is_none() {
        let raster = InMemoryRaster::constant("test", 5.0);
        assert!(raster.sample(1000.0, 1000.0).is_none());
    }

    #[test]
    fn nodata_propagates() {
        let raster = InMemoryRaster::new(
            "test",
            0.0,
            1.0,
            2,
            0.0,
            1.0,
            2,
            vec![0.0, f64::NAN, 20.0, 30.0],
            f64::NAN,
        );
        assert!(raster.sample(0.5, 0.5).is_none());
    }
}
