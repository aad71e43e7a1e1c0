//! Dynamic-topography sampling (§4.5).
//!
//! Samples a mantle-frame dynamic-topography model at a present-day
//! location and a past time: plate-ID assignment, rigid reconstruction to
//! that time, bracketing grid ages, bilinear raster sampling and linear
//! time interpolation, with the boundary rules for exceeding the oldest
//! grid age and for nodata cells.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::error::PaleoError;
use crate::raster::RasterSource;
use crate::reconstruction::PlateReconstruction;
use crate::types::dynamic_topography::DynamicTopographyModel;

/// One-shot warning latch for "requested age exceeds the oldest grid age"
/// (§4.5): the boundary clamp is expected behavior at the edge of a run's
/// age range, not worth a log line per sampled point.
#[derive(Debug, Default)]
pub struct OldestAgeWarningLatch {
    fired: AtomicBool,
}

impl OldestAgeWarningLatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn fire_once(&self, requested_ma: f64, oldest_ma: f64) {
        if self
            .fired
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            warn!(
                requested_ma,
                oldest_ma, "requested age exceeds dynamic-topography model range, clamping to oldest grid"
            );
        }
    }
}

/// Sample `model` at present-day `(lon, lat)` and time `age_ma` (§4.5 steps
/// 1-4).
///
/// `plates` assigns a plate ID and reconstructs the point back through
/// time. `latch` suppresses repeat warnings across many points in a
/// gridding run when `age_ma` exceeds the model's oldest frame.
pub fn sample(
    model: &DynamicTopographyModel,
    plates: &dyn PlateReconstruction,
    lon: f64,
    lat: f64,
    age_ma: f64,
    latch: &OldestAgeWarningLatch,
) -> Result<f64, PaleoError> {
    if model.is_empty() {
        return Ok(0.0);
    }

    let frames = model.frames();
    let oldest_ma = frames.last().expect("checked non-empty above").age_ma;

    let clamped_age = if age_ma > oldest_ma {
        latch.fire_once(age_ma, oldest_ma);
        oldest_ma
    } else {
        age_ma.max(0.0)
    };

    let plate_id = plates.plate_id_at(lon, lat);
    let (recon_lon, recon_lat) = plates.reconstruct(lon, lat, plate_id, clamped_age);

    if frames.len() == 1 || clamped_age <= frames[0].age_ma {
        return sample_frame_or_nearest(&frames[0].raster, recon_lon, recon_lat);
    }

    let upper_idx = frames
        .iter()
        .position(|f| f.age_ma > clamped_age)
        .unwrap_or(frames.len() - 1);
    let lower_idx = upper_idx.saturating_sub(1);

    let lower = &frames[lower_idx];
    let upper = &frames[upper_idx];

    let h_lower = sample_frame_or_nearest(&lower.raster, recon_lon, recon_lat)?;
    let h_upper = sample_frame_or_nearest(&upper.raster, recon_lon, recon_lat)?;

    if (upper.age_ma - lower.age_ma).abs() < 1e-12 {
        return Ok(h_lower);
    }

    let t = (clamped_age - lower.age_ma) / (upper.age_ma - lower.age_ma);
    Ok(h_lower + t * (h_upper - h_lower))
}

/// Sample a single frame, falling back to the nearest valid node if the
/// reconstructed location lands in a nodata cell (§4.5's nodata rule).
fn sample_frame_or_nearest(
    raster: &crate::raster::InMemoryRaster,
    lon: f64,
    lat: f64,
) -> Result<f64, PaleoError> {
    if let Some(value) = raster.sample(lon, lat) {
        return Ok(value);
    }
    raster
        .nearest_valid(lon, lat)
        .ok_or_else(|| PaleoError::LocationOutOfGrid {
            lon,
            lat,
            raster: raster.name().to_string(),
        })
}

/// The dynamic-topography *contribution* used by the backtrack driver
/// (§4.5, §4.7): `h(t) - h(reference_ma)`, where `reference_ma` is 0 for
/// the oceanic branch and the rift-start age for the continental branch.
#[allow(clippy::too_many_arguments)]
pub fn contribution(
    model: &DynamicTopographyModel,
    plates: &dyn PlateReconstruction,
    lon: f64,
    lat: f64,
    age_ma: f64,
    reference_ma: f64,
    latch: &OldestAgeWarningLatch,
) -> Result<f64, PaleoError> {
    if model.is_empty() {
        return Ok(0.0);
    }
    let h_t = sample(model, plates, lon, lat, age_ma, latch)?;
    let h_ref = sample(model, plates, lon, lat, reference_ma, latch)?;
    Ok(h_t - h_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::InMemoryRaster;
    use crate::reconstruction::StaticPlateModel;
    use crate::types::dynamic_topography::DynamicTopographyFrame;

    fn single_frame_model(age_ma: f64, value: f64) -> DynamicTopographyModel {
        DynamicTopographyModel::new(vec![DynamicTopographyFrame {
            age_ma,
            raster: InMemoryRaster::constant("dt", value),
        }])
    }

    #[test]
    fn empty_model_samples_zero() {
        let model = DynamicTopographyModel::default();
        let plates = StaticPlateModel::identity();
        let latch = OldestAgeWarningLatch::new();
        let v = sample(&model, &plates, 10.0, 20.0, 50.0, &latch).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn single_frame_model_returns_constant_regardless_of_age() {
        let model = single_frame_model(0.0, 42.0);
        let plates = StaticPlateModel::identity();
        let latch = OldestAgeWarningLatch::new();
        let v = sample(&model, &plates, 10.0, 20.0, 100.0, &latch).unwrap();
        assert!((v - 42.0).abs() < 1e-9);
    }

    #[test]
    fn interpolates_linearly_between_two_frames() {
        let model = DynamicTopographyModel::new(vec![
            DynamicTopographyFrame {
                age_ma: 0.0,
                raster: InMemoryRaster::constant("dt0", 0.0),
            },
            DynamicTopographyFrame {
                age_ma: 100.0,
                raster: InMemoryRaster::constant("dt100", 100.0),
            },
        ]);
        let plates = StaticPlateModel::identity();
        let latch = OldestAgeWarningLatch::new();
        let v = sample(&model, &plates, 10.0, 20.0, 50.0, &latch).unwrap();
        assert!((v - 50.0).abs() < 1e-6);
    }

    #[test]
    fn clamps_and_warns_once_beyond_oldest_grid() {
        let model = DynamicTopographyModel::new(vec![
            DynamicTopographyFrame {
                age_ma: 0.0,
                raster: InMemoryRaster::constant("dt0", 0.0),
            },
            DynamicTopographyFrame {
                age_ma: 100.0,
                raster: InMemoryRaster::constant("dt100", 100.0),
            },
        ]);
        let plates = StaticPlateModel::identity();
        let latch = OldestAgeWarningLatch::new();
        let v = sample(&model, &plates, 10.0, 20.0, 500.0, &latch).unwrap();
        assert!((v - 100.0).abs() < 1e-9);
        assert!(latch.fired.load(Ordering::Relaxed));
    }

    #[test]
    fn contribution_is_zero_for_empty_model() {
        let model = DynamicTopographyModel::default();
        let plates = StaticPlateModel::identity();
        let latch = OldestAgeWarningLatch::new();
        let c = contribution(&model, &plates, 0.0, 0.0, 50.0, 0.0, &latch).unwrap();
        assert_eq!(c, 0.0);
    }
}
