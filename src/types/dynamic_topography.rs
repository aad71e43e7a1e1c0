//! Dynamic-topography grid collection (§3).

use serde::{Deserialize, Serialize};

use crate::raster::InMemoryRaster;

/// A single mantle-frame grid at a given reconstruction age.
#[derive(Debug, Clone)]
pub struct DynamicTopographyFrame {
    pub age_ma: f64,
    pub raster: InMemoryRaster,
}

/// The full dynamic-topography model: a set of mantle-frame grids sorted by
/// age (§3 invariant), sampled after plate reconstruction (§4.5).
#[derive(Debug, Clone, Default)]
pub struct DynamicTopographyModel {
    /// Invariant: sorted ascending by `age_ma`, enforced by
    /// [`DynamicTopographyModel::new`].
    frames: Vec<DynamicTopographyFrame>,
}

impl DynamicTopographyModel {
    /// Build a model from frames, sorting by age to uphold the §3 invariant.
    pub fn new(mut frames: Vec<DynamicTopographyFrame>) -> Self {
        frames.sort_by(|a, b| a.age_ma.partial_cmp(&b.age_ma).unwrap());
        Self { frames }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[DynamicTopographyFrame] {
        &self.frames
    }

    pub fn oldest_age_ma(&self) -> Option<f64> {
        self.frames.last().map(|f| f.age_ma)
    }
}

/// A manifest entry describing where a grid file lives and at what age it
/// applies (§6's "dynamic-topography model descriptor").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicTopographyManifestEntry {
    pub age_ma: f64,
    pub grid_path: String,
}
