//! Crate-wide error type.
//!
//! Mirrors the teacher's per-module `thiserror` enums (e.g. `WitsError`,
//! `AcquisitionError`): one flat enum covering every error kind named in the
//! specification's error-handling design, with `Display` messages suitable
//! for surfacing directly to a CLI user.

use std::path::PathBuf;

use thiserror::Error;

/// Every fatal or recoverable condition the engine can hit.
///
/// Fatal kinds are returned as `Err` from driver entry points.
/// Recoverable kinds (`BasementShallowerThanDrillSite`, `InfeasibleStretching`,
/// `DynamicTopographyOutOfRange`) are not normally constructed as `Err` by the
/// drivers themselves — they are logged via `tracing::warn!` and also surface
/// as a [`Warning`](crate::types::Warning) on the driver's result so a caller
/// doesn't have to scrape log output. They remain variants here because
/// lower-level functions (e.g. a raw age-depth file parser called directly)
/// may still want to return them as genuine errors.
#[derive(Debug, Error)]
pub enum PaleoError {
    #[error("{path}:{line}: {message}")]
    BadInputFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("unknown lithology '{0}' referenced in stratigraphic column")]
    UnknownLithology(String),

    #[error("location ({lon}, {lat}) falls in a nodata region of raster '{raster}'")]
    LocationOutOfGrid {
        lon: f64,
        lat: f64,
        raster: String,
    },

    #[error(
        "drill-site recorded depth {drill_site_depth_m} m exceeds total sediment thickness {total_thickness_m} m"
    )]
    BasementShallowerThanDrillSite {
        drill_site_depth_m: f64,
        total_thickness_m: f64,
    },

    #[error("continental site requires RiftEndAge but none was supplied and no rift grid is configured")]
    RiftParametersMissing,

    #[error(
        "stretching factor estimation did not converge within beta_max={beta_max:.3} (residual {residual_m:.1} m)"
    )]
    InfeasibleStretching { beta_max: f64, residual_m: f64 },

    #[error(
        "requested time {requested_ma} Ma is outside the dynamic-topography model's grid range [0, {oldest_ma}] Ma"
    )]
    DynamicTopographyOutOfRange { requested_ma: f64, oldest_ma: f64 },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("root-finding did not converge: {0}")]
    NumericalNonConvergence(String),
}

impl PaleoError {
    /// Whether this kind is, per the specification, recoverable with a
    /// documented fallback (the driver should warn and continue rather than
    /// abort). Fatal kinds surface to the caller unconditionally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaleoError::BasementShallowerThanDrillSite { .. }
                | PaleoError::InfeasibleStretching { .. }
                | PaleoError::DynamicTopographyOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PaleoError>;
