//! Paleobathymetry reconstruction core.
//!
//! Given a sediment stratigraphy recorded at a drill site (or a grid of
//! present-day submerged crust), reconstructs the history of water depth (or
//! tectonic subsidence) through geological time by combining porosity-driven
//! sediment decompaction, a tectonic-subsidence model that differs for
//! oceanic versus continental crust, and optional corrections for dynamic
//! topography and eustatic sea level.
//!
//! ## Layout
//!
//! - [`types`]: the data model (§3) — lithologies, stratigraphic units,
//!   wells, decompacted layers, output rows.
//! - [`registry`]: the lithology registry (§4.1).
//! - [`decompaction`]: the porosity-integral decompactor (§4.2).
//! - [`age_depth`]: oceanic age-to-depth models (§4.3).
//! - [`rift`]: the continental rift subsidence model and β estimation (§4.4).
//! - [`dynamic_topography`]: mantle-frame grid sampling (§4.5).
//! - [`sea_level`]: the eustatic sea-level model (§4.6).
//! - [`backtrack`]: the backtrack driver (§4.7).
//! - [`backstrip`]: the backstrip driver (§4.8).
//! - [`numeric`]: bisection and piecewise-linear interpolation (§4.9).
//! - [`raster`]: the `RasterSource` trait and an in-memory implementation.
//! - [`reconstruction`]: the `PlateReconstruction` trait and a built-in
//!   static-polygon/Euler-rotation implementation.
//! - [`grid`]: the paleobathymetry gridding driver (§5).
//! - [`io`]: textual file formats (§6).
//! - [`config`]: engine-wide tunable constants.
//! - [`error`]: the crate-wide error type (§7).

pub mod age_depth;
pub mod backstrip;
pub mod backtrack;
pub mod config;
pub mod decompaction;
pub mod dynamic_topography;
pub mod error;
pub mod grid;
pub mod io;
pub mod numeric;
pub mod raster;
pub mod reconstruction;
pub mod registry;
pub mod rift;
pub mod sea_level;
pub mod types;

pub use error::{PaleoError, Result};
