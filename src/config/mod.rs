//! Engine-wide configuration.
//!
//! Provides the physical constants and numerical tolerances used throughout
//! the core, replacing hardcoded literals with operator-tunable TOML values.
//! Every constant here has a `Default` matching the literal values named in
//! the specification, so omitting a config file reproduces the documented
//! behavior exactly.
//!
//! ## Loading order
//!
//! 1. `PALEOBACKTRACK_CONFIG` environment variable (path to a TOML file)
//! 2. `./paleo_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! config::init(EngineConfig::load());
//! let rho_m = config::get().densities.mantle_kg_m3;
//! ```

mod defaults;

pub use defaults::*;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration. Must be called exactly once
/// before any call to [`get`]; a second call is ignored with a warning.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        warn!("config::init() called more than once — ignoring");
    }
}

/// Fetch the global engine configuration.
///
/// Panics if [`init`] has not been called — a missing config is a startup
/// bug, not a recoverable condition.
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG
        .get()
        .expect("config::get() called before config::init()")
}

/// Whether the global configuration has already been initialized.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

/// Root configuration for a reconstruction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub densities: DensityConfig,
    #[serde(default)]
    pub rift: RiftConfig,
    #[serde(default)]
    pub numerics: NumericsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            densities: DensityConfig::default(),
            rift: RiftConfig::default(),
            numerics: NumericsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load using the standard search order, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("PALEOBACKTRACK_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "loaded engine config from PALEOBACKTRACK_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "failed to load config from PALEOBACKTRACK_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PALEOBACKTRACK_CONFIG points to a non-existent file, falling back");
            }
        }

        let local = PathBuf::from("paleo_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("loaded engine config from ./paleo_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "failed to load ./paleo_config.toml, using defaults");
                }
            }
        }

        info!("no paleo_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Mantle density ρ_m [kg/m³].
    #[serde(default = "defaults::mantle_density")]
    pub mantle_kg_m3: f64,
    /// Water density ρ_w [kg/m³].
    #[serde(default = "defaults::water_density")]
    pub water_kg_m3: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            mantle_kg_m3: defaults::mantle_density(),
            water_kg_m3: defaults::water_density(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiftConfig {
    /// Thermal subsidence amplitude E [m].
    #[serde(default = "defaults::thermal_amplitude_e")]
    pub thermal_amplitude_m: f64,
    /// Thermal diffusion time constant τ_thermal [Myr].
    #[serde(default = "defaults::thermal_time_constant")]
    pub thermal_time_constant_myr: f64,
    /// Present-day pre-rift crustal thickness y_c [m], default value used
    /// when a well does not supply its own.
    #[serde(default = "defaults::crustal_thickness_present")]
    pub crustal_thickness_present_m: f64,
    /// Lithospheric thickness y_L [m].
    #[serde(default = "defaults::lithospheric_thickness")]
    pub lithospheric_thickness_m: f64,
    /// Residual tolerated between modeled and observed present-day
    /// subsidence during β estimation before `InfeasibleStretching` fires.
    #[serde(default = "defaults::beta_residual_tolerance")]
    pub beta_residual_tolerance_m: f64,
}

impl Default for RiftConfig {
    fn default() -> Self {
        Self {
            thermal_amplitude_m: defaults::thermal_amplitude_e(),
            thermal_time_constant_myr: defaults::thermal_time_constant(),
            crustal_thickness_present_m: defaults::crustal_thickness_present(),
            lithospheric_thickness_m: defaults::lithospheric_thickness(),
            beta_residual_tolerance_m: defaults::beta_residual_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NumericsConfig {
    /// Absolute tolerance [m] for the decompaction bisection (§4.2).
    #[serde(default = "defaults::decompaction_tolerance_m")]
    pub decompaction_tolerance_m: f64,
    /// Relative tolerance for generic bisection root-finding (§4.9).
    #[serde(default = "defaults::bisection_relative_tolerance")]
    pub bisection_relative_tolerance: f64,
    /// Absolute function-value tolerance for generic bisection (§4.9).
    #[serde(default = "defaults::bisection_function_tolerance")]
    pub bisection_function_tolerance: f64,
    /// Maximum bisection iterations before declaring non-convergence.
    #[serde(default = "defaults::max_bisection_iterations")]
    pub max_bisection_iterations: usize,
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            decompaction_tolerance_m: defaults::decompaction_tolerance_m(),
            bisection_relative_tolerance: defaults::bisection_relative_tolerance(),
            bisection_function_tolerance: defaults::bisection_function_tolerance(),
            max_bisection_iterations: defaults::max_bisection_iterations(),
        }
    }
}
