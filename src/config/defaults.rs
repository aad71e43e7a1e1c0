//! Literal default constants named throughout the specification.
//!
//! Kept as free functions (rather than plain `const`s) so `serde(default =
//! "...")` can reference them directly on each config field.

pub fn mantle_density() -> f64 {
    3330.0
}

pub fn water_density() -> f64 {
    1030.0
}

pub fn thermal_amplitude_e() -> f64 {
    3160.0
}

pub fn thermal_time_constant() -> f64 {
    62.8
}

pub fn crustal_thickness_present() -> f64 {
    30_000.0
}

pub fn lithospheric_thickness() -> f64 {
    125_000.0
}

pub fn beta_residual_tolerance() -> f64 {
    100.0
}

pub fn decompaction_tolerance_m() -> f64 {
    1.0e-3
}

pub fn bisection_relative_tolerance() -> f64 {
    1.0e-6
}

pub fn bisection_function_tolerance() -> f64 {
    1.0e-3
}

pub fn max_bisection_iterations() -> usize {
    200
}

/// Zero-age ridge depth for oceanic crust [m], used by GDH1/RHCW18 and as
/// the monotonicity test point in the specification's testable properties.
pub fn zero_age_ridge_depth() -> f64 {
    2500.0
}
