//! Lithology and composite-lithology value types (§3).

use serde::{Deserialize, Serialize};

/// A basic lithology: grain density, surface porosity and porosity decay
/// length. Immutable once loaded from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lithology {
    /// Grain density ρs [kg/m³].
    pub grain_density_kg_m3: f64,
    /// Surface porosity φ₀ ∈ (0,1).
    pub surface_porosity: f64,
    /// Porosity decay length c [m].
    pub decay_length_m: f64,
}

impl Lithology {
    pub fn new(grain_density_kg_m3: f64, surface_porosity: f64, decay_length_m: f64) -> Self {
        Self {
            grain_density_kg_m3,
            surface_porosity,
            decay_length_m,
        }
    }
}

/// A single named component of a [`CompositeLithology`] mixture, carrying a
/// fractional weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LithologyFraction {
    pub name: String,
    pub fraction: f64,
}

/// A weighted mixture of basic lithologies, already resolved against a
/// registry. Effective parameters are the weighted averages of the
/// constituent ρs, φ₀ and c (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeLithology {
    /// The named fractions as supplied (for echoing amended drill-site
    /// output, §6), retained even though the registry lookup has already
    /// happened.
    pub components: Vec<LithologyFraction>,
    /// Weighted-average grain density ρs [kg/m³].
    pub grain_density_kg_m3: f64,
    /// Weighted-average surface porosity φ₀.
    pub surface_porosity: f64,
    /// Weighted-average decay length c [m].
    pub decay_length_m: f64,
}

impl CompositeLithology {
    /// Resolve a set of named fractions against a registry, mixture-averaging
    /// the matched lithologies' parameters. Fails with `None` if any name is
    /// unresolved (the caller converts that to `PaleoError::UnknownLithology`
    /// with the offending name).
    pub fn resolve<'a>(
        components: &[LithologyFraction],
        lookup: impl Fn(&str) -> Option<&'a Lithology>,
    ) -> Result<Self, String> {
        let mut grain_density_kg_m3 = 0.0;
        let mut surface_porosity = 0.0;
        let mut decay_length_m = 0.0;

        for c in components {
            let lith = lookup(&c.name).ok_or_else(|| c.name.clone())?;
            grain_density_kg_m3 += c.fraction * lith.grain_density_kg_m3;
            surface_porosity += c.fraction * lith.surface_porosity;
            decay_length_m += c.fraction * lith.decay_length_m;
        }

        Ok(Self {
            components: components.to_vec(),
            grain_density_kg_m3,
            surface_porosity,
            decay_length_m,
        })
    }

    /// A composite made of a single named lithology at weight 1.0, used when
    /// synthesizing the base sediment layer (§4.2).
    pub fn single(name: impl Into<String>, lith: &Lithology) -> Self {
        Self {
            components: vec![LithologyFraction {
                name: name.into(),
                fraction: 1.0,
            }],
            grain_density_kg_m3: lith.grain_density_kg_m3,
            surface_porosity: lith.surface_porosity,
            decay_length_m: lith.decay_length_m,
        }
    }
}
