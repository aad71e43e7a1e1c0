//! Lithology registry (§4.1).
//!
//! Maps lithology name to (grain density, surface porosity, decay length).
//! Represented as a plain mapping keyed on name (§9 design note): later
//! sources override earlier ones on name collision, with no inheritance.

use std::collections::HashMap;

use tracing::debug;

use crate::error::PaleoError;
use crate::types::Lithology;

/// The default `Shale` entry used to synthesize a base sediment layer
/// (§4.2) even when the caller's lithology file doesn't define one.
pub fn default_shale() -> Lithology {
    Lithology::new(2700.0, 0.63, 1960.0)
}

/// A loaded, merged lithology registry.
#[derive(Debug, Clone, Default)]
pub struct LithologyRegistry {
    entries: HashMap<String, Lithology>,
}

impl LithologyRegistry {
    /// An empty registry seeded only with the built-in `Shale` default.
    pub fn with_builtin_defaults() -> Self {
        let mut registry = Self::default();
        registry.entries.insert("Shale".to_string(), default_shale());
        registry
    }

    /// Merge another registry's entries on top of this one: entries in
    /// `other` override entries in `self` on name collision (§4.1, §9).
    pub fn merge(&mut self, other: LithologyRegistry) {
        for (name, lith) in other.entries {
            self.entries.insert(name, lith);
        }
    }

    /// Insert or override a single entry.
    pub fn insert(&mut self, name: impl Into<String>, lithology: Lithology) {
        self.entries.insert(name.into(), lithology);
    }

    pub fn lookup(&self, name: &str) -> Option<&Lithology> {
        self.entries.get(name)
    }

    /// Look up or fail with `UnknownLithology`, matching the fatal error
    /// kind named in §7 for a missing reference at resolution time.
    pub fn lookup_or_err(&self, name: &str) -> Result<&Lithology, PaleoError> {
        self.lookup(name)
            .ok_or_else(|| PaleoError::UnknownLithology(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse one record per line (`name rho_s phi_0 c`), as described in
    /// §6's lithology-file format. Blank lines and lines starting with `#`
    /// are skipped. Later lines within the same source override earlier
    /// ones on name collision, matching the cross-file merge rule.
    pub fn from_text(source: &str) -> Result<Self, PaleoError> {
        let mut registry = Self::default();
        for (lineno, raw_line) in source.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(PaleoError::BadInputFormat {
                    path: Default::default(),
                    line: lineno + 1,
                    message: format!(
                        "expected 4 whitespace-separated fields (name rho_s phi_0 c), got {}",
                        fields.len()
                    ),
                });
            }
            let name = fields[0].to_string();
            let rho_s = parse_field(fields[1], lineno + 1)?;
            let phi_0 = parse_field(fields[2], lineno + 1)?;
            let c = parse_field(fields[3], lineno + 1)?;
            debug!(name = %name, rho_s, phi_0, c, "loaded lithology entry");
            registry.insert(name, Lithology::new(rho_s, phi_0, c));
        }
        Ok(registry)
    }
}

fn parse_field(field: &str, lineno: usize) -> Result<f64, PaleoError> {
    field.parse::<f64>().map_err(|_| PaleoError::BadInputFormat {
        path: Default::default(),
        line: lineno,
        message: format!("could not parse '{field}' as a number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_registry() {
        let text = "Shale 2700 0.63 1960\nMud 2438 0.36 2015\n";
        let registry = LithologyRegistry::from_text(text).unwrap();
        assert_eq!(registry.len(), 2);
        let shale = registry.lookup("Shale").unwrap();
        assert_eq!(shale.grain_density_kg_m3, 2700.0);
    }

    #[test]
    fn later_source_overrides_earlier_on_merge() {
        let mut base = LithologyRegistry::from_text("Shale 2700 0.63 1960\n").unwrap();
        let extended = LithologyRegistry::from_text("Shale 2650 0.60 2000\n").unwrap();
        base.merge(extended);
        let shale = base.lookup("Shale").unwrap();
        assert_eq!(shale.grain_density_kg_m3, 2650.0);
    }

    #[test]
    fn unknown_lithology_is_an_error() {
        let registry = LithologyRegistry::from_text("Shale 2700 0.63 1960\n").unwrap();
        assert!(registry.lookup_or_err("Granite").is_err());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "# comment\n\nShale 2700 0.63 1960\n";
        let registry = LithologyRegistry::from_text(text).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
