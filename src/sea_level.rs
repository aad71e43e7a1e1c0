//! Sea-level model (§4.6).
//!
//! A piecewise-linear age/level table with an instantaneous query and a
//! time-averaged query over an age interval. No model configured is
//! equivalent to a constant zero level, so callers never need to special-
//! case its absence.

use crate::numeric::PiecewiseLinearTable;

#[derive(Debug, Clone, Default)]
pub struct SeaLevelModel {
    table: PiecewiseLinearTable,
}

impl SeaLevelModel {
    pub fn from_points(points: Vec<(f64, f64)>) -> Self {
        Self {
            table: PiecewiseLinearTable::new(points),
        }
    }

    /// No sea-level correction: every query returns 0 (§4.6).
    pub fn none() -> Self {
        Self {
            table: PiecewiseLinearTable::new(Vec::new()),
        }
    }

    /// Instantaneous sea level at age `t_ma`.
    pub fn level_at(&self, t_ma: f64) -> f64 {
        self.table.eval(t_ma)
    }

    /// Time-averaged sea level over `[top_age_ma, bottom_age_ma]`, used as
    /// the mean sea-level anomaly term Δsl(t_k) in the backtrack isostatic
    /// equation (§4.7).
    pub fn mean_over(&self, top_age_ma: f64, bottom_age_ma: f64) -> f64 {
        self.table.mean_over(top_age_ma, bottom_age_ma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_model_is_zero_everywhere() {
        let model = SeaLevelModel::none();
        assert_eq!(model.level_at(50.0), 0.0);
        assert_eq!(model.mean_over(0.0, 100.0), 0.0);
    }

    #[test]
    fn instantaneous_query_interpolates() {
        let model = SeaLevelModel::from_points(vec![(0.0, 0.0), (100.0, 50.0)]);
        assert!((model.level_at(50.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn interval_mean_matches_trapezoid_rule() {
        let model = SeaLevelModel::from_points(vec![(0.0, 0.0), (100.0, 100.0)]);
        assert!((model.mean_over(0.0, 100.0) - 50.0).abs() < 1e-6);
    }
}
