//! Shared numeric utilities (§4.9): bisection root-finding and
//! piecewise-linear interpolation. Pure functions over plain slices, in the
//! same free-function style as the teacher's `physics_engine` calculations.

use crate::error::PaleoError;

/// Bisection root-finder for a monotone function on `[lo, hi]` with
/// `f(lo)` and `f(hi)` of opposite sign.
///
/// Converges when either the bracket's relative width drops below
/// `rel_tol` or `|f(mid)|` drops below `fn_tol`, matching the dual
/// tolerance rule in §4.9. Returns `NumericalNonConvergence` if
/// `max_iter` is exhausted first, or if the initial bracket does not
/// straddle a root.
pub fn bisect<F>(
    mut f: F,
    mut lo: f64,
    mut hi: f64,
    rel_tol: f64,
    fn_tol: f64,
    max_iter: usize,
) -> Result<f64, PaleoError>
where
    F: FnMut(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(PaleoError::NumericalNonConvergence(format!(
            "bisection bracket [{lo}, {hi}] does not straddle a root (f(lo)={f_lo}, f(hi)={f_hi})"
        )));
    }

    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);

        let rel_width = (hi - lo).abs() / mid.abs().max(1.0);
        if f_mid.abs() <= fn_tol || rel_width <= rel_tol {
            return Ok(mid);
        }

        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Err(PaleoError::NumericalNonConvergence(format!(
        "bisection did not converge within {max_iter} iterations on [{lo}, {hi}]"
    )))
}

/// A generic piecewise-linear table, sorted ascending by `x`. Queries
/// outside the table's range clamp to the nearest endpoint (§4.9), except
/// where a caller needs the special dynamic-topography out-of-range rule
/// (§4.5), which is handled separately in `dynamic_topography.rs`.
#[derive(Debug, Clone)]
pub struct PiecewiseLinearTable {
    points: Vec<(f64, f64)>,
}

impl PiecewiseLinearTable {
    /// Build from (x, y) pairs, sorting by x. Panics-free: an empty table
    /// always evaluates to 0.0.
    pub fn new(mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Evaluate at `x`, clamping to the endpoints when `x` is out of range.
    pub fn eval(&self, x: f64) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        if self.points.len() == 1 {
            return self.points[0].1;
        }

        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }

        let idx = match self
            .points
            .binary_search_by(|p| p.0.partial_cmp(&x).unwrap())
        {
            Ok(i) => return self.points[i].1,
            Err(i) => i,
        };
        let (x0, y0) = self.points[idx - 1];
        let (x1, y1) = self.points[idx];
        let t = (x - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }

    /// Time-average of the table's value over `[a, b]` (`a <= b`), used by
    /// the sea-level model's interval-mean query (§4.6) via the trapezoid
    /// rule over the table's own breakpoints that fall inside `[a, b]`.
    pub fn mean_over(&self, a: f64, b: f64) -> f64 {
        if self.points.is_empty() || (b - a).abs() < 1e-12 {
            return self.eval(a);
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let mut xs: Vec<f64> = self
            .points
            .iter()
            .map(|p| p.0)
            .filter(|&x| x > lo && x < hi)
            .collect();
        xs.push(lo);
        xs.push(hi);
        xs.sort_by(|p, q| p.partial_cmp(q).unwrap());
        xs.dedup();

        let mut area = 0.0;
        for w in xs.windows(2) {
            let (x0, x1) = (w[0], w[1]);
            let (y0, y1) = (self.eval(x0), self.eval(x1));
            area += 0.5 * (y0 + y1) * (x1 - x0);
        }
        area / (hi - lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bisect_finds_sqrt_two() {
        let root = bisect(|x| x * x - 2.0, 0.0, 2.0, 1e-9, 1e-9, 200).unwrap();
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn bisect_rejects_non_straddling_bracket() {
        let result = bisect(|x| x * x + 1.0, 0.0, 2.0, 1e-6, 1e-3, 100);
        assert!(result.is_err());
    }

    #[test]
    fn piecewise_linear_clamps_out_of_range() {
        let table = PiecewiseLinearTable::new(vec![(0.0, 10.0), (10.0, 20.0), (20.0, 0.0)]);
        assert_eq!(table.eval(-5.0), 10.0);
        assert_eq!(table.eval(25.0), 0.0);
        assert_eq!(table.eval(5.0), 15.0);
    }

    #[test]
    fn piecewise_linear_mean_over_matches_trapezoid() {
        let table = PiecewiseLinearTable::new(vec![(0.0, 0.0), (10.0, 10.0)]);
        // linear ramp: mean over [0,10] is 5.0
        assert!((table.mean_over(0.0, 10.0) - 5.0).abs() < 1e-9);
    }
}
