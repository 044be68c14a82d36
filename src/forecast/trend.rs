//! Straight-line trend fitted by ordinary least squares.

use crate::aggregate::YearlyTotal;

/// `total = intercept + slope * year`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    slope: f64,
    intercept: f64,
    n_observations: usize,
}

impl LinearTrend {
    /// Fit over `(year, total)` points.
    ///
    /// Returns `None` for fewer than two distinct years, where the line is undefined.
    pub fn fit(series: &[YearlyTotal]) -> Option<Self> {
        let n = series.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;

        let mean_x = series.iter().map(|p| p.year as f64).sum::<f64>() / nf;
        let mean_y = series.iter().map(|p| p.total_enrollees as f64).sum::<f64>() / nf;

        let mut cov = 0.0;
        let mut var = 0.0;
        for p in series {
            let dx = p.year as f64 - mean_x;
            cov += dx * (p.total_enrollees as f64 - mean_y);
            var += dx * dx;
        }

        if var <= f64::EPSILON {
            return None;
        }

        let slope = cov / var;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
            n_observations: n,
        })
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// Raw estimate at `year`.
    pub fn estimate(&self, year: i64) -> f64 {
        self.intercept + self.slope * year as f64
    }

    /// Estimate at `year`, truncated toward zero.
    pub fn predict(&self, year: i64) -> i64 {
        // absorb float noise just below a whole number
        let est = self.estimate(year);
        (est + est.signum() * 1e-9).trunc() as i64
    }

    /// Estimates for `steps` consecutive years starting at `from`.
    pub fn project(&self, from: i64, steps: usize) -> Vec<(i64, i64)> {
        (0..steps as i64)
            .map(|i| (from + i, self.predict(from + i)))
            .collect()
    }
}
