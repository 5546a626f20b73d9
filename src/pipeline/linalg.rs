//! Dense matrix helpers for regression and correlation
//!
//! Predictors are standardized before any cross product is formed so that
//! dollar-scale income columns and household counts share one numeric range.
//! Regressions use the sweep operator on the cross-product matrix, which
//! detects aliased (linearly dependent) predictors the same way a pivoting
//! QR would.

use faer::prelude::SolverCore;
use faer::{Mat, Side};

/// Relative pivot tolerance below which a predictor counts as aliased.
pub const ALIAS_TOLERANCE: f64 = 1e-7;

/// Column-standardized copy of a matrix.
#[derive(Debug, Clone)]
pub struct Standardized {
    /// (x - mean) / sd; constant columns are all zeros.
    pub z: Mat<f64>,
    pub means: Vec<f64>,
    /// Sample standard deviations (n - 1 denominator).
    pub sds: Vec<f64>,
}

impl Standardized {
    pub fn is_constant(&self, j: usize) -> bool {
        self.sds[j] == 0.0
    }
}

/// Center and scale every column of `x`.
pub fn standardize(x: &Mat<f64>) -> Standardized {
    let (n, p) = (x.nrows(), x.ncols());
    let mut z = Mat::<f64>::zeros(n, p);
    let mut means = Vec::with_capacity(p);
    let mut sds = Vec::with_capacity(p);

    for j in 0..p {
        let mean = (0..n).map(|i| x[(i, j)]).sum::<f64>() / n.max(1) as f64;
        let ss: f64 = (0..n).map(|i| (x[(i, j)] - mean).powi(2)).sum();
        let sd = if n > 1 { (ss / (n - 1) as f64).sqrt() } else { 0.0 };
        // Relative check so that large-valued constant columns are caught.
        let sd = if sd <= f64::EPSILON * mean.abs().max(1.0) {
            0.0
        } else {
            sd
        };

        for i in 0..n {
            z[(i, j)] = if sd > 0.0 { (x[(i, j)] - mean) / sd } else { 0.0 };
        }
        means.push(mean);
        sds.push(sd);
    }

    Standardized { z, means, sds }
}

/// Pearson correlation matrix of the columns of `x`.
///
/// Constant columns get a zero row, column and diagonal so that callers can
/// treat them as aliased.
pub fn correlation_matrix(x: &Mat<f64>) -> Mat<f64> {
    let n = x.nrows();
    let std = standardize(x);
    let scale = if n > 1 { (n - 1) as f64 } else { 1.0 };

    // R = Z^T * Z / (n - 1)
    let mut r = std.z.transpose() * &std.z;
    for i in 0..r.nrows() {
        for j in 0..r.ncols() {
            r[(i, j)] /= scale;
        }
    }
    r
}

/// Apply the sweep operator to pivot `k` of a symmetric matrix in place.
///
/// After sweeping every predictor pivot of `[X'X X'y; y'X y'y]` the
/// predictor block holds `-(X'X)^-1`, the last column holds the regression
/// coefficients and the corner holds the residual sum of squares.
pub fn sweep(a: &mut Mat<f64>, k: usize) {
    let n = a.nrows();
    let d = a[(k, k)];

    for i in 0..n {
        if i == k {
            continue;
        }
        for j in 0..n {
            if j == k {
                continue;
            }
            a[(i, j)] -= a[(i, k)] * a[(k, j)] / d;
        }
    }
    for i in 0..n {
        if i != k {
            a[(i, k)] /= d;
            a[(k, i)] /= d;
        }
    }
    a[(k, k)] = -1.0 / d;
}

/// Sweep `pivots` in order, skipping those whose remaining diagonal has
/// collapsed relative to its original value. Returns the aliased pivots.
pub fn sweep_all(a: &mut Mat<f64>, pivots: &[usize]) -> Vec<usize> {
    let original: Vec<f64> = (0..a.nrows()).map(|i| a[(i, i)]).collect();
    let mut aliased = Vec::new();

    for &k in pivots {
        if original[k] <= 0.0 || a[(k, k)] <= ALIAS_TOLERANCE * original[k] {
            aliased.push(k);
            continue;
        }
        sweep(a, k);
    }
    aliased
}

/// Variance inflation factor of every column of a correlation matrix.
///
/// VIF_j = 1 / (1 - R²_j) where R²_j comes from regressing column j on all
/// other columns. Aliased and constant columns are infinite. A single
/// column has VIF 1.
pub fn vif_from_correlation(r: &Mat<f64>, j: usize) -> f64 {
    let p = r.nrows();
    if r[(j, j)] <= 0.0 {
        return f64::INFINITY;
    }
    if p == 1 {
        return 1.0;
    }

    let mut a = r.clone();
    let others: Vec<usize> = (0..p).filter(|&k| k != j).collect();
    sweep_all(&mut a, &others);

    let residual = a[(j, j)];
    if residual <= ALIAS_TOLERANCE * r[(j, j)] {
        f64::INFINITY
    } else {
        r[(j, j)] / residual
    }
}

/// Every VIF at once as `R_jj * (R⁻¹)_jj`, inverting the correlation matrix
/// through one Cholesky factorization.
///
/// Returns `None` when `R` is not positive definite or some column is
/// aliased within `ALIAS_TOLERANCE`; `vif_from_correlation` then decides
/// column by column.
pub fn vif_by_cholesky(r: &Mat<f64>) -> Option<Vec<f64>> {
    let p = r.nrows();
    if (0..p).any(|j| r[(j, j)] <= 0.0) {
        return None;
    }

    let inverse = r.cholesky(Side::Lower).ok()?.inverse();
    let vif: Vec<f64> = (0..p).map(|j| r[(j, j)] * inverse[(j, j)]).collect();

    vif.iter()
        .all(|v| v.is_finite() && *v < 1.0 / ALIAS_TOLERANCE)
        .then_some(vif)
}

/// Column vector from a slice.
pub fn column_vector(values: &[f64]) -> Mat<f64> {
    let mut v = Mat::<f64>::zeros(values.len(), 1);
    for (i, value) in values.iter().enumerate() {
        v[(i, 0)] = *value;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> Mat<f64> {
        let mut m = Mat::<f64>::zeros(rows.len(), rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                m[(i, j)] = *v;
            }
        }
        m
    }

    #[test]
    fn test_standardize_moments() {
        let x = matrix(&[&[1.0, 5.0], &[2.0, 5.0], &[3.0, 5.0]]);
        let std = standardize(&x);
        assert!((std.means[0] - 2.0).abs() < 1e-12);
        assert!((std.sds[0] - 1.0).abs() < 1e-12);
        assert!(std.is_constant(1));
        assert_eq!(std.z[(0, 1)], 0.0);
    }

    #[test]
    fn test_correlation_of_linear_columns() {
        let x = matrix(&[&[1.0, 2.0, 3.0], &[2.0, 4.0, 1.0], &[3.0, 6.0, 2.0], &[4.0, 8.0, 0.0]]);
        let r = correlation_matrix(&x);
        assert!((r[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((r[(0, 1)] - 1.0).abs() < 1e-12);
        assert!(r[(0, 2)] < 0.0);
    }

    #[test]
    fn test_sweep_simple_regression() {
        // x'x = 4, x'y = 8, y'y = 20 → beta = 2, rss = 4
        let mut a = matrix(&[&[4.0, 8.0], &[8.0, 20.0]]);
        let aliased = sweep_all(&mut a, &[0]);
        assert!(aliased.is_empty());
        assert!((a[(0, 1)] - 2.0).abs() < 1e-12);
        assert!((a[(1, 1)] - 4.0).abs() < 1e-12);
        assert!((a[(0, 0)] + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_vif_independent_columns_is_one() {
        let x = matrix(&[&[1.0, 1.0], &[-1.0, 1.0], &[1.0, -1.0], &[-1.0, -1.0]]);
        let r = correlation_matrix(&x);
        assert!((vif_from_correlation(&r, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cholesky_vif_matches_sweep() {
        let x = matrix(&[
            &[1.0, 0.5, 3.0],
            &[2.0, 0.1, 1.0],
            &[3.0, 0.9, 2.5],
            &[4.0, 0.2, 0.5],
            &[5.0, 0.8, 4.0],
            &[6.0, 0.4, 1.5],
        ]);
        let r = correlation_matrix(&x);
        let fast = vif_by_cholesky(&r).unwrap();
        for (j, v) in fast.iter().enumerate() {
            assert!(*v >= 1.0);
            assert!((v - vif_from_correlation(&r, j)).abs() < 1e-9 * v);
        }
    }

    #[test]
    fn test_cholesky_vif_declines_aliased_columns() {
        let x = matrix(&[&[1.0, 2.0, 0.3], &[2.0, 4.0, 0.1], &[3.0, 6.0, 0.7], &[4.0, 8.0, 0.2]]);
        assert!(vif_by_cholesky(&correlation_matrix(&x)).is_none());
    }

    #[test]
    fn test_vif_perfect_collinearity_is_infinite() {
        let x = matrix(&[&[1.0, 2.0, 0.3], &[2.0, 4.0, 0.1], &[3.0, 6.0, 0.7], &[4.0, 8.0, 0.2]]);
        let r = correlation_matrix(&x);
        assert!(vif_from_correlation(&r, 0).is_infinite());
        assert!(vif_from_correlation(&r, 1).is_infinite());
        assert!(vif_from_correlation(&r, 2).is_finite());
    }
}
