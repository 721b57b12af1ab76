//! Ordinary least squares

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// Fitted OLS model `y = X * beta + e`
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: DVector<f64>,
    pub std_errors: DVector<f64>,
    pub residuals: DVector<f64>,
    /// Residual sum of squares
    pub rss: f64,
    /// Residual variance `rss / (nobs - k)`
    pub sigma2: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// Number of estimated coefficients
    pub fn k(&self) -> usize {
        self.params.len()
    }

    pub fn df_resid(&self) -> usize {
        self.nobs - self.k()
    }

    /// t-statistic of coefficient `i`
    pub fn t_value(&self, i: usize) -> f64 {
        self.params[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood at the ML variance estimate `rss / nobs`
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.rss / n).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.k() as f64
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + (self.nobs as f64).ln() * self.k() as f64
    }
}

/// Fit OLS through an SVD of the design matrix.
///
/// Fails with `SingularDesign` when the numerical rank of `x` is below its
/// column count (tolerance `s_max * max(n, k) * eps`), or when the fit is
/// exact to machine precision.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<OlsFit> {
    let (n, k) = x.shape();
    if y.len() != n {
        return Err(Error::SingularDesign(format!("{} responses for {} design rows", y.len(), n)));
    }
    if k == 0 || n <= k {
        return Err(Error::InsufficientData {
            required: k + 1,
            actual: n,
        });
    }

    let svd = x.clone().svd(true, true);
    let s_max = svd.singular_values.max();
    let tol = s_max * n.max(k) as f64 * f64::EPSILON;
    let rank = svd.rank(tol);
    if s_max <= 0.0 || rank < k {
        return Err(Error::SingularDesign(format!(
            "design matrix has rank {} with {} columns",
            rank, k
        )));
    }

    let params = svd
        .solve(y, tol)
        .map_err(|e| Error::SingularDesign(e.to_string()))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| Error::SingularDesign("SVD did not produce V^T".to_string()))?;

    // (X'X)^-1 = V S^-2 V'
    let inv_sq = svd.singular_values.map(|s| 1.0 / (s * s));
    let xtx_inv = v_t.transpose() * DMatrix::from_diagonal(&inv_sq) * v_t;

    let residuals = y - x * &params;
    let rss = residuals.dot(&residuals);
    let sigma2 = rss / (n - k) as f64;
    if rss <= f64::EPSILON * y.norm_squared() {
        return Err(Error::SingularDesign("perfect fit leaves zero residual variance".to_string()));
    }

    let std_errors = DVector::from_fn(k, |i, _| (sigma2 * xtx_inv[(i, i)]).sqrt());

    Ok(OlsFit {
        params,
        std_errors,
        residuals,
        rss,
        sigma2,
        nobs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simple_regression() {
        // y = 1 + 2x with alternating noise
        let n = 50;
        let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let noise = |i: usize| if i % 2 == 0 { 0.1 } else { -0.1 };
        let y = DVector::from_fn(n, |i, _| 1.0 + 2.0 * i as f64 + noise(i));

        let fit = ols(&x, &y).unwrap();
        assert_relative_eq!(fit.params[0], 1.0, epsilon = 0.05);
        assert_relative_eq!(fit.params[1], 2.0, epsilon = 1e-3);
        assert_eq!(fit.df_resid(), 48);
        assert!(fit.std_errors.iter().all(|s| *s > 0.0));
        assert!(fit.t_value(1) > 100.0);
    }

    #[test]
    fn test_standard_errors_match_normal_equations() {
        let n = 30;
        let regressor = |i: usize| (i as f64 * 0.7).sin();
        let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { regressor(i) });
        let y = DVector::from_fn(n, |i, _| (i as f64 * 1.3).cos());

        let fit = ols(&x, &y).unwrap();
        let xtx_inv = (x.transpose() * &x).try_inverse().unwrap();
        for i in 0..2 {
            assert_relative_eq!(
                fit.std_errors[i],
                (fit.sigma2 * xtx_inv[(i, i)]).sqrt(),
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_collinear_design_is_singular() {
        let n = 20;
        let x = DMatrix::from_fn(n, 2, |_, j| if j == 0 { 1.0 } else { 5.0 });
        let y = DVector::from_fn(n, |i, _| i as f64);
        assert!(matches!(ols(&x, &y), Err(Error::SingularDesign(_))));
    }

    #[test]
    fn test_exact_fit_is_singular() {
        let n = 10;
        let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let y = DVector::from_fn(n, |i, _| 3.0 * i as f64);
        assert!(matches!(ols(&x, &y), Err(Error::SingularDesign(_))));
    }

    #[test]
    fn test_information_criteria() {
        let n = 40;
        let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let y = DVector::from_fn(n, |i, _| (i as f64 * 0.9).sin());
        let fit = ols(&x, &y).unwrap();
        assert!(fit.bic() > fit.aic());
    }
}
