//! Autocorrelation analysis

use crate::analysis::statistics::mean;
use crate::error::{Error, Result};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Sample autocorrelations for lags `0..=max_lag`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcfResult {
    correlations: Vec<f64>,
    nobs: usize,
}

impl AcfResult {
    pub fn max_lag(&self) -> usize {
        self.correlations.len() - 1
    }

    /// Number of observations the estimate was computed from
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    pub fn get(&self, lag: usize) -> Option<f64> {
        self.correlations.get(lag).copied()
    }

    /// Correlations indexed by lag
    pub fn correlations(&self) -> &[f64] {
        &self.correlations
    }

    /// `(lag, correlation)` pairs in lag order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.correlations.iter().copied().enumerate()
    }

    /// Input had zero variance; every lag above 0 is NaN
    pub fn is_degenerate(&self) -> bool {
        self.correlations.iter().skip(1).any(|r| r.is_nan())
    }

    /// Bartlett half-widths of the `1 - alpha` confidence band per lag.
    ///
    /// The variance at lag k is `(1 + 2 * sum_{j<k} r_j^2) / n`. Lag 0 has zero width.
    pub fn confidence_bands(&self, alpha: f64) -> Result<Vec<f64>> {
        let z = normal_quantile(1.0 - alpha / 2.0, alpha)?;
        let n = self.nobs as f64;

        let mut bands = Vec::with_capacity(self.correlations.len());
        let mut cumulative = 0.0;
        for (lag, r) in self.iter() {
            if lag == 0 {
                bands.push(0.0);
                continue;
            }
            bands.push(z * ((1.0 + 2.0 * cumulative) / n).sqrt());
            cumulative += r * r;
        }
        Ok(bands)
    }

    /// Lags above 0 whose correlation falls outside the confidence band
    pub fn significant_lags(&self, alpha: f64) -> Result<Vec<usize>> {
        let bands = self.confidence_bands(alpha)?;
        Ok(self
            .iter()
            .skip(1)
            .filter(|&(lag, r)| r.abs() > bands[lag])
            .map(|(lag, _)| lag)
            .collect())
    }
}

fn normal_quantile(p: f64, alpha: f64) -> Result<f64> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::ConfigError(format!(
            "significance level must be in (0, 1), got {}",
            alpha
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::ConfigError(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}

/// Sample autocorrelation function (ACF).
///
/// Uses the full-sample mean and the full-sample denominator at every lag:
/// `r_k = sum_{t>=k} (x_t - m)(x_{t-k} - m) / sum_t (x_t - m)^2`.
///
/// A constant input has no defined correlation; lags above 0 are NaN in
/// that case.
pub fn acf<S: AsRef<[f64]> + ?Sized>(series: &S, max_lag: usize) -> Result<AcfResult> {
    let data = series.as_ref();
    let n = data.len();
    if max_lag >= n {
        return Err(Error::InvalidLag {
            lag: max_lag,
            len: n,
        });
    }

    let constant = data.iter().all(|&x| x == data[0]);
    let m = mean(data);
    let denom: f64 = data.iter().map(|x| (x - m).powi(2)).sum();

    let correlations = (0..=max_lag)
        .map(|lag| {
            if lag == 0 {
                return 1.0;
            }
            if constant || denom == 0.0 {
                return f64::NAN;
            }
            let sum: f64 = data[lag..]
                .iter()
                .zip(data[..n - lag].iter())
                .map(|(a, b)| (a - m) * (b - m))
                .sum();
            sum / denom
        })
        .collect();

    Ok(AcfResult {
        correlations,
        nobs: n,
    })
}

/// Ljung-Box portmanteau test result
#[derive(Debug, Clone, Serialize)]
pub struct LjungBoxResult {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

impl LjungBoxResult {
    /// Rejects "no autocorrelation up to `lags`" at `alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Ljung-Box test. H0: all autocorrelations up to `lags` are zero.
///
/// `Q = n(n+2) * sum_{k=1..lags} r_k^2 / (n-k)`, compared against chi-squared(lags).
pub fn ljung_box<S: AsRef<[f64]> + ?Sized>(series: &S, lags: usize) -> Result<LjungBoxResult> {
    let n = series.as_ref().len();
    if lags == 0 {
        return Err(Error::InvalidLag { lag: lags, len: n });
    }
    let acf_values = acf(series, lags)?;

    let q: f64 = acf_values
        .iter()
        .skip(1)
        .map(|(k, rho)| rho * rho / (n - k) as f64)
        .sum::<f64>()
        * n as f64
        * (n + 2) as f64;

    let p_value = if q.is_nan() {
        f64::NAN
    } else {
        let chi2 = ChiSquared::new(lags as f64).map_err(|e| Error::ConfigError(e.to_string()))?;
        1.0 - chi2.cdf(q)
    };

    Ok(LjungBoxResult {
        statistic: q,
        p_value,
        lags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal as NoiseDist};

    fn white_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = NoiseDist::new(0.0, 1.0).unwrap();
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    #[test]
    fn test_acf_lag_zero() {
        let result = acf(&[1.0, 3.0, 2.0, 5.0], 0).unwrap();
        assert_eq!(result.correlations(), &[1.0]);
        assert_eq!(result.max_lag(), 0);
    }

    #[test]
    fn test_acf_known_values() {
        // x = [1,2,3,4,5], mean 3, deviations [-2,-1,0,1,2], denom 10
        let result = acf(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_relative_eq!(result.get(1).unwrap(), 0.4);
        assert_relative_eq!(result.get(2).unwrap(), -0.1);
    }

    #[test]
    fn test_acf_white_noise() {
        let data = white_noise(1000, 7);
        let result = acf(&data, 10).unwrap();
        assert_relative_eq!(result.get(0).unwrap(), 1.0);

        let bands = result.confidence_bands(0.05).unwrap();
        for (lag, r) in result.iter().skip(1) {
            assert!(r.abs() < bands[lag] * 3.0);
        }
    }

    #[test]
    fn test_acf_bounded() {
        let data: Vec<f64> = (0..200)
            .map(|i| (i as f64 * 0.2).sin() + i as f64 * 0.01)
            .collect();
        let correlations = acf(&data, 40).unwrap().correlations().to_vec();
        assert!(correlations.iter().all(|r| (-1.0..=1.0).contains(r)));
    }

    #[test]
    fn test_acf_constant_series_is_nan() {
        let result = acf(&[4.2; 20], 3).unwrap();
        assert_relative_eq!(result.get(0).unwrap(), 1.0);
        assert!(result.get(1).unwrap().is_nan());
        assert!(result.is_degenerate());
    }

    #[test]
    fn test_acf_invalid_lag() {
        assert!(matches!(
            acf(&[1.0, 2.0, 3.0], 3),
            Err(Error::InvalidLag { lag: 3, len: 3 })
        ));
        assert!(acf(&[] as &[f64], 0).is_err());
    }

    #[test]
    fn test_confidence_bands() {
        let data: Vec<f64> = (0..100).map(|i| (i as f64 * 0.3).sin()).collect();
        let result = acf(&data, 5).unwrap();
        let bands = result.confidence_bands(0.05).unwrap();

        assert_eq!(bands[0], 0.0);
        assert_relative_eq!(bands[1], 1.959963984540054 / 10.0, epsilon = 1e-9);
        // Bartlett widths never shrink with lag
        assert!(bands.windows(2).skip(1).all(|w| w[1] >= w[0]));
        assert!(result.confidence_bands(1.5).is_err());
    }

    #[test]
    fn test_significant_lags_on_sine() {
        let data: Vec<f64> = (0..200).map(|i| (i as f64 * 0.3).sin()).collect();
        let lags = acf(&data, 5).unwrap().significant_lags(0.05).unwrap();
        assert!(lags.contains(&1));
    }

    #[test]
    fn test_ljung_box() {
        let noise = ljung_box(&white_noise(500, 11), 10).unwrap();
        assert!(noise.p_value >= 0.0 && noise.p_value <= 1.0);

        let trending: Vec<f64> = (0..500).map(|i| i as f64).collect();
        let trend = ljung_box(&trending, 10).unwrap();
        assert!(trend.is_significant(0.05));
        assert!(trend.statistic > noise.statistic);

        assert!(ljung_box(&trending, 0).is_err());
    }
}
