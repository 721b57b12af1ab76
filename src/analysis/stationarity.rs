//! Augmented Dickey-Fuller unit-root test

use crate::analysis::differencing::difference_values;
use crate::analysis::mackinnon::{self, CriticalValues};
use crate::analysis::regression::{ols, OlsFit};
use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One-sided 5% normal quantile used by the t-stat lag rule
const TSTAT_STOP: f64 = 1.6448536269514722;

/// Deterministic terms in the test regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// No deterministic terms
    None,
    /// Intercept only
    #[default]
    Constant,
    /// Intercept and linear time trend
    ConstantTrend,
}

impl Trend {
    /// Number of deterministic regressors
    pub fn terms(&self) -> usize {
        match self {
            Trend::None => 0,
            Trend::Constant => 1,
            Trend::ConstantTrend => 2,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::None => "none",
            Trend::Constant => "constant",
            Trend::ConstantTrend => "constant+trend",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Trend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "none" | "nc" => Ok(Trend::None),
            "c" | "constant" => Ok(Trend::Constant),
            "ct" | "constant+trend" | "constant_trend" | "trend" => Ok(Trend::ConstantTrend),
            other => Err(Error::ConfigError(format!("unknown trend '{}'", other))),
        }
    }
}

/// How the number of lagged differences is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum LagSelection {
    /// Exactly `lags` lagged differences
    Fixed { lags: usize },
    /// `floor(12 * (n/100)^(1/4))`
    Schwert,
    /// Minimum Akaike criterion over `0..=max_lag`
    #[default]
    Aic,
    /// Minimum Bayesian criterion over `0..=max_lag`
    Bic,
    /// Largest lag whose last coefficient has |t| >= 1.645
    TStat,
}

impl fmt::Display for LagSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LagSelection::Fixed { lags } => write!(f, "fixed({})", lags),
            LagSelection::Schwert => write!(f, "schwert"),
            LagSelection::Aic => write!(f, "aic"),
            LagSelection::Bic => write!(f, "bic"),
            LagSelection::TStat => write!(f, "t-stat"),
        }
    }
}

impl FromStr for LagSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.to_ascii_lowercase();
        match s.as_str() {
            "schwert" => Ok(LagSelection::Schwert),
            "aic" | "auto" => Ok(LagSelection::Aic),
            "bic" => Ok(LagSelection::Bic),
            "t-stat" | "tstat" | "t_stat" => Ok(LagSelection::TStat),
            other => other
                .parse::<usize>()
                .map(|lags| LagSelection::Fixed { lags })
                .map_err(|_| Error::ConfigError(format!("unknown lag selection '{}'", other))),
        }
    }
}

/// ADF test parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdfConfig {
    pub trend: Trend,
    pub lag_selection: LagSelection,
    /// Upper bound for automatic lag rules; defaults to the Schwert lag
    pub max_lag: Option<usize>,
}

impl AdfConfig {
    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_lags(mut self, lag_selection: LagSelection) -> Self {
        self.lag_selection = lag_selection;
        self
    }

    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }
}

/// Outcome of an ADF test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfResult {
    /// t-ratio of the lagged level coefficient
    pub statistic: f64,
    /// Approximate MacKinnon p-value
    pub p_value: f64,
    /// Lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    pub trend: Trend,
    pub lag_selection: LagSelection,
    pub critical_values: CriticalValues,
    /// Best criterion value when an information-criterion rule picked the lag
    pub information_criterion: Option<f64>,
}

impl AdfResult {
    /// Whether the unit root is rejected at a level such as `"5%"`
    pub fn rejects_unit_root(&self, level: &str) -> Option<bool> {
        let cv = self.critical_values.get(level)?;
        Some(self.statistic < cv)
    }

    /// p-value below `alpha`
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Schwert rule of thumb `floor(12 * (n/100)^(1/4))`
pub fn schwert_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

/// Largest lag order the sample supports.
///
/// The lag stays within `n/2 - terms - 1` and leaves more regression rows
/// than columns: `n - 1 - lag > terms + 1 + lag`.
pub fn max_feasible_lag(n: usize, trend: Trend) -> Option<usize> {
    let half = (n / 2).checked_sub(trend.terms() + 1)?;
    let rows = n.checked_sub(trend.terms() + 3)? / 2;
    Some(half.min(rows))
}

/// Shortest series that supports `lags` lagged differences
fn required_len(lags: usize, trend: Trend) -> usize {
    (2 * (lags + trend.terms() + 1)).max(2 * lags + trend.terms() + 3)
}

/// Augmented Dickey-Fuller test.
///
/// Regresses `dy_t` on the deterministic terms, `y_{t-1}` and
/// `dy_{t-1}..dy_{t-p}`. The statistic is the t-ratio of the `y_{t-1}`
/// coefficient. H0 is a unit root; a statistic below the critical value
/// rejects it.
///
/// With the default configuration the lag is the AIC minimum over
/// `0..=schwert_lag(n)`, fitted on a common sample and then refitted.
pub fn adf_test<S: AsRef<[f64]> + ?Sized>(series: &S, config: &AdfConfig) -> Result<AdfResult> {
    let data = series.as_ref();
    let n = data.len();
    let trend = config.trend;

    let bound = max_feasible_lag(n, trend).ok_or(Error::InsufficientData {
        required: required_len(0, trend),
        actual: n,
    })?;
    let auto_max = config.max_lag.unwrap_or_else(|| schwert_lag(n)).min(bound);

    let (lag, information_criterion) = match config.lag_selection {
        LagSelection::Fixed { lags } => {
            if lags > bound {
                return Err(Error::InsufficientData {
                    required: required_len(lags, trend),
                    actual: n,
                });
            }
            (lags, None)
        }
        LagSelection::Schwert => (auto_max, None),
        method => {
            let (lag, ic) = select_lag(data, trend, auto_max, method)?;
            (lag, Some(ic))
        }
    };

    let (x, y) = build_design(data, trend, lag, lag);
    let fit = ols(&x, &y)?;
    let statistic = fit.t_value(trend.terms());

    Ok(AdfResult {
        statistic,
        p_value: mackinnon::p_value(statistic, trend),
        used_lag: lag,
        nobs: fit.nobs,
        trend,
        lag_selection: config.lag_selection,
        critical_values: mackinnon::critical_values(trend, fit.nobs),
        information_criterion,
    })
}

/// Design matrix and response for the ADF regression.
///
/// Columns are `[const?, trend?, y_{t-1}, dy_{t-1}, .., dy_{t-lags}]`. Rows
/// start at difference index `start`, so regressions with different lag
/// counts share a sample when they share `start`.
fn build_design(
    data: &[f64],
    trend: Trend,
    lags: usize,
    start: usize,
) -> (DMatrix<f64>, DVector<f64>) {
    let diff = difference_values(data);
    let nobs = diff.len().saturating_sub(start);
    let terms = trend.terms();
    let ncols = terms + 1 + lags;

    let x = DMatrix::from_fn(nobs, ncols, |row, col| {
        let j = start + row;
        match col {
            0 if terms > 0 => 1.0,
            1 if terms > 1 => (row + 1) as f64,
            c if c == terms => data[j],
            c => diff[j - (c - terms)],
        }
    });
    let y = DVector::from_fn(nobs, |row, _| diff[start + row]);

    (x, y)
}

/// Pick the lag order on a common sample starting at `max_lag`
fn select_lag(
    data: &[f64],
    trend: Trend,
    max_lag: usize,
    method: LagSelection,
) -> Result<(usize, f64)> {
    let (x, y) = build_design(data, trend, max_lag, max_lag);
    let base = trend.terms() + 1;
    let fit_with = |lags: usize| -> Result<OlsFit> {
        ols(&x.columns(0, base + lags).into_owned(), &y)
    };

    match method {
        LagSelection::TStat => {
            let mut best = (0, 0.0);
            for lags in (0..=max_lag).rev() {
                let fit = fit_with(lags)?;
                let t = fit.t_value(fit.k() - 1).abs();
                best = (lags, t);
                if t >= TSTAT_STOP {
                    break;
                }
            }
            Ok(best)
        }
        _ => {
            let mut best: Option<(usize, f64)> = None;
            for lags in 0..=max_lag {
                let fit = fit_with(lags)?;
                let ic = if method == LagSelection::Bic {
                    fit.bic()
                } else {
                    fit.aic()
                };
                if best.map_or(true, |(_, b)| ic < b) {
                    best = Some((lags, ic));
                }
            }
            best.ok_or(Error::InsufficientData {
                required: 2 * base,
                actual: data.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut y = Vec::with_capacity(n);
        let mut prev = 0.0;
        for _ in 0..n {
            prev = phi * prev + noise.sample(&mut rng);
            y.push(prev);
        }
        y
    }

    #[test]
    fn test_schwert_lag() {
        assert_eq!(schwert_lag(100), 12);
        assert_eq!(schwert_lag(1000), 21);
        assert_eq!(max_feasible_lag(20, Trend::Constant), Some(8));
        assert_eq!(max_feasible_lag(3, Trend::ConstantTrend), None);
        // n/2 - 1 = 1, but one lag would leave two rows for two columns
        assert_eq!(max_feasible_lag(4, Trend::None), Some(0));
    }

    #[test]
    fn test_design_layout() {
        let data = [1.0, 2.0, 4.0, 7.0, 11.0, 16.0];
        // diff = [1, 2, 3, 4, 5]
        let (x, y) = build_design(&data, Trend::Constant, 2, 2);
        assert_eq!(x.shape(), (3, 4));
        assert_eq!(y.as_slice(), &[3.0, 4.0, 5.0]);
        // first row: const, y_{t-1}=4, dy_{t-1}=2, dy_{t-2}=1
        let first_row: Vec<f64> = x.row(0).iter().copied().collect();
        assert_eq!(first_row, vec![1.0, 4.0, 2.0, 1.0]);

        let (x, _) = build_design(&data, Trend::ConstantTrend, 0, 0);
        let time_trend: Vec<f64> = x.column(1).iter().copied().collect();
        assert_eq!(time_trend, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_stationary_ar1_rejects_unit_root() {
        let config = AdfConfig::default();
        let rejections = (0..20)
            .filter(|&seed| {
                let result = adf_test(&ar1(0.5, 1000, seed), &config).unwrap();
                result.rejects_unit_root("5%") == Some(true)
            })
            .count();
        assert!(rejections >= 19, "only {} of 20 rejected", rejections);
    }

    #[test]
    fn test_random_walk_keeps_unit_root() {
        let config = AdfConfig::default();
        let rejections = (0..20)
            .filter(|&seed| {
                let result = adf_test(&ar1(1.0, 1000, 100 + seed), &config).unwrap();
                result.rejects_unit_root("5%") == Some(true)
            })
            .count();
        assert!(rejections < 10, "{} of 20 walks rejected", rejections);
    }

    #[test]
    fn test_result_fields() {
        let data = ar1(0.5, 500, 3);
        let result = adf_test(&data, &AdfConfig::default()).unwrap();
        assert!(result.used_lag <= schwert_lag(500));
        assert_eq!(result.nobs, 500 - 1 - result.used_lag);
        assert!(result.p_value < 0.05);
        assert!(result.is_stationary(0.05));
        assert_eq!(
            result.critical_values,
            mackinnon::critical_values(Trend::Constant, result.nobs)
        );
        assert_eq!(result.lag_selection, LagSelection::Aic);
        assert!(result.information_criterion.is_some());
    }

    #[test]
    fn test_default_is_aic_up_to_schwert_lag() {
        let data = ar1(1.0, 1000, 42);
        let default = adf_test(&data, &AdfConfig::default()).unwrap();
        let explicit = AdfConfig::default()
            .with_lags(LagSelection::Aic)
            .with_max_lag(schwert_lag(1000));
        assert_eq!(default, adf_test(&data, &explicit).unwrap());

        let schwert = AdfConfig::default().with_lags(LagSelection::Schwert);
        let fixed = adf_test(&data, &schwert).unwrap();
        assert_eq!(fixed.used_lag, schwert_lag(1000));
        assert!(fixed.information_criterion.is_none());
    }

    #[test]
    fn test_fixed_lag_matches_manual_regression() {
        let data = ar1(0.8, 200, 9);
        let config = AdfConfig::default().with_lags(LagSelection::Fixed { lags: 0 });
        let result = adf_test(&data, &config).unwrap();

        // Dickey-Fuller without augmentation: dy_t = a + b y_{t-1}
        let diff = difference_values(&data);
        let x = DMatrix::from_fn(diff.len(), 2, |i, j| if j == 0 { 1.0 } else { data[i] });
        let y = DVector::from_vec(diff);
        let fit = ols(&x, &y).unwrap();
        assert_relative_eq!(result.statistic, fit.params[1] / fit.std_errors[1], epsilon = 1e-9);
        assert_eq!(result.used_lag, 0);
    }

    #[test]
    fn test_information_criterion_selection() {
        let data = ar1(0.5, 400, 21);
        for method in [LagSelection::Aic, LagSelection::Bic, LagSelection::TStat] {
            let config = AdfConfig::default().with_lags(method).with_max_lag(8);
            let result = adf_test(&data, &config).unwrap();
            assert!(result.used_lag <= 8);
            assert!(result.information_criterion.is_some());
            assert!(result.rejects_unit_root("1%").unwrap());
        }
    }

    #[test]
    fn test_trend_specifications() {
        let trending: Vec<f64> = ar1(0.3, 300, 5)
            .iter()
            .enumerate()
            .map(|(i, e)| 0.5 * i as f64 + e)
            .collect();

        let config = AdfConfig::default().with_lags(LagSelection::Schwert);

        let ct = adf_test(&trending, &config.with_trend(Trend::ConstantTrend)).unwrap();
        assert!(ct.rejects_unit_root("5%").unwrap());
        assert!(ct.critical_values.five_percent < -3.0);

        let none = adf_test(&trending, &config.with_trend(Trend::None)).unwrap();
        assert!(!none.rejects_unit_root("5%").unwrap());
    }

    #[test]
    fn test_constant_series_is_singular() {
        let result = adf_test(&[5.0; 100], &AdfConfig::default());
        assert!(matches!(result, Err(Error::SingularDesign(_))));
    }

    #[test]
    fn test_short_series() {
        assert!(matches!(
            adf_test(&[1.0, 2.0, 3.0], &AdfConfig::default()),
            Err(Error::InsufficientData { .. })
        ));

        let data = ar1(0.5, 20, 1);
        let config = AdfConfig::default().with_lags(LagSelection::Fixed { lags: 9 });
        assert!(matches!(
            adf_test(&data, &config),
            Err(Error::InsufficientData {
                required: 22,
                actual: 20,
            })
        ));
    }

    #[test]
    fn test_short_series_errors_report_series_length() {
        let data = ar1(0.5, 8, 2);
        let trends = [Trend::None, Trend::Constant, Trend::ConstantTrend];
        let rules = [
            LagSelection::Fixed { lags: 1 },
            LagSelection::Schwert,
            LagSelection::Aic,
            LagSelection::Bic,
            LagSelection::TStat,
        ];

        for n in 0..=data.len() {
            for trend in trends {
                for rule in rules {
                    let config = AdfConfig::default().with_trend(trend).with_lags(rule);
                    if let Err(Error::InsufficientData { required, actual }) =
                        adf_test(&data[..n], &config)
                    {
                        assert_eq!(actual, n);
                        assert!(required > n);
                    }
                }
            }
        }

        let fixed = AdfConfig::default()
            .with_trend(Trend::None)
            .with_lags(LagSelection::Fixed { lags: 1 });
        assert!(matches!(
            adf_test(&data[..4], &fixed),
            Err(Error::InsufficientData {
                required: 5,
                actual: 4,
            })
        ));
        let auto = AdfConfig::default().with_trend(Trend::None);
        assert_eq!(adf_test(&data[..4], &auto).unwrap().used_lag, 0);
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("ct".parse::<Trend>().unwrap(), Trend::ConstantTrend);
        let lags = |s: &str| s.parse::<LagSelection>().unwrap();
        assert_eq!(lags("aic"), LagSelection::Aic);
        assert_eq!(lags("auto"), LagSelection::Aic);
        assert_eq!(lags("schwert"), LagSelection::Schwert);
        assert_eq!(lags("4"), LagSelection::Fixed { lags: 4 });
        assert!("sometimes".parse::<LagSelection>().is_err());
    }
}
