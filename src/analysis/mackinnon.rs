//! MacKinnon reference distribution for the Dickey-Fuller statistic.
//!
//! Critical values come from the MacKinnon (2010) finite-sample response
//! surfaces for a single integrated variable:
//! `cv(T) = c0 + c1/T + c2/T^2 + c3/T^3`.
//!
//! p-values use the MacKinnon (1994) approximate asymptotic surface
//! `p = Phi(sum_i g_i * tau^i)`. The small-p polynomial is used at or below
//! `tau_star` and the large-p one above it. The result is clamped to 0 below
//! `tau_min` and to 1 above `tau_max`. Both tables are fixed for a given build.

use crate::analysis::stationarity::Trend;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Significance levels reported with every test, most stringent first
pub const SIGNIFICANCE_LEVELS: [&str; 3] = ["1%", "5%", "10%"];

// Rows are 1%, 5%, 10%.
const TAU_2010_N: [[f64; 4]; 3] = [
    [-2.56574, -2.2358, -3.627, 0.0],
    [-1.94100, -0.2686, -3.365, 31.223],
    [-1.61682, 0.2656, -2.714, 25.364],
];
const TAU_2010_C: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];
const TAU_2010_CT: [[f64; 4]; 3] = [
    [-3.95877, -9.0531, -28.428, -134.155],
    [-3.41049, -4.3904, -9.036, -45.374],
    [-3.12705, -2.5856, -3.925, -22.380],
];

/// MacKinnon (1994) surface for one regression specification
struct PValueSurface {
    tau_star: f64,
    tau_min: f64,
    tau_max: f64,
    small_p: [f64; 3],
    large_p: [f64; 4],
}

const SURFACE_N: PValueSurface = PValueSurface {
    tau_star: -1.04,
    tau_min: -19.04,
    tau_max: f64::INFINITY,
    small_p: [0.6344, 1.2378, 0.032496],
    large_p: [0.4797, 0.93557, -0.06999, 0.033066],
};
const SURFACE_C: PValueSurface = PValueSurface {
    tau_star: -1.61,
    tau_min: -18.83,
    tau_max: 2.74,
    small_p: [2.1659, 1.4412, 0.038269],
    large_p: [1.7339, 0.93202, -0.12745, -0.010368],
};
const SURFACE_CT: PValueSurface = PValueSurface {
    tau_star: -2.89,
    tau_min: -16.18,
    tau_max: 0.7,
    small_p: [3.2512, 1.6047, 0.049588],
    large_p: [2.5261, 0.61654, -0.37956, -0.060285],
};

/// Critical values at the 1%, 5% and 10% levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalValues {
    #[serde(rename = "1%")]
    pub one_percent: f64,
    #[serde(rename = "5%")]
    pub five_percent: f64,
    #[serde(rename = "10%")]
    pub ten_percent: f64,
}

impl CriticalValues {
    /// Threshold for a level label such as `"5%"`
    pub fn get(&self, level: &str) -> Option<f64> {
        match level.trim() {
            "1%" => Some(self.one_percent),
            "5%" => Some(self.five_percent),
            "10%" => Some(self.ten_percent),
            _ => None,
        }
    }

    /// `(level, threshold)` pairs, most stringent first
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        SIGNIFICANCE_LEVELS
            .into_iter()
            .zip([self.one_percent, self.five_percent, self.ten_percent])
    }
}

fn table(trend: Trend) -> &'static [[f64; 4]; 3] {
    match trend {
        Trend::None => &TAU_2010_N,
        Trend::Constant => &TAU_2010_C,
        Trend::ConstantTrend => &TAU_2010_CT,
    }
}

fn surface(trend: Trend) -> &'static PValueSurface {
    match trend {
        Trend::None => &SURFACE_N,
        Trend::Constant => &SURFACE_C,
        Trend::ConstantTrend => &SURFACE_CT,
    }
}

/// Evaluate `c[0] + c[1] x + c[2] x^2 + ...`
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Finite-sample critical values for `nobs` regression observations
pub fn critical_values(trend: Trend, nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs.max(1) as f64;
    let cv = |row: &[f64; 4]| polyval(row, inv);
    let rows = table(trend);

    CriticalValues {
        one_percent: cv(&rows[0]),
        five_percent: cv(&rows[1]),
        ten_percent: cv(&rows[2]),
    }
}

/// Approximate p-value of the ADF statistic under the unit-root null
pub fn p_value(statistic: f64, trend: Trend) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }

    let s = surface(trend);
    if statistic > s.tau_max {
        return 1.0;
    }
    if statistic < s.tau_min {
        return 0.0;
    }

    let z = if statistic <= s.tau_star {
        polyval(&s.small_p, statistic)
    } else {
        polyval(&s.large_p, statistic)
    };

    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(z),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_critical_values_ordering() {
        for trend in [Trend::None, Trend::Constant, Trend::ConstantTrend] {
            for nobs in [25, 100, 500, 10_000] {
                let cv = critical_values(trend, nobs);
                assert!(cv.one_percent < cv.five_percent);
                assert!(cv.five_percent < cv.ten_percent);
            }
        }
    }

    #[test]
    fn test_asymptotic_critical_values() {
        let cv = critical_values(Trend::Constant, 1_000_000);
        assert_relative_eq!(cv.one_percent, -3.43, epsilon = 0.01);
        assert_relative_eq!(cv.five_percent, -2.86, epsilon = 0.01);
        assert_relative_eq!(cv.ten_percent, -2.57, epsilon = 0.01);
        assert_eq!(cv.get("5%"), Some(cv.five_percent));
        assert_eq!(cv.get("2.5%"), None);
    }

    #[test]
    fn test_finite_sample_critical_value() {
        // -2.86154 - 2.8903/100 - 4.234/100^2 - 40.040/100^3 = -2.89090644
        let cv = critical_values(Trend::Constant, 100);
        assert_relative_eq!(cv.five_percent, -2.89090644, epsilon = 1e-8);
    }

    #[test]
    fn test_p_value_near_critical_values() {
        // The 5% asymptotic critical value should map to roughly p = 0.05
        assert_relative_eq!(p_value(-2.86, Trend::Constant), 0.05, epsilon = 0.005);
        assert_relative_eq!(p_value(-3.43, Trend::Constant), 0.01, epsilon = 0.003);
        assert_relative_eq!(p_value(-3.41, Trend::ConstantTrend), 0.05, epsilon = 0.005);
    }

    #[test]
    fn test_p_value_bounds_and_monotonicity() {
        for trend in [Trend::None, Trend::Constant, Trend::ConstantTrend] {
            let mut prev = 0.0;
            for i in 0..200 {
                let stat = -25.0 + i as f64 * 0.15;
                let p = p_value(stat, trend);
                assert!((0.0..=1.0).contains(&p));
                assert!(p + 1e-3 >= prev, "p fell at {} ({:?})", stat, trend);
                prev = p;
            }
        }
        assert_eq!(p_value(-30.0, Trend::Constant), 0.0);
        assert_eq!(p_value(5.0, Trend::Constant), 1.0);
        assert!(p_value(f64::NAN, Trend::Constant).is_nan());
    }
}
