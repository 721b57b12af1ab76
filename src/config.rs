//! Configuration management
//!
//! Every pipeline parameter lives here and is passed explicitly; nothing is
//! read from global state. Defaults reproduce the classic exploratory run:
//! monthly means, first differences, a 120-observation moving average,
//! 40 ACF lags and a constant-only ADF regression with the lag chosen by AIC.

use crate::analysis::{AdfConfig, Period, Reducer};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resampling configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResampleConfig {
    pub period: Period,
    pub reducer: Reducer,
}

/// Differencing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferenceConfig {
    pub order: usize,
}

impl Default for DifferenceConfig {
    fn default() -> Self {
        Self { order: 1 }
    }
}

/// Moving-average configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window: 120 }
    }
}

/// ACF and Ljung-Box configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocorrelationConfig {
    pub max_lag: usize,
    /// Significance level for confidence bands and Ljung-Box
    pub alpha: f64,
    /// Ljung-Box lags; defaults to `max_lag`
    pub ljung_box_lags: Option<usize>,
}

impl Default for AutocorrelationConfig {
    fn default() -> Self {
        Self {
            max_lag: 40,
            alpha: 0.05,
            ljung_box_lags: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub resample: ResampleConfig,
    pub difference: DifferenceConfig,
    pub smoothing: SmoothingConfig,
    pub autocorrelation: AutocorrelationConfig,
    pub stationarity: AdfConfig,
    pub logging: LoggingConfig,
}

impl DiagnosticsConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DiagnosticsConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file or fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Ignoring config {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject parameter combinations no series can satisfy
    pub fn validate(&self) -> Result<()> {
        if self.smoothing.window == 0 {
            return Err(Error::ConfigError("smoothing.window must be positive".to_string()));
        }
        let alpha = self.autocorrelation.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::ConfigError(format!(
                "autocorrelation.alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        if self.autocorrelation.ljung_box_lags == Some(0) {
            return Err(Error::ConfigError(
                "autocorrelation.ljung_box_lags must be positive".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(Error::ConfigError("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}
