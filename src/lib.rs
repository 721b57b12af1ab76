//! # Series Diagnostics
//!
//! Stationarity and serial-correlation diagnostics for univariate price
//! series: the checks to run before fitting any model that assumes a
//! stationary input.
//!
//! ## Features
//!
//! - Calendar resampling (day, week, month, quarter, year) with pluggable reducers
//! - Differencing and its inverse
//! - Trailing moving averages with an explicit "insufficient window" marker
//! - Sample ACF with Bartlett confidence bands and the Ljung-Box test
//! - Augmented Dickey-Fuller test with MacKinnon critical values and p-values
//! - Parallel batch diagnostics across many symbols
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use series_diagnostics::prelude::*;
//!
//! let bars = load_price_bars(Path::new("stock_data.csv"))?;
//! let high = PriceColumn::High.series(&bars)?;
//!
//! let adf = adf_test(&high, &AdfConfig::default())?;
//! println!("ADF statistic: {:.4}, p-value: {:.4}", adf.statistic, adf.p_value);
//!
//! let diff = difference(&high, 1)?;
//! let adf_diff = adf_test(&diff, &AdfConfig::default())?;
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

pub use error::{Error, Result};
pub use types::TimeSeries;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        acf, adf_test, cumulative_sum, difference, ljung_box, moving_average, resample, AcfResult,
        AdfConfig, AdfResult, CriticalValues, LagSelection, LjungBoxResult, Period, Reducer,
        SmoothedSeries, Trend,
    };
    pub use crate::config::DiagnosticsConfig;
    pub use crate::data::{load_price_bars, PriceBar, PriceColumn};
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{
        diagnose, diagnose_batch, diagnose_batch_with_acf, diagnose_with_acf, SeriesReport,
    };
    pub use crate::types::TimeSeries;
}
