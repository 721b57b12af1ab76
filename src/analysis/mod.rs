//! # Time series analysis
//!
//! Resampling, detrending, serial-correlation and unit-root diagnostics.
//! Every routine is a pure function of its input.

pub mod autocorrelation;
pub mod differencing;
pub mod mackinnon;
pub mod regression;
pub mod resample;
pub mod smoothing;
pub mod stationarity;
pub mod statistics;

pub use autocorrelation::{acf, ljung_box, AcfResult, LjungBoxResult};
pub use differencing::{cumulative_sum, difference, difference_values};
pub use mackinnon::CriticalValues;
pub use resample::{resample, Period, Reducer};
pub use smoothing::{moving_average, SmoothedSeries};
pub use stationarity::{adf_test, AdfConfig, AdfResult, LagSelection, Trend};
pub use statistics::DescriptiveStats;
