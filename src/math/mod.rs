//! Numerical utilities: least squares, simplex minimisation and the
//! stationarity transform used by the ARIMA fitter.

pub mod ols;
pub mod optimize;
pub mod transform;

pub use ols::*;
pub use optimize::*;
pub use transform::*;
