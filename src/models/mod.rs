//! ARIMA model building blocks.
//!
//! Models are implemented as small, pure functions so that the fitting code can
//! stay focused on estimation.

pub mod arima;
pub mod diff;

pub use arima::*;
pub use diff::*;
