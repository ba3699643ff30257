//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and reshaped table records (`RawTable`, `LongRecord`)
//! - yearly series and the train/test split (`YearlySeries`, `SplitConfig`, `Split`)
//! - model order and fit outputs (`ModelOrder`, `ArimaFit`, `ForecastResult`, `ErrorReport`)

pub mod types;

pub use types::*;
