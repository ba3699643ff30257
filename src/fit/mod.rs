//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - difference and scale the training series
//! - choose deterministic starting values
//! - maximise the exact likelihood and report diagnostics

pub mod fitter;

pub use fitter::*;
