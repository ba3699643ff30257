//! `arima-dash` library crate.
//!
//! The binary (`arima-dash`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes or a terminal
//! - the stages (ingest, reshape, aggregate, split, fit, evaluate) are reusable
//!   by other hosts

pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod tui;
