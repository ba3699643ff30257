//! Input helpers.
//!
//! - CSV ingest of wide tables (`ingest`)

pub mod ingest;

pub use ingest::*;
