//! Table-to-series preparation.
//!
//! Responsibilities:
//!
//! - reshape wide tables into long records, coercing bad cells to unset
//! - aggregate records into yearly totals
//! - split yearly totals into train/test windows

pub mod aggregate;
pub mod reshape;
pub mod split;

pub use aggregate::*;
pub use reshape::*;
pub use split::*;
