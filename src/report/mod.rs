//! Reporting: forecast accuracy and formatted results.

pub mod accuracy;
pub mod format;

pub use accuracy::*;
pub use format::*;
