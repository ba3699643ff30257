//! Error types.
//!
//! Two layers:
//!
//! - `PipelineError`: typed failures of the data-to-forecast pipeline. These are
//!   reported per dataset and never abort the other dataset's run.
//! - `AppError`: process-level failures of the dashboard binary (configuration,
//!   terminal), carrying the exit code used by `main`.

use thiserror::Error;

/// Failures of a single dataset's pipeline run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The input table could not be opened or read.
    #[error("failed to read '{path}': {message}")]
    Io { path: String, message: String },

    /// Malformed table structure (year header, category column, CSV framing).
    #[error("parse error in column '{column}': {message}")]
    Parse { column: String, message: String },

    /// Model order outside the supported ranges.
    #[error("invalid model order: {0}")]
    InvalidOrder(String),

    /// Train/test boundary configuration is not usable.
    #[error("invalid split configuration: {0}")]
    InvalidSplit(String),

    /// Training window too short for the requested order.
    #[error("insufficient data: need at least {needed} training observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Maximum-likelihood fit failed (non-convergence, unusable likelihood).
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Forecast and held-out actuals cannot be compared position by position.
    #[error("length mismatch: forecast has {forecast} values, actuals have {actual}")]
    LengthMismatch { forecast: usize, actual: usize },
}

impl PipelineError {
    /// Short, stable tag for display and logging.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Io { .. } => "io",
            PipelineError::Parse { .. } => "parse",
            PipelineError::InvalidOrder(_) => "invalid-order",
            PipelineError::InvalidSplit(_) => "invalid-split",
            PipelineError::InsufficientData { .. } => "insufficient-data",
            PipelineError::ModelFit(_) => "model-fit",
            PipelineError::LengthMismatch { .. } => "length-mismatch",
        }
    }

    pub(crate) fn parse(column: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Parse {
            column: column.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
