//! Error types.
//!
//! `AppError` is the process boundary: a message plus the exit code `main` returns.
//! The pipeline's own failures are typed enums so the orchestrator can tell a skipped
//! instrument apart from a run-ending condition.

use std::time::Duration;

use thiserror::Error;

/// Exit code for bad configuration or a session that could not be started.
pub const EXIT_SETUP: u8 = 2;
/// Exit code when no instrument produced a usable series.
pub const EXIT_EMPTY_DATASET: u8 = 3;
/// Exit code for failures writing the chart, report or exports.
pub const EXIT_OUTPUT: u8 = 4;

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

/// Failure acquiring a rendered snapshot.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to start browser session: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigate { url: String, reason: String },
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: &'static str, after: Duration },
    #[error("failed to capture page content: {0}")]
    Capture(String),
}

/// Why a single instrument produced no series this run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no table containing '{marker}' on the page")]
    TableNotFound { marker: String },
    #[error("only {points} usable points, need more than {min_points}")]
    InsufficientData { points: usize, min_points: usize },
}

/// No instrument produced a series: nothing to rank or render.
#[derive(Debug, Error)]
#[error("no data collected from {attempted} instrument(s)")]
pub struct EmptyDatasetError {
    pub attempted: usize,
}

impl From<EmptyDatasetError> for AppError {
    fn from(err: EmptyDatasetError) -> Self {
        AppError::new(EXIT_EMPTY_DATASET, err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::new(EXIT_SETUP, err.to_string())
    }
}
