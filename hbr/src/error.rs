//! Failures detected by hbrender itself
//!
//! Everything else (I/O, YAML parsing, template errors) travels as an
//! `eyre::Report` and is only caught in `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for data errors and any delegated failure
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for invalid option combinations
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Usage(String),

    #[error("variables in \"{}\" must be a mapping, found {found}", .path.display())]
    NotAMapping { path: PathBuf, found: &'static str },
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::NotAMapping { .. } => EXIT_FAILURE,
        }
    }
}

/// Map a top-level error report to the process exit status
pub fn exit_code_for(report: &eyre::Report) -> i32 {
    report.downcast_ref::<RunError>().map_or(EXIT_FAILURE, RunError::exit_code)
}
