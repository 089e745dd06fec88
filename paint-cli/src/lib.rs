//! # Paint CLI Library
//!
//! Shared types and functionality for the `paint` command-line tool.
//! This library is used by both the binary and integration tests.

pub mod commands;
pub mod submitter;
pub mod validation;

pub use commands::{FrameSummary, SessionSummary};
pub use submitter::{DryRunSubmitter, RecordedPayload};
pub use validation::ValidationError;

/// Read command input from a path, with `-` meaning stdin.
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read.
pub fn read_input(path: &std::path::Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    }
}
