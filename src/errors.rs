//! Errors produced by the reporter and its configuration.

use std::io;
use thiserror::Error;
use uuid::Uuid;

/// An error that occurs while reporting an event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] io::Error),

    /// Two results were reported with the same execution id.
    ///
    /// This means either the host handed out colliding identities, or a result was reported
    /// twice. Neither is recoverable: the per-source statistics would be wrong.
    #[error("a result with execution id {execution_id} was already recorded")]
    DuplicateExecution {
        /// The colliding execution id.
        execution_id: Uuid,
    },

    /// An event was delivered after the run-complete event.
    #[error("event received after the test run completed")]
    RunAlreadyComplete,
}

impl From<io::Error> for ReportError {
    fn from(error: io::Error) -> Self {
        ReportError::Io(error)
    }
}

/// An error that occurs while building a [`ReporterConfig`](crate::ReporterConfig) from
/// run parameters.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// No parameters were supplied at all.
    ///
    /// The host always passes at least its own bookkeeping keys, so an empty set means the
    /// reporter was wired up incorrectly.
    #[error("no reporter parameters were supplied")]
    Empty,

    /// The verbosity value was not recognized.
    #[error("invalid verbosity `{value}` (expected quiet, minimal, normal or detailed)")]
    InvalidVerbosity {
        /// The value that failed to parse.
        value: String,
    },

    /// A boolean parameter had a value other than `true` or `false`.
    #[error("invalid value `{value}` for `{key}` (expected true or false)")]
    InvalidBool {
        /// The parameter name.
        key: String,
        /// The value that failed to parse.
        value: String,
    },
}
