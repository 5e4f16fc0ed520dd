//! Error types for driving the tool.
//!
//! [`RunError`] is the single error surface of the crate. Exit failures are
//! classified from captured stderr into [`ExitError`] variants; everything
//! else (launch failures, capture failures, malformed JSON) stays
//! uninterpreted.

pub mod exit;

pub use exit::{ExitClassifier, ExitError, ExitFailure, LockInfo};

use std::io;

use thiserror::Error;

/// Errors produced while running the tool.
#[derive(Error, Debug)]
pub enum RunError {
    /// The binary could not be started at all. Never classified.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// The program that failed to start.
        program: String,
        #[source]
        source: io::Error,
    },

    /// The subprocess exited with non-zero status, classified by its
    /// stderr.
    #[error(transparent)]
    Exit(#[from] ExitError),

    /// Reading a captured output stream failed.
    #[error("failed to capture subprocess output: {0}")]
    Capture(#[source] io::Error),

    /// A `-json` command produced output that could not be decoded.
    #[error("malformed JSON output from `{command}`: {source}")]
    Json {
        /// The subcommand whose output failed to decode.
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RunError {
    /// True if the originating invocation was canceled by its caller.
    pub fn is_canceled(&self) -> bool {
        matches!(self, RunError::Exit(exit) if exit.is_canceled())
    }

    /// True if the originating invocation hit its deadline.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, RunError::Exit(exit) if exit.is_deadline_exceeded())
    }

    /// The classified exit error, if that is what this is.
    pub fn exit_error(&self) -> Option<&ExitError> {
        match self {
            RunError::Exit(exit) => Some(exit),
            _ => None,
        }
    }
}
