//! Errors parsed from the tool's stderr stream.
//!
//! Terraform reports state-lock contention and rejected unlock identifiers
//! only as diagnostic text. This module owns every recognized marker and
//! turns a non-zero exit plus its captured stderr into a closed set of
//! typed variants, so call sites never inspect stderr themselves.

use std::fmt;
use std::process::ExitStatus;

use regex::Regex;
use thiserror::Error;

use super::RunError;
use crate::context::{CancelReason, RunContext};

/// Marker Terraform prints when it cannot acquire its state lock.
const STATE_LOCK_PATTERN: &str = "Error acquiring the state lock";

/// The six-line lock metadata block. All six fields must capture; a
/// truncated block is treated as unrecognized output.
const LOCK_INFO_PATTERN: &str = r"Lock Info:\n\s*ID:\s*([^\n]+)\n\s*Path:\s*([^\n]+)\n\s*Operation:\s*([^\n]+)\n\s*Who:\s*([^\n]+)\n\s*Version:\s*([^\n]+)\n\s*Created:\s*([^\n]+)\n";

/// Marker Terraform prints when `force-unlock` is given a wrong identifier.
const LOCK_ID_INVALID_PATTERN: &str = "Failed to unlock state: ";

/// A subprocess termination with non-zero status, as opposed to a failure
/// to launch the subprocess at all.
#[derive(Error, Debug)]
#[error("`{program}` exited unsuccessfully: {status}")]
pub struct ExitFailure {
    program: String,
    status: ExitStatus,
}

impl ExitFailure {
    pub(crate) fn new(program: impl Into<String>, status: ExitStatus) -> Self {
        Self {
            program: program.into(),
            status,
        }
    }

    /// The program that exited.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The raw exit status.
    pub fn status(&self) -> ExitStatus {
        self.status
    }

    /// The exit code, if the process exited normally.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Metadata describing who currently holds the state lock, extracted from
/// the tool's `Lock Info:` diagnostic block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockInfo {
    /// Lock identifier, usable with `force_unlock`.
    pub id: String,
    /// Path of the locked state.
    pub path: String,
    /// Operation the lock holder is running.
    pub operation: String,
    /// Identity of the lock holder.
    pub who: String,
    /// Tool version of the lock holder.
    pub version: String,
    /// Creation timestamp, kept verbatim as printed by the tool.
    pub created: String,
}

impl LockInfo {
    /// Renders the block in the same layout the tool prints, trailing
    /// newline included. Field values are substituted verbatim.
    pub fn render(&self) -> Result<String, fmt::Error> {
        use std::fmt::Write;

        let mut out = String::new();
        writeln!(out, "Lock Info:")?;
        writeln!(out, "  ID:        {}", self.id)?;
        writeln!(out, "  Path:      {}", self.path)?;
        writeln!(out, "  Operation: {}", self.operation)?;
        writeln!(out, "  Who:       {}", self.who)?;
        writeln!(out, "  Version:   {}", self.version)?;
        writeln!(out, "  Created:   {}", self.created)?;
        Ok(out)
    }
}

/// A classified non-zero exit of the driven tool.
///
/// Every variant keeps the original [`ExitFailure`] reachable through
/// [`ExitError::exit_failure`] (and `Error::source`), and records whether
/// the invocation's context was canceled or hit its deadline while the
/// subprocess ran — the classification never loses that signal.
#[derive(Debug)]
pub enum ExitError {
    /// Exit failure with nothing to parse: stderr was empty or whitespace.
    Plain {
        source: ExitFailure,
        cancel: CancelReason,
    },
    /// The tool could not acquire its state lock; the holder's metadata was
    /// extracted from the diagnostic block.
    StateLocked {
        source: ExitFailure,
        cancel: CancelReason,
        lock: LockInfo,
    },
    /// An unlock request was rejected because its lock identifier was wrong.
    LockIdInvalid {
        source: ExitFailure,
        cancel: CancelReason,
        stderr: String,
    },
    /// Exit failure with unrecognized stderr, carried verbatim.
    WithStderr {
        source: ExitFailure,
        cancel: CancelReason,
        stderr: String,
    },
}

impl ExitError {
    pub(crate) fn plain(source: ExitFailure, cancel: CancelReason) -> Self {
        ExitError::Plain { source, cancel }
    }

    /// The original exit failure, whichever variant this is.
    pub fn exit_failure(&self) -> &ExitFailure {
        match self {
            ExitError::Plain { source, .. }
            | ExitError::StateLocked { source, .. }
            | ExitError::LockIdInvalid { source, .. }
            | ExitError::WithStderr { source, .. } => source,
        }
    }

    /// Why the invocation's context stopped waiting, if it did.
    pub fn cancel_reason(&self) -> CancelReason {
        match self {
            ExitError::Plain { cancel, .. }
            | ExitError::StateLocked { cancel, .. }
            | ExitError::LockIdInvalid { cancel, .. }
            | ExitError::WithStderr { cancel, .. } => *cancel,
        }
    }

    /// True if the invocation was canceled by its caller.
    pub fn is_canceled(&self) -> bool {
        self.cancel_reason() == CancelReason::Canceled
    }

    /// True if the invocation hit its deadline.
    pub fn is_deadline_exceeded(&self) -> bool {
        self.cancel_reason() == CancelReason::DeadlineExceeded
    }

    /// Lock metadata, for the state-locked variant.
    pub fn lock_info(&self) -> Option<&LockInfo> {
        match self {
            ExitError::StateLocked { lock, .. } => Some(lock),
            _ => None,
        }
    }

    /// The captured stderr, for the variants that carry it verbatim.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ExitError::LockIdInvalid { stderr, .. } | ExitError::WithStderr { stderr, .. } => {
                Some(stderr)
            }
            _ => None,
        }
    }

    pub(crate) fn into_failure(self) -> ExitFailure {
        match self {
            ExitError::Plain { source, .. }
            | ExitError::StateLocked { source, .. }
            | ExitError::LockIdInvalid { source, .. }
            | ExitError::WithStderr { source, .. } => source,
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitError::Plain { source, .. } => write!(f, "{source}"),
            // Rendering falls back to the bare message through an explicit
            // branch; it must never surface a formatting error.
            ExitError::StateLocked { lock, .. } => match lock.render() {
                Ok(block) => write!(f, "error acquiring the state lock: {block}"),
                Err(_) => f.write_str("error acquiring the state lock"),
            },
            ExitError::LockIdInvalid { stderr, .. } => f.write_str(stderr),
            ExitError::WithStderr { source, stderr, .. } => write!(f, "{source}\n{stderr}"),
        }
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.exit_failure())
    }
}

/// Classifies exit failures by the diagnostic text on stderr.
///
/// Holds the compiled patterns; one instance lives in each handle and is
/// safe to use from concurrent invocations.
#[derive(Debug)]
pub struct ExitClassifier {
    state_lock: Regex,
    lock_info: Regex,
    lock_id_invalid: Regex,
}

impl ExitClassifier {
    /// Compiles the recognized diagnostic patterns.
    ///
    /// # Panics
    /// Panics if a built-in pattern fails to compile.
    pub fn new() -> Self {
        Self {
            state_lock: Regex::new(STATE_LOCK_PATTERN).expect("invalid state lock pattern"),
            lock_info: Regex::new(LOCK_INFO_PATTERN).expect("invalid lock info pattern"),
            lock_id_invalid: Regex::new(LOCK_ID_INVALID_PATTERN)
                .expect("invalid lock id pattern"),
        }
    }

    /// Classifies a runner error by its captured stderr.
    ///
    /// Only exit failures are interpreted; any other error is returned
    /// unchanged. The context is read, never set: its termination reason is
    /// recorded on whichever variant comes back, so the cancellation signal
    /// survives classification.
    pub fn classify(&self, err: RunError, stderr: &str, ctx: &RunContext) -> RunError {
        match err {
            RunError::Exit(exit) => {
                RunError::Exit(self.classify_exit(exit.into_failure(), stderr, ctx))
            }
            other => other,
        }
    }

    fn classify_exit(&self, failure: ExitFailure, stderr: &str, ctx: &RunContext) -> ExitError {
        let cancel = ctx.reason();

        if stderr.trim().is_empty() {
            return ExitError::Plain {
                source: failure,
                cancel,
            };
        }

        if self.state_lock.is_match(stderr) {
            if let Some(lock) = self.extract_lock_info(stderr) {
                return ExitError::StateLocked {
                    source: failure,
                    cancel,
                    lock,
                };
            }
            // Marker without a complete block: degrade to verbatim stderr
            // rather than a partially-populated lock error.
        } else if self.lock_id_invalid.is_match(stderr) {
            return ExitError::LockIdInvalid {
                source: failure,
                cancel,
                stderr: stderr.to_string(),
            };
        }

        ExitError::WithStderr {
            source: failure,
            cancel,
            stderr: stderr.to_string(),
        }
    }

    fn extract_lock_info(&self, stderr: &str) -> Option<LockInfo> {
        let caps = self.lock_info.captures(stderr)?;
        Some(LockInfo {
            id: caps.get(1)?.as_str().to_string(),
            path: caps.get(2)?.as_str().to_string(),
            operation: caps.get(3)?.as_str().to_string(),
            who: caps.get(4)?.as_str().to_string(),
            version: caps.get(5)?.as_str().to_string(),
            created: caps.get(6)?.as_str().to_string(),
        })
    }
}

impl Default for ExitClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io;
    use std::os::unix::process::ExitStatusExt;

    use super::*;

    const LOCKED_STDERR: &str = "\
Error: Error acquiring the state lock

Error message: resource temporarily unavailable
Lock Info:
  ID:        abc123
  Path:      terraform.tfstate
  Operation: OperationTypeApply
  Who:       user@host
  Version:   1.5.0
  Created:   2024-01-01 00:00:00

Terraform acquires a state lock to protect the state from being written
by multiple users at the same time.
";

    fn exit_status(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    fn failure() -> ExitFailure {
        ExitFailure::new("terraform", exit_status(1))
    }

    fn exit_err(failure: ExitFailure) -> RunError {
        RunError::Exit(ExitError::plain(failure, CancelReason::None))
    }

    fn classify(stderr: &str, ctx: &RunContext) -> RunError {
        ExitClassifier::new().classify(exit_err(failure()), stderr, ctx)
    }

    fn classify_plainly(stderr: &str) -> ExitError {
        match classify(stderr, &RunContext::new()) {
            RunError::Exit(exit) => exit,
            other => panic!("expected an exit error, got {other:?}"),
        }
    }

    #[test]
    fn empty_stderr_stays_plain() {
        let exit = classify_plainly("");
        assert!(matches!(exit, ExitError::Plain { .. }));
        assert!(exit.lock_info().is_none());
        assert_eq!(exit.to_string(), failure().to_string());
    }

    #[test]
    fn whitespace_stderr_stays_plain() {
        let exit = classify_plainly("  \n\t \n");
        assert!(matches!(exit, ExitError::Plain { .. }));
    }

    #[test]
    fn state_lock_block_is_extracted() {
        let exit = classify_plainly(LOCKED_STDERR);
        let lock = exit.lock_info().expect("state lock should be recognized");
        assert_eq!(lock.id, "abc123");
        assert_eq!(lock.path, "terraform.tfstate");
        assert_eq!(lock.operation, "OperationTypeApply");
        assert_eq!(lock.who, "user@host");
        assert_eq!(lock.version, "1.5.0");
        assert_eq!(lock.created, "2024-01-01 00:00:00");
    }

    #[test]
    fn state_lock_message_uses_fixed_template() {
        let exit = classify_plainly(LOCKED_STDERR);
        let message = exit.to_string();
        assert!(message.starts_with("error acquiring the state lock: Lock Info:\n"));
        assert!(message.contains("  ID:        abc123\n"));
        assert!(message.contains("  Path:      terraform.tfstate\n"));
        assert!(message.contains("  Operation: OperationTypeApply\n"));
        assert!(message.contains("  Who:       user@host\n"));
        assert!(message.contains("  Version:   1.5.0\n"));
        assert!(message.ends_with("  Created:   2024-01-01 00:00:00\n"));
    }

    #[test]
    fn truncated_lock_block_degrades_to_stderr_variant() {
        let stderr = "\
Error acquiring the state lock
Lock Info:
  ID:        abc123
  Path:      terraform.tfstate
  Operation: OperationTypeApply
";
        let exit = classify_plainly(stderr);
        assert!(matches!(exit, ExitError::WithStderr { .. }));
        assert!(exit.lock_info().is_none());
    }

    #[test]
    fn invalid_lock_id_message_is_stderr_verbatim() {
        let stderr = "Failed to unlock state: bad id xyz";
        let exit = classify_plainly(stderr);
        assert!(matches!(exit, ExitError::LockIdInvalid { .. }));
        assert_eq!(exit.to_string(), stderr);
    }

    #[test]
    fn unrecognized_stderr_is_appended_to_the_failure() {
        let exit = classify_plainly("random failure: disk full");
        assert!(matches!(exit, ExitError::WithStderr { .. }));
        assert_eq!(
            exit.to_string(),
            format!("{}\nrandom failure: disk full", failure())
        );
    }

    #[test]
    fn non_exit_errors_pass_through_unchanged() {
        let classifier = ExitClassifier::new();
        let err = RunError::Launch {
            program: "terraform".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let back = classifier.classify(err, LOCKED_STDERR, &RunContext::new());
        match back {
            RunError::Launch { program, .. } => assert_eq!(program, "terraform"),
            other => panic!("launch error should pass through, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_reason_survives_every_variant() {
        let cases = [
            "",
            LOCKED_STDERR,
            "Failed to unlock state: bad id xyz",
            "random failure: disk full",
        ];
        for stderr in cases {
            for reason in [CancelReason::Canceled, CancelReason::DeadlineExceeded] {
                let mut ctx = RunContext::new();
                ctx.set_reason(reason);
                let exit = match classify(stderr, &ctx) {
                    RunError::Exit(exit) => exit,
                    other => panic!("expected an exit error, got {other:?}"),
                };
                assert_eq!(exit.cancel_reason(), reason);
                assert_eq!(exit.is_canceled(), reason == CancelReason::Canceled);
                assert_eq!(
                    exit.is_deadline_exceeded(),
                    reason == CancelReason::DeadlineExceeded
                );
            }

            let exit = classify_plainly(stderr);
            assert!(!exit.is_canceled());
            assert!(!exit.is_deadline_exceeded());
        }
    }

    #[test]
    fn every_variant_unwraps_to_the_exit_failure() {
        use std::error::Error;

        for stderr in [
            "",
            LOCKED_STDERR,
            "Failed to unlock state: bad id xyz",
            "random failure: disk full",
        ] {
            let exit = classify_plainly(stderr);
            assert_eq!(exit.exit_failure().program(), "terraform");
            assert_eq!(exit.exit_failure().code(), Some(1));
            let source = exit.source().expect("source should be the exit failure");
            assert_eq!(source.to_string(), failure().to_string());
        }
    }

    #[test]
    fn rendered_lock_message_round_trips_through_the_pattern() {
        let exit = classify_plainly(LOCKED_STDERR);
        let original = exit.lock_info().expect("lock info").clone();

        let classifier = ExitClassifier::new();
        let recovered = classifier
            .extract_lock_info(&exit.to_string())
            .expect("rendered message should match the lock info pattern");
        assert_eq!(recovered, original);
    }
}
