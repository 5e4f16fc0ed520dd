//! Terraform operations.
//!
//! One file per subcommand. Each operation builds its argument vector from
//! an options struct and delegates to the process runner; state-lock
//! contention in any of them surfaces as
//! [`ExitError::StateLocked`](crate::error::ExitError).

mod apply;
mod destroy;
mod force_unlock;
mod init;
mod plan;
mod validate;
mod version;

pub use apply::ApplyOptions;
pub use destroy::DestroyOptions;
pub use init::InitOptions;
pub use plan::PlanOptions;
pub use validate::{Diagnostic, DiagnosticPos, DiagnosticRange, ValidateOutput};
pub use version::TerraformVersion;

use std::io;
use std::path::PathBuf;

use crate::config::{is_program_in_path, TerraformConfig};
use crate::error::RunError;
use crate::runner::ProcessRunner;

/// Handle for driving a Terraform binary against one working directory.
///
/// The handle holds no per-invocation state and can serve concurrent
/// invocations; each call takes its own context.
#[derive(Debug)]
pub struct Terraform {
    runner: ProcessRunner,
}

impl Terraform {
    /// Create a handle without checking that the binary exists.
    pub fn new(config: TerraformConfig) -> Self {
        Self {
            runner: ProcessRunner::new(config),
        }
    }

    /// Create a handle, verifying the configured binary can be found.
    pub fn discover(config: TerraformConfig) -> Result<Self, RunError> {
        let program = config.exec_path.to_string_lossy().into_owned();
        if !is_program_in_path(&program) {
            return Err(RunError::Launch {
                program,
                source: io::Error::new(io::ErrorKind::NotFound, "not found in PATH"),
            });
        }
        Ok(Self::new(config))
    }

    /// The configuration this handle runs with.
    pub fn config(&self) -> &TerraformConfig {
        self.runner.config()
    }

    pub(crate) fn runner(&self) -> &ProcessRunner {
        &self.runner
    }
}

/// Append `-var`, `-var-file`, and `-target` flags shared by plan, apply,
/// and destroy.
pub(crate) fn append_var_flags(
    args: &mut Vec<String>,
    vars: &[String],
    var_files: &[PathBuf],
    targets: &[String],
) {
    for var in vars {
        args.push(format!("-var={var}"));
    }
    for file in var_files {
        args.push(format!("-var-file={}", file.display()));
    }
    for target in targets {
        args.push(format!("-target={target}"));
    }
}
