//! tfdriver - drive the Terraform CLI as a subprocess.
//!
//! This library builds command lines for Terraform operations, runs the
//! binary with captured output, supports per-invocation cancellation and
//! deadlines, and translates the tool's diagnostic text into typed errors
//! callers can match on (state-lock contention, rejected unlock
//! identifiers) without parsing stderr themselves.
//!
//! ```no_run
//! use tfdriver::{ApplyOptions, RunContext, RunError, Terraform, TerraformConfig};
//!
//! # async fn example() -> Result<(), RunError> {
//! let tf = Terraform::discover(TerraformConfig::new().with_working_dir("/srv/infra"))?;
//!
//! let mut ctx = RunContext::new();
//! match tf.apply(&ApplyOptions::default(), &mut ctx).await {
//!     Ok(()) => {}
//!     Err(err) => {
//!         if let Some(lock) = err.exit_error().and_then(|e| e.lock_info()) {
//!             eprintln!("state locked by {} since {}", lock.who, lock.created);
//!         }
//!         return Err(err);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;

mod runner;

pub use cmd::{
    ApplyOptions, DestroyOptions, Diagnostic, DiagnosticPos, DiagnosticRange, InitOptions,
    PlanOptions, Terraform, TerraformVersion, ValidateOutput,
};
pub use config::TerraformConfig;
pub use context::{CancelReason, RunContext};
pub use error::{ExitClassifier, ExitError, ExitFailure, LockInfo, RunError};
