//! `terraform validate`.

use serde::Deserialize;

use super::Terraform;
use crate::context::RunContext;
use crate::error::RunError;

/// Exit code Terraform uses when the configuration is invalid.
const INVALID_CONFIG: i32 = 1;

/// Parsed output of `terraform validate -json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateOutput {
    /// Whether the configuration is valid.
    pub valid: bool,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub warning_count: u32,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// A single configuration diagnostic.
#[derive(Debug, Clone, Deserialize)]
pub struct Diagnostic {
    /// `"error"` or `"warning"`.
    pub severity: String,
    pub summary: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub range: Option<DiagnosticRange>,
}

/// Source location of a diagnostic.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticRange {
    pub filename: String,
    #[serde(default)]
    pub start: Option<DiagnosticPos>,
}

/// A line/column position within a configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticPos {
    pub line: u32,
    pub column: u32,
}

fn build_args() -> Vec<String> {
    vec![
        "validate".to_string(),
        "-no-color".to_string(),
        "-json".to_string(),
    ]
}

impl Terraform {
    /// Run `terraform validate -json` and parse the diagnostic report.
    ///
    /// An invalid configuration is a completed validation, not a failure:
    /// the report comes back with `valid: false`. Exit code 1 without a
    /// JSON report (for example an uninitialized working directory) is
    /// classified like any other exit failure.
    pub async fn validate(&self, ctx: &mut RunContext) -> Result<ValidateOutput, RunError> {
        let output = self
            .runner()
            .run_accepting(&build_args(), &[INVALID_CONFIG], ctx)
            .await?;
        match serde_json::from_str(&output.stdout) {
            Ok(report) => Ok(report),
            Err(_) if !output.status.success() => Err(self.runner().exit_error(&output, ctx)),
            Err(source) => Err(RunError::Json {
                command: "validate".to_string(),
                source,
            }),
        }
    }
}
