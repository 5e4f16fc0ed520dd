//! Configuration for the driven binary.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Configuration for a [`Terraform`](crate::Terraform) handle.
#[derive(Debug, Clone)]
pub struct TerraformConfig {
    /// Path or name of the binary to execute.
    pub exec_path: PathBuf,
    /// Working directory holding the root module.
    pub working_dir: PathBuf,
    /// Extra environment variables set for every invocation.
    pub env: HashMap<String, String>,
    /// Default deadline applied when a context carries none.
    pub timeout: Option<Duration>,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            exec_path: PathBuf::from("terraform"),
            working_dir: PathBuf::from("."),
            env: HashMap::new(),
            timeout: None,
        }
    }
}

impl TerraformConfig {
    /// A configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binary to execute.
    pub fn with_exec_path(mut self, exec_path: impl Into<PathBuf>) -> Self {
        self.exec_path = exec_path.into();
        self
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    /// Add an environment variable for every invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the default deadline for invocations.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Check if a program exists in PATH (cross-platform).
pub(crate) fn is_program_in_path(program: &str) -> bool {
    #[cfg(target_os = "windows")]
    let check_cmd = "where";
    #[cfg(not(target_os = "windows"))]
    let check_cmd = "which";

    Command::new(check_cmd)
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
