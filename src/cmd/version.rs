//! `terraform version`.

use serde::Deserialize;

use super::Terraform;
use crate::context::RunContext;
use crate::error::RunError;

/// Parsed output of `terraform version -json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TerraformVersion {
    /// The tool's semantic version, e.g. `1.5.0`.
    #[serde(rename = "terraform_version")]
    pub version: String,
    /// Platform triple, e.g. `linux_amd64`.
    #[serde(default)]
    pub platform: Option<String>,
    /// Whether the tool reports a newer release is available.
    #[serde(rename = "terraform_outdated", default)]
    pub outdated: Option<bool>,
}

fn build_args() -> Vec<String> {
    vec!["version".to_string(), "-json".to_string()]
}

impl Terraform {
    /// Query the binary's version.
    pub async fn version(&self, ctx: &mut RunContext) -> Result<TerraformVersion, RunError> {
        let output = self.runner().run(&build_args(), ctx).await?;
        serde_json::from_str(&output.stdout).map_err(|source| RunError::Json {
            command: "version".to_string(),
            source,
        })
    }
}
