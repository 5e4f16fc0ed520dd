//! `terraform init`.

use super::Terraform;
use crate::context::RunContext;
use crate::error::RunError;

/// Options for [`Terraform::init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Upgrade modules and plugins during initialization.
    pub upgrade: bool,
    /// Reconfigure the backend, ignoring any saved configuration.
    pub reconfigure: bool,
    /// `-backend-config` values, passed in order.
    pub backend_config: Vec<String>,
}

impl InitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upgrade(mut self, upgrade: bool) -> Self {
        self.upgrade = upgrade;
        self
    }

    pub fn with_reconfigure(mut self, reconfigure: bool) -> Self {
        self.reconfigure = reconfigure;
        self
    }

    /// Add a `-backend-config` value (a `key=value` pair or a file path).
    pub fn with_backend_config(mut self, value: impl Into<String>) -> Self {
        self.backend_config.push(value.into());
        self
    }
}

fn build_args(options: &InitOptions) -> Vec<String> {
    let mut args = vec![
        "init".to_string(),
        "-no-color".to_string(),
        "-input=false".to_string(),
    ];
    if options.upgrade {
        args.push("-upgrade".to_string());
    }
    if options.reconfigure {
        args.push("-reconfigure".to_string());
    }
    for value in &options.backend_config {
        args.push(format!("-backend-config={value}"));
    }
    args
}

impl Terraform {
    /// Run `terraform init` in the configured working directory.
    pub async fn init(&self, options: &InitOptions, ctx: &mut RunContext) -> Result<(), RunError> {
        self.runner().run(&build_args(options), ctx).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_disable_input() {
        assert_eq!(
            build_args(&InitOptions::default()),
            vec!["init", "-no-color", "-input=false"]
        );
    }

    #[test]
    fn all_options_appear_in_order() {
        let options = InitOptions::new()
            .with_upgrade(true)
            .with_reconfigure(true)
            .with_backend_config("bucket=tf-state")
            .with_backend_config("key=prod/terraform.tfstate");
        assert_eq!(
            build_args(&options),
            vec![
                "init",
                "-no-color",
                "-input=false",
                "-upgrade",
                "-reconfigure",
                "-backend-config=bucket=tf-state",
                "-backend-config=key=prod/terraform.tfstate",
            ]
        );
    }
}
