//! `terraform apply`.

use std::path::PathBuf;

use super::{append_var_flags, Terraform};
use crate::context::RunContext;
use crate::error::RunError;

/// Options for [`Terraform::apply`].
///
/// Applies run non-interactively with `-auto-approve`; there is no prompt
/// to answer.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Refresh state before applying.
    pub refresh: bool,
    /// Limit on concurrent operations.
    pub parallelism: Option<u32>,
    /// `-var` assignments, `name=value`.
    pub vars: Vec<String>,
    /// `-var-file` paths.
    pub var_files: Vec<PathBuf>,
    /// Resource addresses to limit the operation to.
    pub targets: Vec<String>,
    /// Apply a saved plan file instead of planning in place. Variable and
    /// target options are ignored by the tool when a plan file is given.
    pub plan_file: Option<PathBuf>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            refresh: true,
            parallelism: None,
            vars: Vec::new(),
            var_files: Vec::new(),
            targets: Vec::new(),
            plan_file: None,
        }
    }
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn with_var(mut self, var: impl Into<String>) -> Self {
        self.vars.push(var.into());
        self
    }

    pub fn with_var_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.var_files.push(file.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn with_plan_file(mut self, plan_file: impl Into<PathBuf>) -> Self {
        self.plan_file = Some(plan_file.into());
        self
    }
}

fn build_args(options: &ApplyOptions) -> Vec<String> {
    let mut args = vec![
        "apply".to_string(),
        "-no-color".to_string(),
        "-input=false".to_string(),
        "-auto-approve".to_string(),
    ];
    if !options.refresh {
        args.push("-refresh=false".to_string());
    }
    if let Some(parallelism) = options.parallelism {
        args.push(format!("-parallelism={parallelism}"));
    }
    append_var_flags(&mut args, &options.vars, &options.var_files, &options.targets);
    if let Some(plan_file) = &options.plan_file {
        args.push(plan_file.display().to_string());
    }
    args
}

impl Terraform {
    /// Run `terraform apply` in the configured working directory.
    pub async fn apply(&self, options: &ApplyOptions, ctx: &mut RunContext) -> Result<(), RunError> {
        self.runner().run(&build_args(options), ctx).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_auto_approve() {
        assert_eq!(
            build_args(&ApplyOptions::default()),
            vec!["apply", "-no-color", "-input=false", "-auto-approve"]
        );
    }

    #[test]
    fn plan_file_comes_last() {
        let options = ApplyOptions::new()
            .with_refresh(false)
            .with_parallelism(4)
            .with_plan_file("tfplan");
        assert_eq!(
            build_args(&options),
            vec![
                "apply",
                "-no-color",
                "-input=false",
                "-auto-approve",
                "-refresh=false",
                "-parallelism=4",
                "tfplan",
            ]
        );
    }
}
