//! `terraform plan`.

use std::path::PathBuf;

use super::{append_var_flags, Terraform};
use crate::context::RunContext;
use crate::error::RunError;

/// Exit code Terraform uses with `-detailed-exitcode` when the plan
/// contains changes.
const CHANGES_PRESENT: i32 = 2;

/// Options for [`Terraform::plan`].
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Plan a destroy instead of an apply.
    pub destroy: bool,
    /// Refresh state before planning.
    pub refresh: bool,
    /// Write the plan to this file, usable with [`ApplyOptions::with_plan_file`](super::ApplyOptions::with_plan_file).
    pub out: Option<PathBuf>,
    /// `-var` assignments, `name=value`.
    pub vars: Vec<String>,
    /// `-var-file` paths.
    pub var_files: Vec<PathBuf>,
    /// Resource addresses to limit the operation to.
    pub targets: Vec<String>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            destroy: false,
            refresh: true,
            out: None,
            vars: Vec::new(),
            var_files: Vec::new(),
            targets: Vec::new(),
        }
    }
}

impl PlanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destroy(mut self, destroy: bool) -> Self {
        self.destroy = destroy;
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        self.out = Some(out.into());
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
}

fn build_args(options: &PlanOptions) -> Vec<String> {
    let mut args = vec![
        "plan".to_string(),
        "-no-color".to_string(),
        "-input=false".to_string(),
        "-detailed-exitcode".to_string(),
    ];
    if options.destroy {
        args.push("-destroy".to_string());
    }
    if !options.refresh {
        args.push("-refresh=false".to_string());
    }
    if let Some(out) = &options.out {
        args.push(format!("-out={}", out.display()));
    }
    append_var_flags(&mut args, &options.vars, &options.var_files, &options.targets);
    args
}

impl Terraform {
    /// Run `terraform plan`. Returns whether the plan contains changes.
    pub async fn plan(&self, options: &PlanOptions, ctx: &mut RunContext) -> Result<bool, RunError> {
        let output = self
            .runner()
            .run_accepting(&build_args(options), &[CHANGES_PRESENT], ctx)
            .await?;
        Ok(output.status.code() == Some(CHANGES_PRESENT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_request_detailed_exitcode() {
        assert_eq!(
            build_args(&PlanOptions::default()),
            vec!["plan", "-no-color", "-input=false", "-detailed-exitcode"]
        );
    }

    #[test]
    fn destroy_plan_with_vars_and_out() {
        let options = PlanOptions::new()
            .with_destroy(true)
            .with_refresh(false)
            .with_out("tfplan")
            .with_var("region=us-east-1")
            .with_var_file("prod.tfvars")
            .with_target("aws_instance.web");
        assert_eq!(
            build_args(&options),
            vec![
                "plan",
                "-no-color",
                "-input=false",
                "-detailed-exitcode",
                "-destroy",
                "-refresh=false",
                "-out=tfplan",
                "-var=region=us-east-1",
                "-var-file=prod.tfvars",
                "-target=aws_instance.web",
            ]
        );
    }
}
