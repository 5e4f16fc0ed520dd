//! `terraform destroy`.

use std::path::PathBuf;

use super::{append_var_flags, Terraform};
use crate::context::RunContext;
use crate::error::RunError;

/// Options for [`Terraform::destroy`].
#[derive(Debug, Clone)]
pub struct DestroyOptions {
    /// Refresh state before destroying.
    pub refresh: bool,
    /// Limit on concurrent operations.
    pub parallelism: Option<u32>,
    /// `-var` assignments, `name=value`.
    pub vars: Vec<String>,
    /// `-var-file` paths.
    pub var_files: Vec<PathBuf>,
    /// Resource addresses to limit the operation to.
    pub targets: Vec<String>,
}

impl Default for DestroyOptions {
    fn default() -> Self {
        Self {
            refresh: true,
            parallelism: None,
            vars: Vec::new(),
            var_files: Vec::new(),
            targets: Vec::new(),
        }
    }
}

impl DestroyOptions {
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
}

fn build_args(options: &DestroyOptions) -> Vec<String> {
    let mut args = vec![
        "destroy".to_string(),
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
    args
}

impl Terraform {
    /// Run `terraform destroy` in the configured working directory.
    pub async fn destroy(
        &self,
        options: &DestroyOptions,
        ctx: &mut RunContext,
    ) -> Result<(), RunError> {
        self.runner().run(&build_args(options), ctx).await?;
        Ok(())
    }
}
