//! `terraform force-unlock`.

use super::Terraform;
use crate::context::RunContext;
use crate::error::RunError;

fn build_args(lock_id: &str) -> Vec<String> {
    vec![
        "force-unlock".to_string(),
        "-no-color".to_string(),
        "-force".to_string(),
        lock_id.to_string(),
    ]
}

impl Terraform {
    /// Release the state lock with the given identifier.
    ///
    /// The identifier usually comes from
    /// [`LockInfo::id`](crate::error::LockInfo) on a state-locked error. A
    /// rejected identifier surfaces as
    /// [`ExitError::LockIdInvalid`](crate::error::ExitError).
    pub async fn force_unlock(&self, lock_id: &str, ctx: &mut RunContext) -> Result<(), RunError> {
        self.runner().run(&build_args(lock_id), ctx).await?;
        Ok(())
    }
}
