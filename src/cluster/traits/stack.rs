// ABOUTME: Stack lifecycle trait for the control plane.
// ABOUTME: Remove is idempotent; deploy reads a definition directory.

use super::sealed::Sealed;
use crate::cluster::CommandError;
use crate::types::StackName;
use async_trait::async_trait;
use std::path::Path;

/// Deploy and remove named stacks.
#[async_trait]
pub trait StackOps: Sealed + Send + Sync {
    /// Remove a stack. Removing a stack that does not exist is success.
    /// Removal is asynchronous at the engine: tasks and their volumes keep
    /// draining after this returns.
    async fn remove_stack(&self, stack: &StackName) -> Result<(), CommandError>;

    /// Deploy a stack from `definition_file` inside `dir`. Returns the
    /// engine's stdout.
    async fn deploy_stack(
        &self,
        stack: &StackName,
        dir: &Path,
        definition_file: &str,
        with_registry_auth: bool,
    ) -> Result<String, CommandError>;
}
