// ABOUTME: Rolling service update trait for the control plane.
// ABOUTME: The rollout policy is forwarded verbatim; the engine owns the semantics.

use super::sealed::Sealed;
use super::shared_types::RolloutPolicy;
use crate::cluster::CommandError;
use crate::types::{ImageRef, ServiceName};
use async_trait::async_trait;

/// Rolling update of a running service.
#[async_trait]
pub trait ServiceOps: Sealed + Send + Sync {
    /// Update `service` to run `image`, rolling per `policy`. Idempotent:
    /// updating to the already-running image is forced through so a fresh
    /// pull still rolls out. Returns the engine's stdout.
    async fn update_service(
        &self,
        service: &ServiceName,
        image: &ImageRef,
        policy: &RolloutPolicy,
        with_registry_auth: bool,
    ) -> Result<String, CommandError>;
}
