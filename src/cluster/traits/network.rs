// ABOUTME: Network provisioning trait for the control plane.
// ABOUTME: Creation is idempotent; an existing network is success.

use super::sealed::Sealed;
use crate::cluster::CommandError;
use crate::types::NetworkId;
use async_trait::async_trait;

/// Idempotent network provisioning.
#[async_trait]
pub trait NetworkOps: Sealed + Send + Sync {
    /// Create a network with the given driver. Returns the id whether the
    /// network was freshly created or already existed.
    async fn create_network(&self, name: &str, driver: &str) -> Result<NetworkId, CommandError>;
}
