// ABOUTME: Volume operations trait for the control plane.
// ABOUTME: Listing returns every volume name; filtering is the caller's job.

use super::sealed::Sealed;
use crate::cluster::CommandError;
use async_trait::async_trait;

/// List and remove named volumes.
#[async_trait]
pub trait VolumeOps: Sealed + Send + Sync {
    /// Names of all volumes on the node, unfiltered.
    async fn list_volumes(&self) -> Result<Vec<String>, CommandError>;

    /// Remove one volume by name. Fails if the volume is still in use.
    async fn remove_volume(&self, name: &str) -> Result<(), CommandError>;
}
