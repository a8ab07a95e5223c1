// ABOUTME: Image operations trait for the control plane.
// ABOUTME: Pulling an image, optionally authenticating against the registry first.

use super::sealed::Sealed;
use super::shared_types::RegistryAuth;
use crate::cluster::CommandError;
use crate::types::ImageRef;
use async_trait::async_trait;

/// Image operations.
#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// Pull an image onto the node. When credentials are given the plane
    /// logs in to the registry before pulling.
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), CommandError>;
}
