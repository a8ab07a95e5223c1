// ABOUTME: File extraction trait for the control plane.
// ABOUTME: Copies a path out of an image without running it.

use super::sealed::Sealed;
use crate::cluster::CommandError;
use crate::types::ImageRef;
use async_trait::async_trait;
use std::path::Path;

/// Extract files embedded in an image.
#[async_trait]
pub trait ExtractOps: Sealed + Send + Sync {
    /// Copy the contents of `path_in_image` from `image` into `dest`.
    /// Any intermediate container is removed before this returns,
    /// whatever the outcome.
    async fn extract_files(
        &self,
        image: &ImageRef,
        path_in_image: &str,
        dest: &Path,
    ) -> Result<(), CommandError>;
}
