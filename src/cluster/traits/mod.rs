// ABOUTME: Composable capability traits for the cluster control plane.
// ABOUTME: Defines ImageOps, ServiceOps, StackOps, VolumeOps, NetworkOps, ExtractOps.

mod extract;
mod image;
mod network;
pub(crate) mod sealed;
mod service;
mod shared_types;
mod stack;
mod volume;

pub use extract::ExtractOps;
pub use image::ImageOps;
pub use network::NetworkOps;
pub use service::ServiceOps;
pub use shared_types::{RegistryAuth, RolloutOrder, RolloutPolicy};
pub use stack::StackOps;
pub use volume::VolumeOps;

/// Everything the redeploy pipelines need from a control plane.
pub trait ControlPlane:
    ImageOps + ServiceOps + StackOps + VolumeOps + NetworkOps + ExtractOps
{
}

impl<T> ControlPlane for T where
    T: ImageOps + ServiceOps + StackOps + VolumeOps + NetworkOps + ExtractOps
{
}
