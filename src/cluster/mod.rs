// ABOUTME: Cluster control plane abstraction and its swarm CLI implementation.
// ABOUTME: Capability traits per concern; callers never build a shell string.

pub(crate) mod exec;
mod error;
pub mod swarm;
pub mod traits;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{CommandError, CommandErrorKind};
pub use swarm::SwarmPlane;
pub use traits::{
    ControlPlane, ExtractOps, ImageOps, NetworkOps, RegistryAuth, RolloutOrder, RolloutPolicy,
    ServiceOps, StackOps, VolumeOps,
};
