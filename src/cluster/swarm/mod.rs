// ABOUTME: Swarm control plane backed by the docker CLI.
// ABOUTME: Stack deploy/rm are client-side CLI features, so the CLI is the transport.

mod plane;

pub use plane::SwarmPlane;
