// ABOUTME: HTTP control surface for the daemon.
// ABOUTME: One redeploy endpoint, one health endpoint.

mod handlers;
mod router;
mod state;

pub use router::build_router;
pub use state::AppState;
