// ABOUTME: Shared-secret gate in front of the redeploy endpoint.
// ABOUTME: Fails closed; nothing talks to the cluster before this passes.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid API key")]
pub struct AuthError;

/// Validates the caller-supplied key against the configured secret.
///
/// Constructed without a secret it rejects everything. Startup normally
/// refuses to run without one, so that path only exists as a backstop.
pub struct AuthGate {
    secret: Option<String>,
}

impl AuthGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
        }
    }

    pub fn closed() -> Self {
        Self { secret: None }
    }

    pub fn check(&self, supplied: &str) -> Result<(), AuthError> {
        match &self.secret {
            Some(secret) if !secret.is_empty() && supplied == secret => Ok(()),
            _ => Err(AuthError),
        }
    }
}
