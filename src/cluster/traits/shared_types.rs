// ABOUTME: Types shared across control-plane traits.
// ABOUTME: Registry credentials and rolling-update parameters.

use serde::Deserialize;
use std::time::Duration;

/// Credentials for a container registry.
///
/// The password is piped to the login command's stdin; it never appears in
/// an argument vector or a log line.
#[derive(Clone, Deserialize)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Whether replacement tasks start before or after the old ones stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolloutOrder {
    StartFirst,
    StopFirst,
}

impl RolloutOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            RolloutOrder::StartFirst => "start-first",
            RolloutOrder::StopFirst => "stop-first",
        }
    }
}

/// Parameters of a rolling service update, forwarded to the control plane
/// unmodified. The plane owns the actual rolling-update semantics.
#[derive(Debug, Clone, Deserialize)]
pub struct RolloutPolicy {
    /// How many replicas update at once.
    pub parallelism: u32,
    /// Delay between update batches.
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    /// Start-first or stop-first ordering.
    pub order: RolloutOrder,
}

impl Default for RolloutPolicy {
    fn default() -> Self {
        Self {
            parallelism: 1,
            delay: Duration::from_secs(10),
            order: RolloutOrder::StartFirst,
        }
    }
}
