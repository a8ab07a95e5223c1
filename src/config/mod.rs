// ABOUTME: Daemon settings read from the environment at startup.
// ABOUTME: Missing deploy secret fails startup; nothing is silently defaulted to open.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cluster::RegistryAuth;
use crate::error::{Error, Result};
use crate::types::{ImageRef, UnitId};

pub const ENV_DEPLOY_SECRET: &str = "RESTACK_DEPLOY_SECRET";
pub const ENV_REGISTRY_USER: &str = "RESTACK_REGISTRY_USER";
pub const ENV_REGISTRY_PASSWORD: &str = "RESTACK_REGISTRY_PASSWORD";
pub const ENV_BIND: &str = "RESTACK_BIND";
pub const ENV_STATE_DIR: &str = "RESTACK_STATE_DIR";
pub const ENV_UNITS_FILE: &str = "RESTACK_UNITS_FILE";
pub const ENV_DRAIN_DELAY_SECS: &str = "RESTACK_DRAIN_DELAY_SECS";
pub const ENV_CALL_TIMEOUT_SECS: &str = "RESTACK_CALL_TIMEOUT_SECS";
pub const ENV_PIPELINE_TIMEOUT_SECS: &str = "RESTACK_PIPELINE_TIMEOUT_SECS";
const ENV_IMAGE_PREFIX: &str = "RESTACK_IMAGE_";

/// Everything the daemon needs from its environment, resolved once.
pub struct Settings {
    pub bind: SocketAddr,
    pub deploy_secret: String,
    pub registry_auth: Option<RegistryAuth>,
    pub state_dir: PathBuf,
    pub units_file: Option<PathBuf>,
    pub drain_delay: Duration,
    pub call_timeout: Duration,
    pub pipeline_timeout: Duration,
    image_overrides: HashMap<String, ImageRef>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bind", &self.bind)
            .field("deploy_secret", &"<redacted>")
            .field("registry_auth", &self.registry_auth)
            .field("state_dir", &self.state_dir)
            .field("units_file", &self.units_file)
            .field("drain_delay", &self.drain_delay)
            .field("call_timeout", &self.call_timeout)
            .field("pipeline_timeout", &self.pipeline_timeout)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let deploy_secret = required(ENV_DEPLOY_SECRET)?;

        let registry_auth = match (optional(ENV_REGISTRY_USER), optional(ENV_REGISTRY_PASSWORD)) {
            (Some(username), Some(password)) => Some(RegistryAuth { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(Error::MissingEnvVar(ENV_REGISTRY_PASSWORD.into())),
            (None, Some(_)) => return Err(Error::MissingEnvVar(ENV_REGISTRY_USER.into())),
        };

        let bind = match optional(ENV_BIND) {
            Some(raw) => raw.parse().map_err(|_| Error::InvalidEnvVar {
                name: ENV_BIND.into(),
                reason: format!("not a socket address: {raw}"),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 9000)),
        };

        let state_dir = optional(ENV_STATE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/var/lib/restack"));

        let units_file = optional(ENV_UNITS_FILE).map(PathBuf::from);
        if let Some(ref path) = units_file {
            if !path.is_file() {
                return Err(Error::UnitsFileNotFound(path.clone()));
            }
        }

        Ok(Self {
            bind,
            deploy_secret,
            registry_auth,
            state_dir,
            units_file,
            drain_delay: duration_env(ENV_DRAIN_DELAY_SECS, 20)?,
            call_timeout: duration_env(ENV_CALL_TIMEOUT_SECS, 120)?,
            pipeline_timeout: duration_env(ENV_PIPELINE_TIMEOUT_SECS, 600)?,
            image_overrides: image_overrides_from_env()?,
        })
    }

    /// Image override for a unit, from `RESTACK_IMAGE_<UNIT>` (unit id
    /// uppercased, hyphens as underscores).
    pub fn image_override(&self, unit: &UnitId) -> Option<ImageRef> {
        self.image_overrides.get(unit.as_str()).cloned()
    }
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| Error::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn duration_env(name: &str, default_secs: u64) -> Result<Duration> {
    match optional(name) {
        None => Ok(Duration::from_secs(default_secs)),
        Some(raw) => {
            let secs: u64 = raw.parse().map_err(|_| Error::InvalidEnvVar {
                name: name.to_string(),
                reason: format!("not a number of seconds: {raw}"),
            })?;
            Ok(Duration::from_secs(secs))
        }
    }
}

fn image_overrides_from_env() -> Result<HashMap<String, ImageRef>> {
    let mut overrides = HashMap::new();
    for (key, value) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(ENV_IMAGE_PREFIX) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let unit = suffix.to_lowercase().replace('_', "-");
        let image = ImageRef::parse(&value).map_err(|e| Error::InvalidEnvVar {
            name: key.clone(),
            reason: e.to_string(),
        })?;
        overrides.insert(unit, image);
    }
    Ok(overrides)
}
