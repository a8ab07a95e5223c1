// ABOUTME: Static table of deployable units, loaded once at startup.
// ABOUTME: Built-in product units, overridable by a YAML units file.

mod unit;

pub use unit::{DefinitionSource, DeployableUnit, RewriteRule, StackSpec, UnitKind, VolumePattern};

use std::collections::BTreeMap;
use std::path::Path;

use nonempty::NonEmpty;
use thiserror::Error;

use crate::cluster::RolloutPolicy;
use crate::error::{Error, Result};
use crate::types::{ImageRef, ServiceName, StackName, UnitId};

/// Lookup of an id nobody configured. Carries the full valid set so the
/// caller can say what would have worked.
#[derive(Debug, Error)]
#[error("Invalid or missing unit. Must be one of: {}", .known.join(", "))]
pub struct UnknownUnit {
    pub requested: String,
    pub known: Vec<String>,
}

/// Immutable unit table. Read-only after startup, so lookups need no lock.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: BTreeMap<UnitId, DeployableUnit>,
}

impl UnitRegistry {
    pub fn new(units: NonEmpty<DeployableUnit>) -> Self {
        let units = units
            .into_iter()
            .map(|unit| (unit.id.clone(), unit))
            .collect();
        Self { units }
    }

    /// The units compiled into the daemon: the product's three services
    /// and its monitoring stack. `image_override` supplies replacement
    /// image references keyed by unit id.
    pub fn builtin(image_override: &dyn Fn(&UnitId) -> Option<ImageRef>) -> Self {
        let mut registry = Self::new(builtin_units());
        for unit in registry.units.values_mut() {
            if let Some(image) = image_override(&unit.id) {
                unit.image = image;
            }
        }
        registry
    }

    /// Load a replacement unit table from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: UnitsFile = serde_yaml::from_str(&raw)?;
        let units = NonEmpty::from_vec(file.units)
            .ok_or_else(|| Error::InvalidConfig("units file declares no units".to_string()))?;
        for unit in &units {
            unit.validate()
                .map_err(|reason| Error::InvalidConfig(format!("unit {}: {reason}", unit.id)))?;
        }
        Ok(Self::new(units))
    }

    pub fn get(&self, id: &UnitId) -> std::result::Result<&DeployableUnit, UnknownUnit> {
        self.units.get(id).ok_or_else(|| UnknownUnit {
            requested: id.to_string(),
            known: self.ids(),
        })
    }

    pub fn unknown(&self, requested: &str) -> UnknownUnit {
        UnknownUnit {
            requested: requested.to_string(),
            known: self.ids(),
        }
    }

    /// Configured unit ids, in stable sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.units.keys().map(UnitId::to_string).collect()
    }
}

#[derive(Debug, serde::Deserialize)]
struct UnitsFile {
    units: Vec<DeployableUnit>,
}

fn builtin_units() -> NonEmpty<DeployableUnit> {
    let service = |id: &str, image: &str, target: &str| DeployableUnit {
        id: UnitId::new(id).expect("builtin unit id is valid"),
        image: ImageRef::parse(image).expect("builtin image ref is valid"),
        kind: UnitKind::Service {
            target: ServiceName::new(target).expect("builtin service name is valid"),
            rollout: RolloutPolicy::default(),
        },
    };

    let monitoring = DeployableUnit {
        id: UnitId::new("monitoring").expect("builtin unit id is valid"),
        image: ImageRef::parse("steelduck1/rmw-monitoring:latest")
            .expect("builtin image ref is valid"),
        kind: UnitKind::Stack(StackSpec {
            name: StackName::new("monitoring").expect("builtin stack name is valid"),
            source: DefinitionSource::ImageEmbedded {
                path: "/opt/monitoring".to_string(),
            },
            definition_file: "docker-stack.yml".to_string(),
            purge_volumes: vec![
                VolumePattern::Contains("monitoring_".to_string()),
                VolumePattern::Exact("prometheus_data".to_string()),
                VolumePattern::Exact("grafana_data".to_string()),
            ],
            network: "monitoring_net".to_string(),
            rewrites: vec![RewriteRule {
                from: "monitoring-internal".to_string(),
                to: "monitoring_net".to_string(),
            }],
        }),
    };

    NonEmpty::from((
        service(
            "backend",
            "steelduck1/rmw-backend:latest",
            "rmw_backend",
        ),
        vec![
            service(
                "database",
                "steelduck1/rmw-database:latest",
                "rmw_database",
            ),
            service(
                "frontend",
                "steelduck1/rmw-frontend:latest",
                "rmw_frontend",
            ),
            monitoring,
        ],
    ))
}
