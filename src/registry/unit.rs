// ABOUTME: Data shapes for deployable units.
// ABOUTME: Unit kind and definition source are tagged variants, not parallel pipelines.

use serde::Deserialize;

use crate::cluster::RolloutPolicy;
use crate::types::{ImageRef, ServiceName, StackName, UnitId};

/// One redeployable thing. The kind decides which pipeline runs; a unit is
/// never processed by both.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployableUnit {
    pub id: UnitId,
    pub image: ImageRef,
    #[serde(flatten)]
    pub kind: UnitKind,
}

impl DeployableUnit {
    /// Cross-field checks that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        match &self.kind {
            UnitKind::Service { rollout, .. } => {
                if rollout.parallelism == 0 {
                    return Err("rollout parallelism must be at least 1".to_string());
                }
            }
            UnitKind::Stack(spec) => {
                if spec.definition_file.contains('/') {
                    return Err("definition_file must be a bare file name".to_string());
                }
                for rule in &spec.rewrites {
                    rule.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Service units roll a single long-running process to a new image; stack
/// units tear down and rebuild a named group of services from one
/// definition file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum UnitKind {
    Service {
        /// Cluster-side service name the rolling update targets.
        target: ServiceName,
        #[serde(default)]
        rollout: RolloutPolicy,
    },
    Stack(StackSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackSpec {
    pub name: StackName,
    pub source: DefinitionSource,
    /// Top-level definition file expected inside the resolved directory.
    #[serde(default = "default_definition_file")]
    pub definition_file: String,
    /// Only volumes matching one of these are purged during a rebuild.
    #[serde(default)]
    pub purge_volumes: Vec<VolumePattern>,
    /// Overlay network the stack attaches to; provisioned idempotently.
    pub network: String,
    /// Textual rewrites applied to the definition before deploying.
    #[serde(default)]
    pub rewrites: Vec<RewriteRule>,
}

fn default_definition_file() -> String {
    "docker-stack.yml".to_string()
}

/// Where a stack definition comes from. New fetch strategies extend this
/// enum; the pipeline itself never changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DefinitionSource {
    /// Sparse checkout of one subtree of a version-controlled location.
    GitSubtree {
        url: String,
        #[serde(default = "default_branch")]
        branch: String,
        subtree: String,
    },
    /// Extraction of a known path from the unit's own image.
    ImageEmbedded { path: String },
}

fn default_branch() -> String {
    "main".to_string()
}

/// Match rule for volume purging. Anything not matching survives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumePattern {
    Contains(String),
    Exact(String),
}

impl VolumePattern {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            VolumePattern::Contains(needle) => name.contains(needle.as_str()),
            VolumePattern::Exact(expected) => name == expected,
        }
    }
}

/// One idempotent textual substitution in the definition file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewriteRule {
    pub from: String,
    pub to: String,
}

impl RewriteRule {
    /// Replacing `from` with a string still containing `from` would
    /// rewrite again on every application, so such rules are rejected.
    pub fn validate(&self) -> Result<(), String> {
        if self.from.is_empty() {
            return Err("rewrite rule has an empty 'from'".to_string());
        }
        if self.to.contains(self.from.as_str()) {
            return Err(format!(
                "rewrite rule '{}' -> '{}' is not idempotent",
                self.from, self.to
            ));
        }
        Ok(())
    }
}
