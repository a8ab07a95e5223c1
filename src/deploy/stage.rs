// ABOUTME: Pipeline stage names and the per-run stage tracker.
// ABOUTME: Stages are diagnostics and state-machine position, never persisted.

use parking_lot::Mutex;
use std::fmt;

use crate::types::UnitId;

/// Position in a redeploy pipeline. The service pipeline uses the first
/// two; the stack pipeline uses the rest, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    PullImage,
    UpdateService,
    RemoveStack,
    WaitForDrain,
    PurgeVolumes,
    FetchDefinition,
    PatchConfig,
    EnsureNetwork,
    DeployStack,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::PullImage => "pull-image",
            PipelineStage::UpdateService => "update-service",
            PipelineStage::RemoveStack => "remove-stack",
            PipelineStage::WaitForDrain => "wait-for-drain",
            PipelineStage::PurgeVolumes => "purge-volumes",
            PipelineStage::FetchDefinition => "fetch-definition",
            PipelineStage::PatchConfig => "patch-config",
            PipelineStage::EnsureNetwork => "ensure-network",
            PipelineStage::DeployStack => "deploy-stack",
        }
    }

    /// Whether reaching this stage may have changed cluster state. Image
    /// pulls only warm a node-local cache; fetching and patching a
    /// definition touch nothing cluster-side.
    pub fn mutates_cluster(self) -> bool {
        match self {
            PipelineStage::PullImage
            | PipelineStage::WaitForDrain
            | PipelineStage::FetchDefinition
            | PipelineStage::PatchConfig => false,
            PipelineStage::UpdateService
            | PipelineStage::RemoveStack
            | PipelineStage::PurgeVolumes
            | PipelineStage::EnsureNetwork
            | PipelineStage::DeployStack => true,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared record of the stage a running pipeline is in. The pipeline
/// writes it on every stage entry; the timeout path reads it to label the
/// abort.
pub(crate) struct StageTracker {
    unit: UnitId,
    current: Mutex<Option<PipelineStage>>,
}

impl StageTracker {
    pub(crate) fn new(unit: UnitId) -> Self {
        Self {
            unit,
            current: Mutex::new(None),
        }
    }

    pub(crate) fn enter(&self, stage: PipelineStage) {
        tracing::info!(unit = %self.unit, stage = %stage, "entering pipeline stage");
        *self.current.lock() = Some(stage);
    }

    pub(crate) fn last_entered(&self) -> Option<PipelineStage> {
        *self.current.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutating_stages_are_exactly_the_cluster_writes() {
        let mutating: Vec<_> = [
            PipelineStage::PullImage,
            PipelineStage::UpdateService,
            PipelineStage::RemoveStack,
            PipelineStage::WaitForDrain,
            PipelineStage::PurgeVolumes,
            PipelineStage::FetchDefinition,
            PipelineStage::PatchConfig,
            PipelineStage::EnsureNetwork,
            PipelineStage::DeployStack,
        ]
        .into_iter()
        .filter(|stage| stage.mutates_cluster())
        .collect();
        assert_eq!(
            mutating,
            vec![
                PipelineStage::UpdateService,
                PipelineStage::RemoveStack,
                PipelineStage::PurgeVolumes,
                PipelineStage::EnsureNetwork,
                PipelineStage::DeployStack,
            ]
        );
    }

    #[test]
    fn tracker_remembers_the_latest_stage() {
        let tracker = StageTracker::new(UnitId::new("backend").unwrap());
        assert_eq!(tracker.last_entered(), None);
        tracker.enter(PipelineStage::PullImage);
        tracker.enter(PipelineStage::UpdateService);
        assert_eq!(tracker.last_entered(), Some(PipelineStage::UpdateService));
    }
}
