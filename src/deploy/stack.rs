// ABOUTME: Teardown-and-rebuild pipeline for stack units.
// ABOUTME: Fixed stage order, each gated on the previous, no compensation on failure.

use std::path::Path;
use std::time::Duration;

use crate::cluster::{ControlPlane, RegistryAuth};
use crate::registry::StackSpec;
use crate::types::{ImageRef, UnitId};

use super::definition::DefinitionProvider;
use super::error::PipelineError;
use super::patch::ConfigPatcher;
use super::report::RedeployReport;
use super::stage::{PipelineStage, StageTracker};

/// Drives the full stack rebuild:
/// remove -> drain -> purge volumes -> fetch -> patch -> network -> deploy.
///
/// State left behind by a mid-pipeline failure stays as-is; the error's
/// stage tells the operator how far it got.
pub(crate) struct StackLifecycleManager<'a, P: ?Sized> {
    plane: &'a P,
    auth: Option<&'a RegistryAuth>,
    state_dir: &'a Path,
    drain_delay: Duration,
    call_timeout: Duration,
}

impl<'a, P> StackLifecycleManager<'a, P>
where
    P: ControlPlane + ?Sized,
{
    pub(crate) fn new(
        plane: &'a P,
        auth: Option<&'a RegistryAuth>,
        state_dir: &'a Path,
        drain_delay: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            plane,
            auth,
            state_dir,
            drain_delay,
            call_timeout,
        }
    }

    pub(crate) async fn run(
        &self,
        unit: &UnitId,
        image: &ImageRef,
        spec: &StackSpec,
        tracker: &StageTracker,
    ) -> Result<RedeployReport, PipelineError> {
        tracker.enter(PipelineStage::RemoveStack);
        self.plane
            .remove_stack(&spec.name)
            .await
            .map_err(PipelineError::external(PipelineStage::RemoveStack))?;

        // Removal is fire-and-forget at the engine; volumes stay attached
        // to terminating tasks for a while after it returns.
        tracker.enter(PipelineStage::WaitForDrain);
        tokio::time::sleep(self.drain_delay).await;

        tracker.enter(PipelineStage::PurgeVolumes);
        self.purge_volumes(spec).await?;

        tracker.enter(PipelineStage::FetchDefinition);
        let provider = DefinitionProvider::new(self.plane, self.state_dir, self.call_timeout);
        let resolved = provider
            .fetch(unit, image, &spec.source, &spec.definition_file)
            .await?;

        tracker.enter(PipelineStage::PatchConfig);
        let patcher = ConfigPatcher::new(spec.rewrites.clone());
        let changed = patcher
            .apply_file(&resolved.dir().join(&spec.definition_file))
            .map_err(|e| PipelineError::internal(PipelineStage::PatchConfig, e))?;
        if changed {
            tracing::debug!(unit = %unit, "definition rewritten for this environment");
        }

        tracker.enter(PipelineStage::EnsureNetwork);
        self.plane
            .create_network(&spec.network, "overlay")
            .await
            .map_err(PipelineError::external(PipelineStage::EnsureNetwork))?;

        tracker.enter(PipelineStage::DeployStack);
        let output = self
            .plane
            .deploy_stack(
                &spec.name,
                resolved.dir(),
                &spec.definition_file,
                self.auth.is_some(),
            )
            .await
            .map_err(PipelineError::external(PipelineStage::DeployStack))?;

        Ok(RedeployReport::success(
            unit.clone(),
            PipelineStage::DeployStack,
            format!("Redeployment of {unit} stack triggered"),
            output,
        ))
    }

    /// Remove exactly the volumes matching a configured pattern. A name
    /// matching no pattern is never touched.
    async fn purge_volumes(&self, spec: &StackSpec) -> Result<(), PipelineError> {
        let volumes = self
            .plane
            .list_volumes()
            .await
            .map_err(PipelineError::external(PipelineStage::PurgeVolumes))?;

        for volume in volumes {
            if !spec.purge_volumes.iter().any(|p| p.matches(&volume)) {
                continue;
            }
            tracing::info!(volume = %volume, stack = %spec.name, "purging volume");
            self.plane
                .remove_volume(&volume)
                .await
                .map_err(PipelineError::external(PipelineStage::PurgeVolumes))?;
        }
        Ok(())
    }
}
