// ABOUTME: Pull-then-update pipeline for service units.
// ABOUTME: Strictly ordered, no retries; first failure aborts with its stage.

use crate::cluster::{ImageOps, RegistryAuth, RolloutPolicy, ServiceOps};
use crate::types::{ImageRef, ServiceName, UnitId};

use super::error::PipelineError;
use super::report::RedeployReport;
use super::stage::{PipelineStage, StageTracker};

/// Drives the two-step rolling update of a single service.
pub(crate) struct ServiceUpdater<'a, P: ?Sized> {
    plane: &'a P,
    auth: Option<&'a RegistryAuth>,
}

impl<'a, P> ServiceUpdater<'a, P>
where
    P: ImageOps + ServiceOps + ?Sized,
{
    pub(crate) fn new(plane: &'a P, auth: Option<&'a RegistryAuth>) -> Self {
        Self { plane, auth }
    }

    /// Pull the image, then roll the service onto it. `update_service` is
    /// never attempted when the pull fails.
    pub(crate) async fn run(
        &self,
        unit: &UnitId,
        target: &ServiceName,
        image: &ImageRef,
        rollout: &RolloutPolicy,
        tracker: &StageTracker,
    ) -> Result<RedeployReport, PipelineError> {
        tracker.enter(PipelineStage::PullImage);
        self.plane
            .pull_image(image, self.auth)
            .await
            .map_err(PipelineError::external(PipelineStage::PullImage))?;

        tracker.enter(PipelineStage::UpdateService);
        let output = self
            .plane
            .update_service(target, image, rollout, self.auth.is_some())
            .await
            .map_err(PipelineError::external(PipelineStage::UpdateService))?;

        Ok(RedeployReport::success(
            unit.clone(),
            PipelineStage::UpdateService,
            format!("Redeployment of {unit} triggered"),
            output,
        ))
    }
}
