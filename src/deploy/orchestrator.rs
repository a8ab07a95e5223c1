// ABOUTME: Entry point for one redeploy request: gate, lookup, lock, dispatch.
// ABOUTME: Pipelines run on a detached task so client disconnects cannot halve a teardown.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthGate;
use crate::cluster::{ControlPlane, RegistryAuth};
use crate::config::Settings;
use crate::registry::{DeployableUnit, UnitKind, UnitRegistry};
use crate::types::UnitId;

use super::error::PipelineError;
use super::lock::UnitLocks;
use super::report::RedeployReport;
use super::service::ServiceUpdater;
use super::stack::StackLifecycleManager;
use super::stage::{PipelineStage, StageTracker};

/// Per-request knobs, all optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedeployOptions {
    /// Skip the registry login/auth-forwarding step, even when
    /// credentials are configured.
    pub skip_auth_step: bool,
}

/// Owns everything a redeploy needs and serializes runs per unit.
pub struct Orchestrator {
    gate: AuthGate,
    registry: UnitRegistry,
    locks: Arc<UnitLocks>,
    plane: Arc<dyn ControlPlane>,
    registry_auth: Option<RegistryAuth>,
    state_dir: PathBuf,
    drain_delay: Duration,
    call_timeout: Duration,
    pipeline_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        gate: AuthGate,
        registry: UnitRegistry,
        plane: Arc<dyn ControlPlane>,
        settings: &Settings,
    ) -> Self {
        Self {
            gate,
            registry,
            locks: Arc::new(UnitLocks::new()),
            plane,
            registry_auth: settings.registry_auth.clone(),
            state_dir: settings.state_dir.clone(),
            drain_delay: settings.drain_delay,
            call_timeout: settings.call_timeout,
            pipeline_timeout: settings.pipeline_timeout,
        }
    }

    pub fn unit_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// Run one redeploy to completion. Auth and unit lookup reject before
    /// any external call; the pipeline itself is spawned so it survives
    /// the caller going away, and is bounded by the pipeline budget.
    pub async fn redeploy(
        &self,
        api_key: &str,
        unit: &str,
        options: RedeployOptions,
    ) -> Result<RedeployReport, PipelineError> {
        self.gate.check(api_key)?;

        let id = UnitId::new(unit)
            .map_err(|_| PipelineError::UnknownUnit(self.registry.unknown(unit)))?;
        let unit = self.registry.get(&id)?.clone();

        // Held for the whole pipeline; released by the spawned task, not
        // by this (cancellable) request future.
        let guard = self.locks.acquire(&id)?;

        let plane = Arc::clone(&self.plane);
        let auth = if options.skip_auth_step {
            None
        } else {
            self.registry_auth.clone()
        };
        let state_dir = self.state_dir.clone();
        let drain_delay = self.drain_delay;
        let call_timeout = self.call_timeout;
        let budget = self.pipeline_timeout;

        // The stage a timeout or panic is attributed to when the pipeline
        // never got to enter one.
        let first_stage = match &unit.kind {
            UnitKind::Service { .. } => PipelineStage::PullImage,
            UnitKind::Stack(_) => PipelineStage::RemoveStack,
        };

        let tracker = Arc::new(StageTracker::new(id.clone()));
        let task_tracker = Arc::clone(&tracker);

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let pipeline = run_pipeline(
                plane.as_ref(),
                &unit,
                auth.as_ref(),
                &state_dir,
                drain_delay,
                call_timeout,
                &task_tracker,
            );
            match tokio::time::timeout(budget, pipeline).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::Timeout {
                    stage: task_tracker.last_entered().unwrap_or(first_stage),
                    budget,
                }),
            }
        });

        match handle.await {
            Ok(result) => {
                if let Err(ref error) = result {
                    tracing::error!(unit = %id, error = %error, "redeploy failed");
                }
                result
            }
            Err(join_error) => {
                let stage = tracker.last_entered().unwrap_or(first_stage);
                Err(PipelineError::internal(stage, join_error))
            }
        }
    }
}

async fn run_pipeline(
    plane: &dyn ControlPlane,
    unit: &DeployableUnit,
    auth: Option<&RegistryAuth>,
    state_dir: &std::path::Path,
    drain_delay: Duration,
    call_timeout: Duration,
    tracker: &StageTracker,
) -> Result<RedeployReport, PipelineError> {
    match &unit.kind {
        UnitKind::Service { target, rollout } => {
            ServiceUpdater::new(plane, auth)
                .run(&unit.id, target, &unit.image, rollout, tracker)
                .await
        }
        UnitKind::Stack(spec) => {
            StackLifecycleManager::new(plane, auth, state_dir, drain_delay, call_timeout)
                .run(&unit.id, &unit.image, spec, tracker)
                .await
        }
    }
}
