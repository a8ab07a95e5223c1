// ABOUTME: Uniform result shape returned to the caller of a redeploy.
// ABOUTME: Carries enough to tell apart untouched, partial, and fully applied.

use crate::types::UnitId;

use super::error::PipelineError;
use super::stage::PipelineStage;

/// Outcome of a completed pipeline run. Returned to the caller, never
/// stored anywhere.
#[derive(Debug, Clone)]
pub struct RedeployReport {
    pub unit: UnitId,
    /// The stage the pipeline finished in.
    pub stage: PipelineStage,
    pub message: String,
    /// Raw control-plane output from the final operation.
    pub output: String,
    pub cluster_mutated: bool,
}

impl RedeployReport {
    pub(crate) fn success(
        unit: UnitId,
        stage: PipelineStage,
        message: impl Into<String>,
        output: String,
    ) -> Self {
        Self {
            unit,
            stage,
            message: message.into(),
            output,
            cluster_mutated: true,
        }
    }
}

/// Where an error lands in the HTTP surface. HTTP-agnostic on purpose so
/// the mapping is testable without a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 401 — key rejected, nothing ran.
    Unauthorized,
    /// 400 — unit id not configured, nothing ran.
    BadRequest,
    /// 409 — the unit is mid-redeploy already.
    Conflict,
    /// 500 — the pipeline started and failed.
    PipelineFailure,
}

pub fn classify(error: &PipelineError) -> FailureClass {
    match error {
        PipelineError::Auth(_) => FailureClass::Unauthorized,
        PipelineError::UnknownUnit(_) => FailureClass::BadRequest,
        PipelineError::Busy { .. } => FailureClass::Conflict,
        PipelineError::External { .. }
        | PipelineError::DefinitionMissing { .. }
        | PipelineError::Timeout { .. }
        | PipelineError::Internal { .. } => FailureClass::PipelineFailure,
    }
}
