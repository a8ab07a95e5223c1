// ABOUTME: Error taxonomy for redeploy pipelines.
// ABOUTME: Every pipeline failure carries its stage and the raw diagnostic text.

use std::time::Duration;

use crate::auth::AuthError;
use crate::cluster::CommandError;
use crate::registry::UnknownUnit;

use super::lock::LockInfo;
use super::stage::PipelineStage;

/// Everything a redeploy request can fail with. The first three reject
/// before any cluster-mutating call is attempted.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Bad or missing API key. No side effects.
    #[error("Invalid API key")]
    Auth(#[from] AuthError),

    /// Unit id nobody configured. No side effects.
    #[error(transparent)]
    UnknownUnit(#[from] UnknownUnit),

    /// Another redeploy of the same unit is still running. No side effects.
    #[error("redeploy of {unit} already in progress ({holder})")]
    Busy { unit: String, holder: LockInfo },

    /// A control-plane call failed. The stderr inside is the operator's
    /// primary debugging aid and is passed through verbatim.
    #[error("{stage}: {source}")]
    External {
        stage: PipelineStage,
        source: CommandError,
    },

    /// The resolved definition directory lacks the expected file. The
    /// listing shows what the fetch actually produced.
    #[error("{stage}: definition file '{expected}' not found; directory contains: [{}]", .listing.join(", "))]
    DefinitionMissing {
        stage: PipelineStage,
        expected: String,
        listing: Vec<String>,
    },

    /// The cumulative pipeline budget expired. The stage is the last one
    /// entered (or the pipeline's first, if none was).
    #[error("{stage}: pipeline timed out after {}s", .budget.as_secs())]
    Timeout {
        stage: PipelineStage,
        budget: Duration,
    },

    /// A non-command failure (filesystem, task plumbing) inside a stage.
    /// Kept stage-labelled so nothing ever propagates without one.
    #[error("{stage}: {message}")]
    Internal {
        stage: PipelineStage,
        message: String,
    },
}

impl PipelineError {
    /// The stage the pipeline was in when it failed, if it got that far.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::Auth(_) | PipelineError::UnknownUnit(_) | PipelineError::Busy { .. } => {
                None
            }
            PipelineError::External { stage, .. }
            | PipelineError::DefinitionMissing { stage, .. }
            | PipelineError::Internal { stage, .. }
            | PipelineError::Timeout { stage, .. } => Some(*stage),
        }
    }

    /// Whether any cluster-state-mutating operation may have run before
    /// (or during) the failure. Conservative: failing inside a mutating
    /// stage counts, because the call may have partially applied.
    pub fn cluster_mutated(&self) -> bool {
        match self.stage() {
            None => false,
            Some(failed) => {
                failed.mutates_cluster()
                    || stage_sequence(failed)
                        .iter()
                        .take_while(|stage| **stage != failed)
                        .any(|stage| stage.mutates_cluster())
            }
        }
    }

    pub(crate) fn external(stage: PipelineStage) -> impl FnOnce(CommandError) -> Self {
        move |source| PipelineError::External { stage, source }
    }

    pub(crate) fn internal(stage: PipelineStage, err: impl std::fmt::Display) -> Self {
        PipelineError::Internal {
            stage,
            message: err.to_string(),
        }
    }
}

/// The stage order of the pipeline a stage belongs to.
fn stage_sequence(stage: PipelineStage) -> &'static [PipelineStage] {
    const SERVICE: &[PipelineStage] = &[PipelineStage::PullImage, PipelineStage::UpdateService];
    const STACK: &[PipelineStage] = &[
        PipelineStage::RemoveStack,
        PipelineStage::WaitForDrain,
        PipelineStage::PurgeVolumes,
        PipelineStage::FetchDefinition,
        PipelineStage::PatchConfig,
        PipelineStage::EnsureNetwork,
        PipelineStage::DeployStack,
    ];
    match stage {
        PipelineStage::PullImage | PipelineStage::UpdateService => SERVICE,
        _ => STACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_error() -> CommandError {
        CommandError::Exited {
            program: "docker".to_string(),
            code: 1,
            stderr: "no such image".to_string(),
        }
    }

    #[test]
    fn failed_pull_means_nothing_mutated() {
        let err = PipelineError::External {
            stage: PipelineStage::PullImage,
            source: command_error(),
        };
        assert!(!err.cluster_mutated());
    }

    #[test]
    fn failed_update_counts_as_mutation() {
        let err = PipelineError::External {
            stage: PipelineStage::UpdateService,
            source: command_error(),
        };
        assert!(err.cluster_mutated());
    }

    #[test]
    fn missing_definition_after_teardown_is_partial() {
        let err = PipelineError::DefinitionMissing {
            stage: PipelineStage::FetchDefinition,
            expected: "docker-stack.yml".to_string(),
            listing: vec![],
        };
        // The stack was already removed by the time fetch runs.
        assert!(err.cluster_mutated());
    }

    #[test]
    fn auth_rejection_has_no_stage_and_no_mutation() {
        let err = PipelineError::Auth(AuthError);
        assert_eq!(err.stage(), None);
        assert!(!err.cluster_mutated());
    }

    #[test]
    fn external_error_display_leads_with_the_stage() {
        let err = PipelineError::External {
            stage: PipelineStage::DeployStack,
            source: command_error(),
        };
        let text = err.to_string();
        assert!(text.starts_with("deploy-stack: "), "got: {text}");
        assert!(text.contains("no such image"));
    }
}
