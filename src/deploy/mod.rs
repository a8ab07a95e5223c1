// ABOUTME: Redeploy pipelines and their orchestration.
// ABOUTME: Exports the orchestrator, error taxonomy, stages, and result shape.

mod definition;
mod error;
mod lock;
mod orchestrator;
mod patch;
mod report;
mod service;
mod stack;
mod stage;

pub use error::PipelineError;
pub use lock::LockInfo;
pub use orchestrator::{Orchestrator, RedeployOptions};
pub use patch::ConfigPatcher;
pub use report::{classify, FailureClass, RedeployReport};
pub use stage::PipelineStage;
