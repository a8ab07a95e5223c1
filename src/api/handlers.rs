// ABOUTME: Request handlers for redeploy and health.
// ABOUTME: Maps pipeline outcomes onto the wire shape and status codes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::deploy::{classify, FailureClass, PipelineError, RedeployOptions};

use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RedeployParams {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    skip_auth_step: bool,
}

#[derive(Debug, Serialize)]
pub struct RedeployBody {
    message: String,
    output: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    detail: String,
}

pub async fn redeploy(
    State(state): State<AppState>,
    Query(params): Query<RedeployParams>,
) -> Result<Json<RedeployBody>, (StatusCode, Json<ErrorBody>)> {
    let options = RedeployOptions {
        skip_auth_step: params.skip_auth_step,
    };
    let report = state
        .orchestrator
        .redeploy(&params.api_key, &params.unit, options)
        .await
        .map_err(into_response_error)?;

    Ok(Json(RedeployBody {
        message: report.message,
        output: report.output,
    }))
}

fn into_response_error(error: PipelineError) -> (StatusCode, Json<ErrorBody>) {
    let status = match classify(&error) {
        FailureClass::Unauthorized => StatusCode::UNAUTHORIZED,
        FailureClass::BadRequest => StatusCode::BAD_REQUEST,
        FailureClass::Conflict => StatusCode::CONFLICT,
        FailureClass::PipelineFailure => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            detail: error.to_string(),
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    status: &'static str,
}

/// Always healthy: this reports the daemon, not the cluster.
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}
