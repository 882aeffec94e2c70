//! Axum route handler for the career analysis endpoint.

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::career::guard::{guard_input, InputRejection};
use crate::career::models::{CareerAnalysisRequest, CareerAnalysisResult};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/analyze-career
///
/// Every log line of the request, including the one written when an error
/// becomes a response, is emitted inside a `career_analysis` span that
/// carries the request id.
pub async fn handle_analyze_career(
    State(state): State<AppState>,
    body: Result<Json<CareerAnalysisRequest>, JsonRejection>,
) -> Response {
    let span = info_span!("career_analysis", request_id = %Uuid::new_v4());
    let outcome = analyze_career(state, body).instrument(span.clone()).await;
    span.in_scope(|| outcome.map(Json).into_response())
}

/// Input guard first, then the credential check, then the pipeline.
/// A body that is not a JSON object is treated like missing input.
async fn analyze_career(
    state: AppState,
    body: Result<Json<CareerAnalysisRequest>, JsonRejection>,
) -> Result<CareerAnalysisResult, AppError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Unreadable analyze-career body: {rejection}");
            return Err(InputRejection::Missing.into());
        }
    };

    let input = guard_input(request.input.as_ref())?;

    let analyzer = state
        .career
        .as_ref()
        .ok_or(AppError::Configuration("OPENAI_API_KEY"))?;

    analyzer.analyze(&input).await
}
