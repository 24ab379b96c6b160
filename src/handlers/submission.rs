// src/handlers/submission.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::parse_path_id,
    models::quiz_result::SubmitAnswersRequest,
    services::ScoringEngine,
    utils::{access::Principal, json::AppJson},
};

/// Scores the caller's answers and records the attempt.
///
/// The result and the quiz progress entry are written together; the response
/// carries the score and the id of the stored result.
pub async fn submit_answers(
    State(engine): State<ScoringEngine>,
    Extension(principal): Extension<Principal>,
    Path(quiz_id): Path<String>,
    AppJson(req): AppJson<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_path_id(&quiz_id, "Quiz")?;

    let outcome = engine
        .submit(quiz_id, principal.user_id, req.answers)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// The caller's own quiz results, newest first.
pub async fn list_my_results(
    State(engine): State<ScoringEngine>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(engine.results_for_user(principal.user_id).await?))
}
