// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::parse_path_id,
    models::question::UpdateQuestionRequest,
    services::{QuizCatalog, ScoringEngine},
    utils::json::AppJson,
};

/// Questions of a quiz including `correctAnswerIndex`, for authoring.
/// Admin only.
pub async fn list_questions_with_answers(
    State(catalog): State<QuizCatalog>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_path_id(&quiz_id, "Quiz")?;
    Ok(Json(catalog.list_questions_with_answers(quiz_id).await?))
}

/// Updates a question that has not been used in any result yet.
/// Admin only.
pub async fn update_question(
    State(catalog): State<QuizCatalog>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_path_id(&id, "Question")?;
    Ok(Json(catalog.update_question(id, payload).await?))
}

/// Deletes a question that has not been used in any result yet.
/// Admin only.
pub async fn delete_question(
    State(catalog): State<QuizCatalog>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_path_id(&id, "Question")?;
    catalog.delete_question(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every stored quiz result.
/// Admin only.
pub async fn list_all_results(
    State(engine): State<ScoringEngine>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(engine.all_results().await?))
}
