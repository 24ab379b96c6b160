// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::parse_path_id,
    models::{
        question::CreateQuestionRequest,
        quiz::{CreateQuizRequest, UpdateQuizRequest},
    },
    services::QuizCatalog,
    utils::json::AppJson,
};

/// Lists every quiz as a summary. Public.
pub async fn list_quizzes(
    State(catalog): State<QuizCatalog>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog.list_quizzes().await?))
}

pub async fn get_quiz(
    State(catalog): State<QuizCatalog>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_path_id(&quiz_id, "Quiz")?;
    Ok(Json(catalog.get_quiz(quiz_id).await?))
}

/// Creates a quiz.
/// Admin only.
pub async fn create_quiz(
    State(catalog): State<QuizCatalog>,
    AppJson(payload): AppJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = catalog.create_quiz(payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Applies a partial update and returns the resulting quiz.
/// Admin only.
pub async fn update_quiz(
    State(catalog): State<QuizCatalog>,
    Path(quiz_id): Path<String>,
    AppJson(payload): AppJson<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_path_id(&quiz_id, "Quiz")?;
    Ok(Json(catalog.update_quiz(quiz_id, payload).await?))
}

/// Admin only.
pub async fn delete_quiz(
    State(catalog): State<QuizCatalog>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_path_id(&quiz_id, "Quiz")?;
    catalog.delete_quiz(quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Appends a question to the quiz.
/// Admin only.
pub async fn add_question(
    State(catalog): State<QuizCatalog>,
    Path(quiz_id): Path<String>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_path_id(&quiz_id, "Quiz")?;
    let question = catalog.add_question(quiz_id, payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Questions of a quiz without their answer keys. Public.
pub async fn list_questions(
    State(catalog): State<QuizCatalog>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_path_id(&quiz_id, "Quiz")?;
    Ok(Json(catalog.list_questions(quiz_id).await?))
}
