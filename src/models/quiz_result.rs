// src/models/quiz_result.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::models::progress::ProgressStatus;

/// Submitted answers: question position -> chosen option index.
/// Sparse; positions without an entry count as unanswered.
pub type AnswerSet = BTreeMap<usize, i64>;

/// Represents the 'quiz_results' table. Rows are never updated or deleted by
/// normal flows.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub answers: Json<AnswerSet>,
    pub score: i64,
    pub possible_score: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: AnswerSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersResponse {
    pub score: i64,
    pub possible_score: i64,
    pub result_id: i64,
    /// Passed or Failed, as recorded in the progress ledger.
    pub status: ProgressStatus,
}
