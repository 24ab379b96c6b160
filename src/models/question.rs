// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::{Validate, ValidationError};

use crate::{error::AppError, models::quiz::validate_not_blank};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// Owning quiz. Plain id reference, see `QuizDeletePolicy`.
    pub quiz_id: i64,

    pub text: String,

    /// Ordered answer choices, stored as a JSON array.
    pub options: Json<Vec<String>>,

    /// Zero-based index into `options`.
    pub correct_answer_index: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for sending a question to learners. Carries no answer key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: i64,
    pub quiz_id: i64,
    /// Zero-based position inside the quiz; answers are keyed by it.
    pub position: usize,
    pub text: String,
    pub options: Vec<String>,
}

impl PublicQuestion {
    pub fn from_question(question: Question, position: usize) -> Self {
        Self {
            id: question.id,
            quiz_id: question.quiz_id,
            position,
            text: question.text,
            options: question.options.0,
        }
    }
}

/// DTO for appending a question to a quiz.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(max = 1000), custom(function = validate_not_blank))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub correct_answer_index: i64,
}

impl CreateQuestionRequest {
    /// Field validation plus the cross-field answer-key check.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        check_answer_key(self.options.len(), self.correct_answer_index)
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[validate(length(max = 1000), custom(function = validate_not_blank))]
    pub text: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Option<Vec<String>>,
    pub correct_answer_index: Option<i64>,
}

fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() < 2 {
        return Err(ValidationError::new("too_few_options")
            .with_message("Question must have at least two choices".into()));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(ValidationError::new("option_blank")
                .with_message("Choices must not be blank".into()));
        }
        if opt.len() > 500 {
            return Err(ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// 0 <= index < option_count.
pub fn check_answer_key(option_count: usize, index: i64) -> Result<(), AppError> {
    match usize::try_from(index) {
        Ok(i) if i < option_count => Ok(()),
        _ => Err(AppError::Validation(format!(
            "correctAnswerIndex {index} is out of range for {option_count} choices"
        ))),
    }
}
