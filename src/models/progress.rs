// src/models/progress.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Kind of item a progress record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Lesson,
    Quiz,
    Game,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Lesson => "Lesson",
            ItemType::Quiz => "Quiz",
            ItemType::Game => "Game",
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Lesson" => Ok(ItemType::Lesson),
            "Quiz" => Ok(ItemType::Quiz),
            "Game" => Ok(ItemType::Game),
            _ => Err(format!("unknown item type '{value}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    Started,
    Completed,
    Passed,
    Failed,
}

impl ProgressStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::Started => "Started",
            ProgressStatus::Completed => "Completed",
            ProgressStatus::Passed => "Passed",
            ProgressStatus::Failed => "Failed",
        }
    }

    /// Whether reaching this status stamps a completion time.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProgressStatus::Started)
    }
}

impl TryFrom<String> for ProgressStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Started" => Ok(ProgressStatus::Started),
            "Completed" => Ok(ProgressStatus::Completed),
            "Passed" => Ok(ProgressStatus::Passed),
            "Failed" => Ok(ProgressStatus::Failed),
            _ => Err(format!("unknown progress status '{value}'")),
        }
    }
}

/// Represents the 'user_progress' table. One row per (user, item, item type).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: i64,
    pub user_id: i64,
    pub item_id: String,
    #[sqlx(try_from = "String")]
    pub item_type: ItemType,
    #[sqlx(try_from = "String")]
    pub status: ProgressStatus,
    pub score: Option<i64>,
    pub possible_score: Option<i64>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A progress event as posted by lesson, game and quiz flows.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_scores))]
pub struct ProgressEvent {
    #[validate(length(min = 1, max = 100))]
    pub item_id: String,
    pub item_type: ItemType,
    pub status: ProgressStatus,
    #[validate(range(min = 0))]
    pub score: Option<i64>,
    #[validate(range(min = 0))]
    pub possible_score: Option<i64>,
}

fn validate_scores(event: &ProgressEvent) -> Result<(), ValidationError> {
    if let (Some(score), Some(possible)) = (event.score, event.possible_score) {
        if score > possible {
            return Err(ValidationError::new("score_exceeds_possible")
                .with_message("score must not exceed possibleScore".into()));
        }
    }
    Ok(())
}
