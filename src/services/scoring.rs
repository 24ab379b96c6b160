// src/services/scoring.rs

use chrono::Utc;
use sqlx::{SqlitePool, types::Json};

use crate::{
    config::Config,
    error::AppError,
    models::{
        progress::{ItemType, ProgressEvent, ProgressStatus},
        quiz_result::{AnswerSet, QuizResult, SubmitAnswersResponse},
    },
    services::{
        catalog::{questions_for, quiz_exists, quiz_not_found},
        progress,
    },
};

const RESULT_COLUMNS: &str = "id, user_id, quiz_id, answers, score, possible_score, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub score: i64,
    pub possible_score: i64,
}

impl Score {
    /// `Passed` when the share of correct answers reaches `passing_percentage`.
    pub fn outcome(&self, passing_percentage: u8) -> ProgressStatus {
        if self.score * 100 >= self.possible_score * i64::from(passing_percentage) {
            ProgressStatus::Passed
        } else {
            ProgressStatus::Failed
        }
    }
}

/// Counts positions whose submitted option equals the answer key.
///
/// `answer_keys[i]` is the correct option of the question at position `i`.
/// Missing, negative and out-of-range answers simply do not match, and
/// positions past the last question are ignored.
pub fn score_answers(answer_keys: &[i64], answers: &AnswerSet) -> Score {
    let score = answer_keys
        .iter()
        .enumerate()
        .filter(|(position, key)| answers.get(position) == Some(*key))
        .count();

    Score {
        score: score as i64,
        possible_score: answer_keys.len() as i64,
    }
}

/// Scores submissions and records them.
#[derive(Clone)]
pub struct ScoringEngine {
    pool: SqlitePool,
    passing_score_percentage: u8,
}

impl ScoringEngine {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            passing_score_percentage: config.passing_score_percentage,
        }
    }

    /// Scores `answers` against the quiz and, in one transaction, appends a
    /// quiz result and upserts the user's progress for the quiz.
    pub async fn submit(
        &self,
        quiz_id: i64,
        user_id: i64,
        answers: AnswerSet,
    ) -> Result<SubmitAnswersResponse, AppError> {
        // Keys are read under the write lock; question edits wait for the commit.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        if !quiz_exists(&mut *tx, quiz_id).await? {
            return Err(quiz_not_found());
        }

        let answer_keys: Vec<i64> = questions_for(&mut *tx, quiz_id)
            .await?
            .into_iter()
            .map(|q| q.correct_answer_index)
            .collect();

        if answer_keys.is_empty() {
            return Err(AppError::NotFound("Quiz has no questions".to_string()));
        }

        let score = score_answers(&answer_keys, &answers);
        let status = score.outcome(self.passing_score_percentage);

        let result_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_results (user_id, quiz_id, answers, score, possible_score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .bind(Json(&answers))
        .bind(score.score)
        .bind(score.possible_score)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from_owned_write)?;

        let event = ProgressEvent {
            item_id: quiz_id.to_string(),
            item_type: ItemType::Quiz,
            status,
            score: Some(score.score),
            possible_score: Some(score.possible_score),
        };
        progress::upsert(&mut *tx, user_id, &event)
            .await
            .map_err(AppError::from_owned_write)?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            quiz_id,
            result_id,
            score = score.score,
            possible_score = score.possible_score,
            "Quiz submitted"
        );

        Ok(SubmitAnswersResponse {
            score: score.score,
            possible_score: score.possible_score,
            result_id,
            status,
        })
    }

    /// The user's own attempts, newest first.
    pub async fn results_for_user(&self, user_id: i64) -> Result<Vec<QuizResult>, AppError> {
        let results = sqlx::query_as::<_, QuizResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM quiz_results WHERE user_id = $1 ORDER BY id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    pub async fn all_results(&self) -> Result<Vec<QuizResult>, AppError> {
        let results = sqlx::query_as::<_, QuizResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM quiz_results ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
