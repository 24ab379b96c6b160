// src/services/catalog.rs

use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool, types::Json};
use validator::Validate;

use crate::{
    config::{Config, QuizDeletePolicy},
    error::AppError,
    models::{
        question::{
            CreateQuestionRequest, PublicQuestion, Question, UpdateQuestionRequest,
            check_answer_key,
        },
        quiz::{CreateQuizRequest, Quiz, QuizSummary, UpdateQuizRequest},
    },
};

const QUIZ_COLUMNS: &str =
    "id, title, description, category, difficulty, lesson_id, created_at, updated_at";
const QUESTION_COLUMNS: &str = "id, quiz_id, text, options, correct_answer_index, created_at";

/// Owns quizzes and their questions.
#[derive(Clone)]
pub struct QuizCatalog {
    pool: SqlitePool,
    delete_policy: QuizDeletePolicy,
}

impl QuizCatalog {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            delete_policy: config.quiz_delete_policy,
        }
    }

    pub async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, AppError> {
        let quizzes = sqlx::query_as::<_, QuizSummary>(
            "SELECT id, title, description, category, difficulty FROM quizzes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    pub async fn get_quiz(&self, id: i64) -> Result<Quiz, AppError> {
        sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(quiz_not_found)
    }

    pub async fn create_quiz(&self, req: CreateQuizRequest) -> Result<Quiz, AppError> {
        req.validate()?;
        let now = Utc::now();

        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            r#"
            INSERT INTO quizzes (title, description, category, difficulty, lesson_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.category)
        .bind(req.difficulty.as_str())
        .bind(req.lesson_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::from(e)
        })?;

        tracing::info!(quiz_id = quiz.id, "Quiz created");
        Ok(quiz)
    }

    pub async fn update_quiz(&self, id: i64, req: UpdateQuizRequest) -> Result<Quiz, AppError> {
        req.validate()?;

        if req.is_empty() {
            return self.get_quiz(id).await;
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE quizzes SET ");
        let mut separated = builder.separated(", ");

        if let Some(title) = req.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }

        if let Some(description) = req.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }

        if let Some(category) = req.category {
            separated.push("category = ");
            separated.push_bind_unseparated(category);
        }

        if let Some(difficulty) = req.difficulty {
            separated.push("difficulty = ");
            separated.push_bind_unseparated(difficulty.as_str());
        }

        if let Some(lesson_id) = req.lesson_id {
            separated.push("lesson_id = ");
            separated.push_bind_unseparated(lesson_id);
        }

        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to update quiz: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(quiz_not_found());
        }

        self.get_quiz(id).await
    }

    /// Deletes the quiz; questions and results follow the configured policy.
    pub async fn delete_quiz(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(quiz_not_found());
        }

        if self.delete_policy == QuizDeletePolicy::Cascade {
            let questions = sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let results = sqlx::query("DELETE FROM quiz_results WHERE quiz_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tracing::info!(
                quiz_id = id,
                questions = questions.rows_affected(),
                results = results.rows_affected(),
                "Cascaded quiz deletion"
            );
        }

        tx.commit().await?;
        tracing::info!(quiz_id = id, policy = ?self.delete_policy, "Quiz deleted");
        Ok(())
    }

    /// Appends a question. Input is validated before the quiz lookup.
    pub async fn add_question(
        &self,
        quiz_id: i64,
        req: CreateQuestionRequest,
    ) -> Result<PublicQuestion, AppError> {
        req.check()?;

        self.ensure_quiz_exists(quiz_id).await?;

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions (quiz_id, text, options, correct_answer_index, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(quiz_id)
        .bind(&req.text)
        .bind(Json(&req.options))
        .bind(req.correct_answer_index)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create question: {:?}", e);
            AppError::from(e)
        })?;

        let position: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = $1 AND id < $2")
                .bind(quiz_id)
                .bind(question.id)
                .fetch_one(&self.pool)
                .await?;

        Ok(PublicQuestion::from_question(question, position as usize))
    }

    /// Questions in catalog order, answer keys stripped.
    pub async fn list_questions(&self, quiz_id: i64) -> Result<Vec<PublicQuestion>, AppError> {
        let questions = self.list_questions_with_answers(quiz_id).await?;

        Ok(questions
            .into_iter()
            .enumerate()
            .map(|(position, q)| PublicQuestion::from_question(q, position))
            .collect())
    }

    /// Questions including `correctAnswerIndex`. Admin routes only.
    pub async fn list_questions_with_answers(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<Question>, AppError> {
        self.ensure_quiz_exists(quiz_id).await?;
        Ok(questions_for(&self.pool, quiz_id).await?)
    }

    /// Applies a partial update. The write only lands while the quiz has no
    /// results.
    pub async fn update_question(
        &self,
        id: i64,
        req: UpdateQuestionRequest,
    ) -> Result<Question, AppError> {
        req.validate()?;

        let current = self.get_question(id).await?;

        let text = req.text.unwrap_or(current.text);
        let options = req.options.unwrap_or(current.options.0);
        let correct_answer_index = req
            .correct_answer_index
            .unwrap_or(current.correct_answer_index);
        check_answer_key(options.len(), correct_answer_index)?;

        let updated = sqlx::query_as::<_, Question>(&format!(
            r#"
            UPDATE questions SET text = $1, options = $2, correct_answer_index = $3
            WHERE id = $4
              AND NOT EXISTS (SELECT 1 FROM quiz_results WHERE quiz_id = questions.quiz_id)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(text)
        .bind(Json(options))
        .bind(correct_answer_index)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update question: {:?}", e);
            AppError::from(e)
        })?;

        match updated {
            Some(question) => Ok(question),
            None => Err(self.write_refused(id).await),
        }
    }

    pub async fn delete_question(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM questions
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM quiz_results WHERE quiz_id = questions.quiz_id)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(self.write_refused(id).await);
        }

        tracing::info!(question_id = id, "Question deleted");
        Ok(())
    }

    async fn get_question(&self, id: i64) -> Result<Question, AppError> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(question_not_found)
    }

    async fn ensure_quiz_exists(&self, quiz_id: i64) -> Result<(), AppError> {
        quiz_exists(&self.pool, quiz_id)
            .await?
            .then_some(())
            .ok_or_else(quiz_not_found)
    }

    /// Explains a guarded write that touched no row: the question is gone,
    /// or its quiz has results and its questions are frozen.
    async fn write_refused(&self, id: i64) -> AppError {
        match self.get_question(id).await {
            Ok(_) => AppError::Conflict(
                "Question is part of submitted quiz results and can no longer change".to_string(),
            ),
            Err(e) => e,
        }
    }
}

pub(crate) async fn quiz_exists<'e, E>(executor: E, quiz_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .fetch_optional(executor)
        .await?;

    Ok(found.is_some())
}

/// All questions of a quiz in natural catalog order (ascending id).
pub(crate) async fn questions_for<'e, E>(
    executor: E,
    quiz_id: i64,
) -> Result<Vec<Question>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY id"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub(crate) fn quiz_not_found() -> AppError {
    AppError::NotFound("Quiz not found".to_string())
}

fn question_not_found() -> AppError {
    AppError::NotFound("Question not found".to_string())
}
