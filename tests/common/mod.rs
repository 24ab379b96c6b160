// tests/common/mod.rs

#![allow(dead_code)]

use std::time::Duration;

use assessment::{
    config::{Config, QuizDeletePolicy},
    db, routes,
    state::AppState,
    utils::{
        access::{Principal, Role},
        jwt::sign_jwt,
    },
};
use serde_json::{Value, json};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
    _db_dir: TempDir,
}

pub fn test_config(policy: QuizDeletePolicy) -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        admin_username: None,
        admin_password: None,
        quiz_delete_policy: policy,
        passing_score_percentage: 60,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(QuizDeletePolicy::Orphan)).await
}

/// Spawns the app on a random port over a private database file.
///
/// The pool holds several connections, so concurrent requests reach storage in
/// parallel.
pub async fn spawn_app_with(mut config: Config) -> TestApp {
    let db_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = db_dir.path().join("assessment.db");
    config.database_url = format!("sqlite://{}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .expect("Failed to open SQLite database");

    db::migrate(&pool).await.expect("Failed to migrate database");

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
        _db_dir: db_dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Inserts a user directly and mints a token for it, skipping the
    /// password round trip.
    pub async fn user_token(&self, role: Role) -> (i64, String) {
        let username = format!("u_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, password, role, created_at) VALUES ($1, 'unused', $2, $3) RETURNING id",
        )
        .bind(&username)
        .bind(role.as_str())
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await
        .unwrap();

        let principal = Principal {
            user_id: id,
            username,
            role,
        };
        (id, sign_jwt(&principal, JWT_SECRET, 600).unwrap())
    }

    pub async fn admin_token(&self) -> String {
        self.user_token(Role::Admin).await.1
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut req = self.client.put(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut req = self.client.delete(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.expect("Failed to execute request")
    }

    /// Creates a quiz with one question per answer key; returns the quiz id.
    pub async fn seed_quiz(&self, admin: &str, answer_keys: &[i64]) -> i64 {
        let quiz: Value = self
            .post(
                "/api/quizzes",
                Some(admin),
                json!({
                    "title": "Number sense",
                    "description": "Warm-up",
                    "category": "Mathematics",
                    "difficulty": "Beginner"
                }),
            )
            .await
            .json()
            .await
            .unwrap();
        let quiz_id = quiz["id"].as_i64().unwrap();

        for (i, key) in answer_keys.iter().enumerate() {
            let resp = self
                .post(
                    &format!("/api/quizzes/{quiz_id}/questions"),
                    Some(admin),
                    json!({
                        "text": format!("Question {i}"),
                        "options": ["A", "B", "C", "D"],
                        "correctAnswerIndex": key
                    }),
                )
                .await;
            assert_eq!(resp.status().as_u16(), 201);
        }

        quiz_id
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
