// tests/scoring_tests.rs

mod common;

use assessment::utils::access::Role;
use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn one_correct_answer_out_of_two() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, learner) = app.user_token(Role::User).await;
    let quiz_id = app.seed_quiz(&admin, &[1, 3]).await;

    let response = app
        .post(
            &format!("/api/quizzes/{quiz_id}/submit"),
            Some(&learner),
            json!({"answers": {"0": 1, "1": 2}}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["score"], 1);
    assert_eq!(result["possibleScore"], 2);
    assert_eq!(result["status"], "Failed");
    assert!(result["resultId"].as_i64().is_some());
}

#[tokio::test]
async fn empty_submission_scores_zero() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, learner) = app.user_token(Role::User).await;
    let quiz_id = app.seed_quiz(&admin, &[1, 3]).await;

    for body in [json!({"answers": {}}), json!({})] {
        let result: Value = app
            .post(&format!("/api/quizzes/{quiz_id}/submit"), Some(&learner), body)
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(result["score"], 0);
        assert_eq!(result["possibleScore"], 2);
    }
}

#[tokio::test]
async fn stray_answers_are_ignored_not_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, learner) = app.user_token(Role::User).await;
    let quiz_id = app.seed_quiz(&admin, &[1, 3]).await;

    let response = app
        .post(
            &format!("/api/quizzes/{quiz_id}/submit"),
            Some(&learner),
            json!({"answers": {"0": -4, "1": 3, "9": 1}}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["score"], 1);
    assert_eq!(result["possibleScore"], 2);
}

#[tokio::test]
async fn submission_requires_a_principal() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let quiz_id = app.seed_quiz(&admin, &[0]).await;

    let response = app
        .post(
            &format!("/api/quizzes/{quiz_id}/submit"),
            None,
            json!({"answers": {"0": 0}}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(app.count("quiz_results").await, 0);
}

#[tokio::test]
async fn missing_quiz_or_questions_is_not_found() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, learner) = app.user_token(Role::User).await;
    let empty_quiz = app.seed_quiz(&admin, &[]).await;

    for path in [
        "/api/quizzes/999/submit".to_string(),
        "/api/quizzes/not-a-quiz/submit".to_string(),
        format!("/api/quizzes/{empty_quiz}/submit"),
    ] {
        let response = app.post(&path, Some(&learner), json!({"answers": {}})).await;
        assert_eq!(response.status().as_u16(), 404, "{path}");
    }

    assert_eq!(app.count("quiz_results").await, 0);
    assert_eq!(app.count("user_progress").await, 0);
}

#[tokio::test]
async fn non_integer_answers_are_a_validation_error() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, learner) = app.user_token(Role::User).await;
    let quiz_id = app.seed_quiz(&admin, &[0]).await;

    let response = app
        .post(
            &format!("/api/quizzes/{quiz_id}/submit"),
            Some(&learner),
            json!({"answers": {"0": "A"}}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.json::<Value>().await.unwrap()["kind"], "validation_error");
}

#[tokio::test]
async fn submission_records_quiz_progress_in_the_same_step() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (user_id, learner) = app.user_token(Role::User).await;
    let quiz_id = app.seed_quiz(&admin, &[1, 3]).await;
    let submit = format!("/api/quizzes/{quiz_id}/submit");

    app.post(&submit, Some(&learner), json!({"answers": {"0": 0}})).await;

    let progress: Vec<Value> = app
        .get("/api/progress/me", Some(&learner))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0]["userId"], user_id);
    assert_eq!(progress[0]["itemId"], quiz_id.to_string());
    assert_eq!(progress[0]["itemType"], "Quiz");
    assert_eq!(progress[0]["status"], "Failed");
    assert_eq!(progress[0]["score"], 0);
    assert!(progress[0]["completedAt"].is_string());

    // Retake: a second result, the same single progress record.
    let retake: Value = app
        .post(&submit, Some(&learner), json!({"answers": {"0": 1, "1": 3}}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(retake["status"], "Passed");

    let progress: Vec<Value> = app
        .get("/api/progress/me", Some(&learner))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0]["status"], "Passed");
    assert_eq!(progress[0]["score"], 2);
    assert_eq!(progress[0]["possibleScore"], 2);
    assert_eq!(app.count("quiz_results").await, 2);
}

#[tokio::test]
async fn possible_score_is_fixed_at_submission_time() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, learner) = app.user_token(Role::User).await;
    let quiz_id = app.seed_quiz(&admin, &[0, 0]).await;
    let submit = format!("/api/quizzes/{quiz_id}/submit");

    app.post(&submit, Some(&learner), json!({"answers": {"0": 0}})).await;

    app.post(
        &format!("/api/quizzes/{quiz_id}/questions"),
        Some(&admin),
        json!({"text": "Third", "options": ["a", "b"], "correctAnswerIndex": 1}),
    )
    .await;

    let second: Value = app
        .post(&submit, Some(&learner), json!({"answers": {"0": 0}}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second["possibleScore"], 3);

    let results: Vec<Value> = app
        .get("/api/results/me", Some(&learner))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    // Newest first
    assert_eq!(results[0]["possibleScore"], 3);
    assert_eq!(results[1]["possibleScore"], 2);
    assert_eq!(results[1]["answers"], json!({"0": 0}));
}

#[tokio::test]
async fn results_are_private_except_to_admins() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (_, alice) = app.user_token(Role::User).await;
    let (_, bob) = app.user_token(Role::User).await;
    let quiz_id = app.seed_quiz(&admin, &[0]).await;

    app.post(
        &format!("/api/quizzes/{quiz_id}/submit"),
        Some(&alice),
        json!({"answers": {"0": 0}}),
    )
    .await;

    let bobs: Vec<Value> = app
        .get("/api/results/me", Some(&bob))
        .await
        .json()
        .await
        .unwrap();
    assert!(bobs.is_empty());

    let forbidden = app.get("/api/admin/results", Some(&bob)).await;
    assert_eq!(forbidden.status().as_u16(), 403);

    let all: Vec<Value> = app
        .get("/api/admin/results", Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["score"], 1);
}
