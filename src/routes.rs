// src/routes.rs

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    handlers::{admin, auth, progress, quiz, submission},
    state::AppState,
    utils::{
        access::Capability,
        jwt::{auth_middleware, require_capability},
    },
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Public catalog reads, authenticated learner routes and admin routes.
/// * Protected routes authenticate first, then check the capability, both
///   before the handler reads the body.
/// * Applies global middleware (Trace, CORS) and injects the state.
pub fn create_router(state: AppState) -> Router {
    let authenticated = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes))
        .route("/{quiz_id}", get(quiz::get_quiz))
        .route("/{quiz_id}/questions", get(quiz::list_questions))
        // Catalog authoring
        .merge(
            Router::new()
                .route("/", post(quiz::create_quiz))
                .route(
                    "/{quiz_id}",
                    put(quiz::update_quiz).delete(quiz::delete_quiz),
                )
                .route("/{quiz_id}/questions", post(quiz::add_question))
                .route_layer(middleware::from_fn(|req: Request, next: Next| {
                    require_capability(Capability::ManageCatalog, req, next)
                }))
                .route_layer(authenticated.clone()),
        )
        // Attempts
        .merge(
            Router::new()
                .route("/{quiz_id}/submit", post(submission::submit_answers))
                .route_layer(middleware::from_fn(|req: Request, next: Next| {
                    require_capability(Capability::SubmitAnswers, req, next)
                }))
                .route_layer(authenticated.clone()),
        );

    let result_routes = Router::new()
        .route("/me", get(submission::list_my_results))
        .route_layer(authenticated.clone());

    let progress_routes = Router::new()
        .route("/", post(progress::record_progress))
        .route("/me", get(progress::get_my_progress))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_capability(Capability::RecordProgress, req, next)
        }))
        .route_layer(authenticated.clone());

    let admin_routes = Router::new()
        .route(
            "/quizzes/{quiz_id}/questions",
            get(admin::list_questions_with_answers),
        )
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_capability(Capability::ManageCatalog, req, next)
        }))
        .merge(
            Router::new()
                .route("/results", get(admin::list_all_results))
                .route_layer(middleware::from_fn(|req: Request, next: Next| {
                    require_capability(Capability::ReadAllResults, req, next)
                })),
        )
        // Auth first, then the capability check
        .route_layer(authenticated);

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/results", result_routes)
        .nest("/api/progress", progress_routes)
        .nest("/api/admin", admin_routes)
        .fallback(|| async { AppError::NotFound("Route not found".to_string()) })
        // Global Middleware (outermost first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
