use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    services::{ProgressLedger, QuizCatalog, ScoringEngine},
};

/// Shared handles; components are built from these on extraction, each with
/// the slice of configuration it needs.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuizCatalog {
    fn from_ref(state: &AppState) -> Self {
        QuizCatalog::new(state.pool.clone(), &state.config)
    }
}

impl FromRef<AppState> for ScoringEngine {
    fn from_ref(state: &AppState) -> Self {
        ScoringEngine::new(state.pool.clone(), &state.config)
    }
}

impl FromRef<AppState> for ProgressLedger {
    fn from_ref(state: &AppState) -> Self {
        ProgressLedger::new(state.pool.clone())
    }
}
