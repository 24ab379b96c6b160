// src/handlers/progress.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::progress::ProgressEvent,
    services::ProgressLedger,
    utils::{access::Principal, json::AppJson},
};

/// Records a progress event for the caller. Repeated events for the same
/// item overwrite the stored record.
pub async fn record_progress(
    State(ledger): State<ProgressLedger>,
    Extension(principal): Extension<Principal>,
    AppJson(event): AppJson<ProgressEvent>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(ledger.record(principal.user_id, &event).await?))
}

pub async fn get_my_progress(
    State(ledger): State<ProgressLedger>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(ledger.for_user(principal.user_id).await?))
}
