// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod progress;
pub mod quiz;
pub mod submission;

use crate::error::AppError;

/// Parses a raw path segment as an id. Anything that is not one is reported
/// the same way as an unknown id.
pub(crate) fn parse_path_id(raw: &str, entity: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("{entity} not found")))
}
