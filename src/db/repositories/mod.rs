use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult};

pub mod absence_repository;
pub mod commitment_repository;
pub mod organisation_repository;
pub mod person_repository;
pub mod project_repository;
pub mod snapshot_repository;
pub mod team_repository;

fn serialize_json<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value).map_err(|e| AppError::Database {
        message: format!("JSON serialization error: {e}"),
    })
}

fn deserialize_json<T: DeserializeOwned>(column: &str, raw: &str) -> AppResult<T> {
    if raw.trim().is_empty() {
        return serde_json::from_str("[]").map_err(AppError::from);
    }
    serde_json::from_str(raw).map_err(|e| AppError::Database {
        message: format!("JSON deserialization error in {column}: {e}"),
    })
}
