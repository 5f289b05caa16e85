pub mod absence;
pub mod auth;
pub mod commitment;
pub mod directory;
pub mod report;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::error;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::absence_service::AbsenceService;
use crate::services::commitment_service::{CommitmentService, OrganisationLocks};
use crate::services::directory_service::DirectoryService;
use crate::services::report_service::ReportService;
use crate::services::telemetry::{Telemetry, TracingTelemetry};

pub use auth::{Access, CallerContext, Role};

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    db_pool: DbPool,
    report_service: Arc<ReportService>,
    commitment_service: Arc<CommitmentService>,
    directory_service: Arc<DirectoryService>,
    absence_service: Arc<AbsenceService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let db_pool = DbPool::new(config.database_path.clone())?;
        Ok(Self::with_telemetry(config, db_pool, Arc::new(TracingTelemetry)))
    }

    pub fn with_telemetry(
        config: AppConfig,
        db_pool: DbPool,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        let locks = Arc::new(OrganisationLocks::new());
        let report_service = Arc::new(ReportService::new(
            db_pool.clone(),
            Arc::clone(&telemetry),
            config.max_report_days,
        ));
        let commitment_service = Arc::new(CommitmentService::new(
            db_pool.clone(),
            locks,
            Arc::clone(&telemetry),
        ));
        let directory_service = Arc::new(DirectoryService::new(db_pool.clone()));
        let absence_service = Arc::new(AbsenceService::new(db_pool.clone(), telemetry));

        Self {
            config: Arc::new(config),
            db_pool,
            report_service,
            commitment_service,
            directory_service,
            absence_service,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn commitments(&self) -> Arc<CommitmentService> {
        Arc::clone(&self.commitment_service)
    }

    pub fn directory(&self) -> Arc<DirectoryService> {
        Arc::clone(&self.directory_service)
    }

    pub fn absences(&self) -> Arc<AbsenceService> {
        Arc::clone(&self.absence_service)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation {
                message, details, ..
            } => CommandError::new("VALIDATION_ERROR", message, details),
            AppError::NotFound { entity, id } => CommandError::new(
                "NOT_FOUND",
                format!("{entity} not found"),
                Some(json!({"entity": entity, "id": id})),
            ),
            AppError::Forbidden { message } => CommandError::new("FORBIDDEN", message, None),
            AppError::Conflict { message } => CommandError::new("CONFLICT", message, None),
            AppError::Database { message } => {
                error!(target: "app::command", %message, "database error in command");
                CommandError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "file system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

/// Authorizes, then runs `call` with its error mapped for the caller.
fn guarded<T>(
    caller: &CallerContext,
    organisation_id: &str,
    access: Access,
    call: impl FnOnce() -> AppResult<T>,
) -> CommandResult<T> {
    caller.authorize(organisation_id, access)?;
    call().map_err(CommandError::from)
}
