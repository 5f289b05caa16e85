use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::report_service::DEFAULT_MAX_REPORT_DAYS;
use crate::utils::logger::LoggingConfig;

pub const ENV_DATABASE_PATH: &str = "CAPAPLAN_DATABASE_PATH";
pub const ENV_LOG: &str = "CAPAPLAN_LOG";
pub const ENV_LOG_DIR: &str = "CAPAPLAN_LOG_DIR";
pub const ENV_MAX_REPORT_DAYS: &str = "CAPAPLAN_MAX_REPORT_DAYS";

const DEFAULT_DATABASE_PATH: &str = "capaplan.sqlite";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub logging: LoggingConfig,
    /// Longest report range, in days, a single request may ask for.
    pub max_report_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            logging: LoggingConfig::default(),
            max_report_days: DEFAULT_MAX_REPORT_DAYS,
        }
    }
}

impl AppConfig {
    /// Reads the optional YAML file, applies environment overrides and
    /// validates the result.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&raw)?;
        debug!(target: "app::config", path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
            .map_err(|err| AppError::validation_with_source("invalid configuration file", err))
    }

    /// Applies overrides looked up by `lookup`; the environment in production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(directives) = lookup(ENV_LOG) {
            self.logging.directives = directives;
        }
        if let Some(directory) = lookup(ENV_LOG_DIR) {
            self.logging.directory = Some(PathBuf::from(directory));
        }
        if let Some(days) = lookup(ENV_MAX_REPORT_DAYS) {
            self.max_report_days = days.trim().parse().map_err(|err| {
                AppError::validation_with_source(format!("{ENV_MAX_REPORT_DAYS} must be an integer"), err)
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.max_report_days <= 0 {
            return Err(AppError::validation("maxReportDays must be positive"));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(AppError::validation("databasePath must not be empty"));
        }
        Ok(())
    }
}
