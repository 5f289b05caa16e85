use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::db::repositories::snapshot_repository::SnapshotRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::report::{CapacityReport, ReportRequest};
use crate::services::availability_engine::{calculate_report, validate_request};
use crate::services::telemetry::{Telemetry, TelemetryEvent};
use crate::utils::date_range::days_inclusive;

pub const DEFAULT_MAX_REPORT_DAYS: i64 = 3660;

#[derive(Clone)]
pub struct ReportService {
    db: DbPool,
    telemetry: Arc<dyn Telemetry>,
    max_report_days: i64,
}

impl ReportService {
    pub fn new(db: DbPool, telemetry: Arc<dyn Telemetry>, max_report_days: i64) -> Self {
        Self {
            db,
            telemetry,
            max_report_days,
        }
    }

    pub fn generate_report(
        &self,
        organisation_id: &str,
        request: &ReportRequest,
    ) -> AppResult<CapacityReport> {
        let validated = validate_request(request)?;
        let days = days_inclusive(validated.from, validated.to);
        if days > self.max_report_days {
            return Err(AppError::validation_with_details(
                "report range is too long",
                json!({"days": days, "maxDays": self.max_report_days}),
            ));
        }

        let snapshot = self
            .db
            .with_connection(|conn| SnapshotRepository::load(conn, organisation_id))?;
        let report = calculate_report(&snapshot, request)?;

        info!(
            target: "app::report",
            organisation_id,
            scope = %report.scope,
            granularity = %report.granularity,
            buckets = report.buckets.len(),
            "report generated"
        );
        self.telemetry.record(
            TelemetryEvent::ReportGenerated,
            &[
                ("organisationId", organisation_id.to_string()),
                ("scope", report.scope.to_string()),
                ("granularity", report.granularity.to_string()),
                ("days", days.to_string()),
                ("people", report.person_ids.len().to_string()),
            ],
        );

        Ok(report)
    }
}
