use std::fmt;

use tracing::info;

/// Lifecycle events emitted by the orchestrating services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryEvent {
    ReportGenerated,
    CommitmentCreated,
    CommitmentUpdated,
    CommitmentDeleted,
    AbsenceCreated,
    AbsenceDeleted,
}

impl TelemetryEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryEvent::ReportGenerated => "report_generated",
            TelemetryEvent::CommitmentCreated => "commitment_created",
            TelemetryEvent::CommitmentUpdated => "commitment_updated",
            TelemetryEvent::CommitmentDeleted => "commitment_deleted",
            TelemetryEvent::AbsenceCreated => "absence_created",
            TelemetryEvent::AbsenceDeleted => "absence_deleted",
        }
    }
}

impl fmt::Display for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget event sink. Implementations must not fail the caller.
pub trait Telemetry: Send + Sync {
    fn record(&self, event: TelemetryEvent, attributes: &[(&str, String)]);
}

/// Writes events to the `app::telemetry` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn record(&self, event: TelemetryEvent, attributes: &[(&str, String)]) {
        let rendered = attributes
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        info!(target: "app::telemetry", event = %event, attributes = %rendered, "telemetry event");
    }
}
