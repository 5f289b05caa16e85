use tracing::debug;

use crate::models::report::{CapacityReport, ReportRequest};

use super::{guarded, Access, AppState, CallerContext, CommandResult};

pub fn report_generate(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    request: ReportRequest,
) -> CommandResult<CapacityReport> {
    debug!(
        target: "app::command",
        organisation_id,
        scope = %request.scope,
        granularity = %request.granularity,
        "report_generate"
    );
    guarded(caller, organisation_id, Access::Read, || {
        state.reports().generate_report(organisation_id, &request)
    })
}
