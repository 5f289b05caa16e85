use crate::models::absence::{AbsenceCreateInput, AbsenceRecord};

use super::{guarded, Access, AppState, CallerContext, CommandResult};

pub fn absence_create(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    payload: AbsenceCreateInput,
) -> CommandResult<AbsenceRecord> {
    guarded(caller, organisation_id, Access::Plan, || {
        state.absences().create_absence(organisation_id, payload)
    })
}

pub fn absence_delete(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
) -> CommandResult<()> {
    guarded(caller, organisation_id, Access::Plan, || {
        state.absences().delete_absence(organisation_id, id)
    })
}

pub fn absences_list(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
) -> CommandResult<Vec<AbsenceRecord>> {
    guarded(caller, organisation_id, Access::Read, || {
        state.absences().list_absences(organisation_id)
    })
}
