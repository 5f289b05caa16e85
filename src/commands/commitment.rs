use crate::models::commitment::{CommitmentCreateInput, CommitmentRecord, CommitmentUpdateInput};

use super::{guarded, Access, AppState, CallerContext, CommandResult};

pub fn commitment_create(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    payload: CommitmentCreateInput,
) -> CommandResult<CommitmentRecord> {
    guarded(caller, organisation_id, Access::Plan, || {
        state.commitments().create_commitment(organisation_id, payload)
    })
}

pub fn commitment_update(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
    payload: CommitmentUpdateInput,
) -> CommandResult<CommitmentRecord> {
    guarded(caller, organisation_id, Access::Plan, || {
        state.commitments().update_commitment(organisation_id, id, payload)
    })
}

pub fn commitment_delete(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
) -> CommandResult<()> {
    guarded(caller, organisation_id, Access::Plan, || {
        state.commitments().delete_commitment(organisation_id, id)
    })
}

pub fn commitment_get(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
) -> CommandResult<CommitmentRecord> {
    guarded(caller, organisation_id, Access::Read, || {
        state.commitments().get_commitment(organisation_id, id)
    })
}

/// Lists the organisation's commitments, optionally narrowed to one project.
pub fn commitments_list(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    project_id: Option<&str>,
) -> CommandResult<Vec<CommitmentRecord>> {
    guarded(caller, organisation_id, Access::Read, || match project_id {
        Some(project_id) => state
            .commitments()
            .list_project_commitments(organisation_id, project_id),
        None => state.commitments().list_commitments(organisation_id),
    })
}
