use crate::models::organisation::{
    OrganisationCreateInput, OrganisationRecord, OrganisationUpdateInput,
};
use crate::models::person::{PersonCreateInput, PersonRecord, PersonUpdateInput};
use crate::models::project::{ProjectCreateInput, ProjectRecord, ProjectUpdateInput};
use crate::models::team::{TeamCreateInput, TeamRecord, TeamUpdateInput};

use super::{guarded, Access, AppState, CallerContext, CommandError, CommandResult};

/// Creating an organisation is not scoped to an existing one; any admin may.
pub fn organisation_create(
    state: &AppState,
    caller: &CallerContext,
    payload: OrganisationCreateInput,
) -> CommandResult<OrganisationRecord> {
    caller.authorize_global(Access::Administer)?;
    state
        .directory()
        .create_organisation(payload)
        .map_err(CommandError::from)
}

pub fn organisation_get(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
) -> CommandResult<OrganisationRecord> {
    guarded(caller, organisation_id, Access::Read, || {
        state.directory().get_organisation(organisation_id)
    })
}

pub fn organisation_update(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    payload: OrganisationUpdateInput,
) -> CommandResult<OrganisationRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().update_organisation(organisation_id, payload)
    })
}

pub fn organisation_delete(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
) -> CommandResult<()> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().delete_organisation(organisation_id)
    })
}

pub fn person_create(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    payload: PersonCreateInput,
) -> CommandResult<PersonRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().create_person(organisation_id, payload)
    })
}

pub fn person_update(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
    payload: PersonUpdateInput,
) -> CommandResult<PersonRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().update_person(organisation_id, id, payload)
    })
}

pub fn person_delete(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
) -> CommandResult<()> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().delete_person(organisation_id, id)
    })
}

pub fn people_list(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
) -> CommandResult<Vec<PersonRecord>> {
    guarded(caller, organisation_id, Access::Read, || {
        state.directory().list_people(organisation_id)
    })
}

pub fn team_create(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    payload: TeamCreateInput,
) -> CommandResult<TeamRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().create_team(organisation_id, payload)
    })
}

pub fn team_update(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
    payload: TeamUpdateInput,
) -> CommandResult<TeamRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().update_team(organisation_id, id, payload)
    })
}

pub fn team_member_add(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    team_id: &str,
    person_id: &str,
) -> CommandResult<TeamRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state
            .directory()
            .add_team_member(organisation_id, team_id, person_id)
    })
}

pub fn team_member_remove(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    team_id: &str,
    person_id: &str,
) -> CommandResult<TeamRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state
            .directory()
            .remove_team_member(organisation_id, team_id, person_id)
    })
}

pub fn team_delete(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
) -> CommandResult<()> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().delete_team(organisation_id, id)
    })
}

pub fn teams_list(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
) -> CommandResult<Vec<TeamRecord>> {
    guarded(caller, organisation_id, Access::Read, || {
        state.directory().list_teams(organisation_id)
    })
}

pub fn project_create(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    payload: ProjectCreateInput,
) -> CommandResult<ProjectRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().create_project(organisation_id, payload)
    })
}

pub fn project_update(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
    payload: ProjectUpdateInput,
) -> CommandResult<ProjectRecord> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().update_project(organisation_id, id, payload)
    })
}

pub fn project_delete(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
    id: &str,
) -> CommandResult<()> {
    guarded(caller, organisation_id, Access::Administer, || {
        state.directory().delete_project(organisation_id, id)
    })
}

pub fn projects_list(
    state: &AppState,
    caller: &CallerContext,
    organisation_id: &str,
) -> CommandResult<Vec<ProjectRecord>> {
    guarded(caller, organisation_id, Access::Read, || {
        state.directory().list_projects(organisation_id)
    })
}
