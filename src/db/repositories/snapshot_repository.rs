use rusqlite::Connection;
use tracing::debug;

use super::absence_repository::AbsenceRepository;
use super::commitment_repository::CommitmentRepository;
use super::organisation_repository::OrganisationRepository;
use super::person_repository::PersonRepository;
use super::project_repository::ProjectRepository;
use super::team_repository::TeamRepository;
use crate::error::{AppError, AppResult};
use crate::models::snapshot::OrganisationSnapshot;

pub struct SnapshotRepository;

impl SnapshotRepository {
    /// Reads everything the core needs for one organisation. Call inside a
    /// transaction when the snapshot must be consistent with a later write.
    pub fn load(conn: &Connection, organisation_id: &str) -> AppResult<OrganisationSnapshot> {
        let organisation = OrganisationRepository::find_by_id(conn, organisation_id)?
            .ok_or_else(|| AppError::not_found("organisation", organisation_id))?;

        let snapshot = OrganisationSnapshot {
            organisation,
            people: PersonRepository::list_by_organisation(conn, organisation_id)?,
            teams: TeamRepository::list_by_organisation(conn, organisation_id)?,
            projects: ProjectRepository::list_by_organisation(conn, organisation_id)?,
            commitments: CommitmentRepository::list_by_organisation(conn, organisation_id)?,
            absences: AbsenceRepository::list_by_organisation(conn, organisation_id)?,
        };

        debug!(
            target: "app::db",
            organisation_id,
            people = snapshot.people.len(),
            teams = snapshot.teams.len(),
            projects = snapshot.projects.len(),
            commitments = snapshot.commitments.len(),
            absences = snapshot.absences.len(),
            "snapshot loaded"
        );

        Ok(snapshot)
    }
}
