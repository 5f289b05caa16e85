use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::db::repositories::commitment_repository::CommitmentRepository;
use crate::db::repositories::snapshot_repository::SnapshotRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::commitment::{
    CommitmentCreateInput, CommitmentRecord, CommitmentTarget, CommitmentTargetKind,
    CommitmentUpdateInput,
};
use crate::models::snapshot::OrganisationSnapshot;
use crate::services::commitment_limit::validate_commitment_limit;
use crate::services::commitment_resolver::ensure_commitment_percentage;
use crate::services::snapshot_index::SnapshotIndex;
use crate::services::telemetry::{Telemetry, TelemetryEvent};
use crate::utils::date_range::resolve_open_range;

/// One exclusive lock per organisation so that reading the commitment set,
/// validating and writing happen as one step.
#[derive(Debug, Default)]
pub struct OrganisationLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OrganisationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, organisation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(organisation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Runs `callback` while holding the organisation's lock.
    pub fn with_lock<T>(&self, organisation_id: &str, callback: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(organisation_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        callback()
    }
}

#[derive(Clone)]
pub struct CommitmentService {
    db: DbPool,
    locks: Arc<OrganisationLocks>,
    telemetry: Arc<dyn Telemetry>,
}

impl CommitmentService {
    pub fn new(db: DbPool, locks: Arc<OrganisationLocks>, telemetry: Arc<dyn Telemetry>) -> Self {
        Self {
            db,
            locks,
            telemetry,
        }
    }

    pub fn create_commitment(
        &self,
        organisation_id: &str,
        input: CommitmentCreateInput,
    ) -> AppResult<CommitmentRecord> {
        let target = CommitmentTarget::from_fields(
            input.target_type.as_deref(),
            input.target_id.as_deref(),
            input.person_id.as_deref(),
        )
        .map_err(AppError::validation)?;

        let record = CommitmentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            organisation_id: organisation_id.to_string(),
            target,
            project_id: input.project_id,
            start_date: input.start_date.unwrap_or_default(),
            end_date: input.end_date.unwrap_or_default(),
            percentage: input.percentage,
        };
        validate_record(&record)?;

        self.locks.with_lock(organisation_id, || {
            self.db.with_transaction(|tx| {
                let snapshot = SnapshotRepository::load(tx, organisation_id)?;
                check_against_snapshot(&record, &snapshot)?;
                CommitmentRepository::insert(tx, &record)
            })
        })?;

        info!(
            target: "app::commitment",
            commitment_id = %record.id,
            organisation_id,
            commitment_target = %record.target,
            "commitment created"
        );
        self.telemetry
            .record(TelemetryEvent::CommitmentCreated, &attributes(&record));
        Ok(record)
    }

    pub fn update_commitment(
        &self,
        organisation_id: &str,
        id: &str,
        update: CommitmentUpdateInput,
    ) -> AppResult<CommitmentRecord> {
        let updated = self.locks.with_lock(organisation_id, || {
            self.db.with_transaction(|tx| {
                let snapshot = SnapshotRepository::load(tx, organisation_id)?;
                let existing = snapshot
                    .commitments
                    .iter()
                    .find(|commitment| commitment.id == id)
                    .ok_or_else(|| AppError::not_found("commitment", id))?;

                let mut record = existing.clone();
                apply_update(&mut record, update)?;
                validate_record(&record)?;
                check_against_snapshot(&record, &snapshot)?;
                CommitmentRepository::update(tx, &record)?;
                Ok(record)
            })
        })?;

        info!(
            target: "app::commitment",
            commitment_id = %updated.id,
            organisation_id,
            "commitment updated"
        );
        self.telemetry
            .record(TelemetryEvent::CommitmentUpdated, &attributes(&updated));
        Ok(updated)
    }

    pub fn delete_commitment(&self, organisation_id: &str, id: &str) -> AppResult<()> {
        let deleted = self.locks.with_lock(organisation_id, || {
            self.db
                .with_connection(|conn| CommitmentRepository::delete(conn, organisation_id, id))
        })?;
        if !deleted {
            return Err(AppError::not_found("commitment", id));
        }

        info!(target: "app::commitment", commitment_id = %id, organisation_id, "commitment deleted");
        self.telemetry.record(
            TelemetryEvent::CommitmentDeleted,
            &[
                ("organisationId", organisation_id.to_string()),
                ("commitmentId", id.to_string()),
            ],
        );
        Ok(())
    }

    pub fn get_commitment(&self, organisation_id: &str, id: &str) -> AppResult<CommitmentRecord> {
        let record = self
            .db
            .with_connection(|conn| CommitmentRepository::find_by_id(conn, organisation_id, id))?
            .ok_or_else(|| AppError::not_found("commitment", id))?;
        debug!(target: "app::commitment", commitment_id = %record.id, "commitment fetched");
        Ok(record)
    }

    pub fn list_commitments(&self, organisation_id: &str) -> AppResult<Vec<CommitmentRecord>> {
        self.db
            .with_connection(|conn| CommitmentRepository::list_by_organisation(conn, organisation_id))
    }

    pub fn list_project_commitments(
        &self,
        organisation_id: &str,
        project_id: &str,
    ) -> AppResult<Vec<CommitmentRecord>> {
        self.db.with_connection(|conn| {
            CommitmentRepository::list_by_project(conn, organisation_id, project_id)
        })
    }
}

fn validate_record(record: &CommitmentRecord) -> AppResult<()> {
    if record.project_id.trim().is_empty() {
        return Err(AppError::validation("commitment project id is required"));
    }
    ensure_commitment_percentage(record.percentage)?;
    resolve_open_range(&record.start_date, &record.end_date)?;
    Ok(())
}

/// Referenced project and target must exist, then the daily ceiling must hold
/// against everything already stored.
fn check_against_snapshot(
    record: &CommitmentRecord,
    snapshot: &OrganisationSnapshot,
) -> AppResult<()> {
    if !snapshot
        .projects
        .iter()
        .any(|project| project.id == record.project_id)
    {
        return Err(AppError::not_found("project", record.project_id.as_str()));
    }

    let index = SnapshotIndex::new(snapshot);
    match &record.target {
        CommitmentTarget::Person(person_id) if !index.has_person(person_id) => {
            return Err(AppError::not_found("person", person_id.as_str()));
        }
        CommitmentTarget::Team(team_id) if !index.has_team(team_id) => {
            return Err(AppError::not_found("team", team_id.as_str()));
        }
        _ => {}
    }

    validate_commitment_limit(record, &snapshot.commitments, &snapshot.organisation, &index)
}

fn apply_update(record: &mut CommitmentRecord, update: CommitmentUpdateInput) -> AppResult<()> {
    if update.target_type.is_some() || update.target_id.is_some() {
        let kind = match update.target_type.as_deref() {
            Some(value) => {
                CommitmentTargetKind::try_from(value.trim()).map_err(AppError::validation)?
            }
            None => record.target.kind(),
        };
        let target_id = match update.target_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            Some(_) => return Err(AppError::validation("commitment target id is required")),
            None if kind == record.target.kind() => record.target.id().to_string(),
            None => {
                return Err(AppError::validation(
                    "commitment target id is required when changing the target type",
                ))
            }
        };
        record.target = kind.with_id(target_id);
    }

    if let Some(project_id) = update.project_id {
        record.project_id = project_id;
    }
    if let Some(start_date) = update.start_date {
        record.start_date = start_date;
    }
    if let Some(end_date) = update.end_date {
        record.end_date = end_date;
    }
    if let Some(percentage) = update.percentage {
        record.percentage = percentage;
    }
    Ok(())
}

fn attributes(record: &CommitmentRecord) -> Vec<(&'static str, String)> {
    vec![
        ("organisationId", record.organisation_id.clone()),
        ("commitmentId", record.id.clone()),
        ("projectId", record.project_id.clone()),
        ("target", record.target.to_string()),
        ("percentage", record.percentage.to_string()),
    ]
}
