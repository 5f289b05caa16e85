use std::sync::Arc;

use tracing::info;

use crate::db::repositories::absence_repository::AbsenceRepository;
use crate::db::repositories::organisation_repository::OrganisationRepository;
use crate::db::repositories::person_repository::PersonRepository;
use crate::db::repositories::team_repository::TeamRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::absence::{AbsenceCreateInput, AbsenceRecord, AbsenceScope};
use crate::services::employment_timeline::employment_percent_on_date;
use crate::services::telemetry::{Telemetry, TelemetryEvent};
use crate::utils::date_range::parse_date;

#[derive(Clone)]
pub struct AbsenceService {
    db: DbPool,
    telemetry: Arc<dyn Telemetry>,
}

impl AbsenceService {
    pub fn new(db: DbPool, telemetry: Arc<dyn Telemetry>) -> Self {
        Self { db, telemetry }
    }

    /// Records a holiday, team absence or person absence. Person absences may
    /// not exceed the person's capacity for that date.
    pub fn create_absence(
        &self,
        organisation_id: &str,
        input: AbsenceCreateInput,
    ) -> AppResult<AbsenceRecord> {
        if !input.hours.is_finite() || input.hours <= 0.0 {
            return Err(AppError::validation("absence hours must be a positive number"));
        }
        let date = parse_date(&input.date)?;

        let record = AbsenceRecord {
            id: uuid::Uuid::new_v4().to_string(),
            organisation_id: organisation_id.to_string(),
            scope: input.scope,
            date: input.date,
            hours: input.hours,
        };

        self.db.with_transaction(|tx| {
            let organisation = OrganisationRepository::find_by_id(tx, organisation_id)?
                .ok_or_else(|| AppError::not_found("organisation", organisation_id))?;

            match &record.scope {
                AbsenceScope::Organisation => AbsenceRepository::insert(tx, &record),
                AbsenceScope::Team(team_id) => {
                    TeamRepository::find_by_id(tx, organisation_id, team_id)?
                        .ok_or_else(|| AppError::not_found("team", team_id.as_str()))?;
                    AbsenceRepository::insert(tx, &record)
                }
                AbsenceScope::Person(person_id) => {
                    let person = PersonRepository::find_by_id(tx, organisation_id, person_id)?
                        .ok_or_else(|| AppError::not_found("person", person_id.as_str()))?;
                    let employment = employment_percent_on_date(&person, date)?;
                    let max_hours = organisation.hours_per_day * employment / 100.0;
                    AbsenceRepository::create_person_absence_with_limit(tx, &record, max_hours)
                }
            }
        })?;

        info!(
            target: "app::absence",
            absence_id = %record.id,
            organisation_id,
            kind = %record.scope.kind(),
            date = %record.date,
            hours = record.hours,
            "absence created"
        );
        self.telemetry.record(
            TelemetryEvent::AbsenceCreated,
            &[
                ("organisationId", organisation_id.to_string()),
                ("kind", record.scope.kind().to_string()),
                ("date", record.date.clone()),
                ("hours", record.hours.to_string()),
            ],
        );
        Ok(record)
    }

    pub fn list_absences(&self, organisation_id: &str) -> AppResult<Vec<AbsenceRecord>> {
        self.db
            .with_connection(|conn| AbsenceRepository::list_by_organisation(conn, organisation_id))
    }

    pub fn get_absence(&self, organisation_id: &str, id: &str) -> AppResult<AbsenceRecord> {
        self.db
            .with_connection(|conn| AbsenceRepository::find_by_id(conn, organisation_id, id))?
            .ok_or_else(|| AppError::not_found("absence", id))
    }

    pub fn delete_absence(&self, organisation_id: &str, id: &str) -> AppResult<()> {
        if !self
            .db
            .with_connection(|conn| AbsenceRepository::delete(conn, organisation_id, id))?
        {
            return Err(AppError::not_found("absence", id));
        }
        info!(target: "app::absence", absence_id = %id, organisation_id, "absence deleted");
        self.telemetry.record(
            TelemetryEvent::AbsenceDeleted,
            &[
                ("organisationId", organisation_id.to_string()),
                ("absenceId", id.to_string()),
            ],
        );
        Ok(())
    }
}
