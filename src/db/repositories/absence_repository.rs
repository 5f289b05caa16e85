use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::absence::{AbsenceKind, AbsenceRecord, AbsenceScope};

#[derive(Debug, Clone)]
pub struct AbsenceRow {
    pub id: String,
    pub organisation_id: String,
    pub kind: String,
    pub target_id: Option<String>,
    pub date: String,
    pub hours: f64,
}

impl AbsenceRow {
    pub fn from_record(record: &AbsenceRecord) -> Self {
        Self {
            id: record.id.clone(),
            organisation_id: record.organisation_id.clone(),
            kind: record.scope.kind().as_str().to_string(),
            target_id: record.scope.target_id().map(str::to_string),
            date: record.date.clone(),
            hours: record.hours,
        }
    }

    pub fn into_record(self) -> AppResult<AbsenceRecord> {
        let scope = AbsenceKind::try_from(self.kind.as_str())
            .and_then(|kind| kind.scope(self.target_id))
            .map_err(AppError::validation)?;

        Ok(AbsenceRecord {
            id: self.id,
            organisation_id: self.organisation_id,
            scope,
            date: self.date,
            hours: self.hours,
        })
    }
}

impl TryFrom<&Row<'_>> for AbsenceRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            organisation_id: row.get("organisation_id")?,
            kind: row.get("kind")?,
            target_id: row.get("target_id")?,
            date: row.get("date")?,
            hours: row.get("hours")?,
        })
    }
}

pub struct AbsenceRepository;

impl AbsenceRepository {
    pub fn insert(conn: &Connection, record: &AbsenceRecord) -> AppResult<()> {
        let row = AbsenceRow::from_record(record);
        conn.execute(
            r#"
                INSERT INTO absences (id, organisation_id, kind, target_id, date, hours)
                VALUES (:id, :organisation_id, :kind, :target_id, :date, :hours)
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":kind": &row.kind,
                ":target_id": &row.target_id,
                ":date": &row.date,
                ":hours": row.hours,
            },
        )?;
        Ok(())
    }

    /// Inserts a person absence unless the person's total absence hours on
    /// that date would exceed `max_hours`. Run inside a transaction so the
    /// check and the insert see the same data.
    pub fn create_person_absence_with_limit(
        conn: &Connection,
        record: &AbsenceRecord,
        max_hours: f64,
    ) -> AppResult<()> {
        let AbsenceScope::Person(person_id) = &record.scope else {
            return Err(AppError::validation(
                "absence limit applies to person absences only",
            ));
        };

        let existing = Self::person_hours_on(conn, &record.organisation_id, person_id, &record.date)?;
        let total = existing + record.hours;
        if total > max_hours + f64::EPSILON {
            return Err(AppError::validation_with_details(
                "person absence exceeds available hours for the day",
                json!({
                    "personId": person_id,
                    "date": record.date,
                    "existingHours": existing,
                    "requestedHours": record.hours,
                    "maxHours": max_hours,
                }),
            ));
        }

        Self::insert(conn, record)
    }

    pub fn person_hours_on(
        conn: &Connection,
        organisation_id: &str,
        person_id: &str,
        date: &str,
    ) -> AppResult<f64> {
        let total: f64 = conn.query_row(
            r#"
                SELECT COALESCE(SUM(hours), 0.0)
                FROM absences
                WHERE organisation_id = :organisation_id
                  AND kind = 'person'
                  AND target_id = :person_id
                  AND date = :date
            "#,
            named_params! {
                ":organisation_id": organisation_id,
                ":person_id": person_id,
                ":date": date,
            },
            |row| row.get(0),
        )?;
        Ok(total)
    }

    pub fn delete(conn: &Connection, organisation_id: &str, id: &str) -> AppResult<bool> {
        let changed = conn.execute(
            "DELETE FROM absences WHERE id = :id AND organisation_id = :organisation_id",
            named_params! {":id": id, ":organisation_id": organisation_id},
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_id(
        conn: &Connection,
        organisation_id: &str,
        id: &str,
    ) -> AppResult<Option<AbsenceRecord>> {
        let row = conn
            .query_row(
                r#"
                    SELECT id, organisation_id, kind, target_id, date, hours
                    FROM absences
                    WHERE id = :id AND organisation_id = :organisation_id
                "#,
                named_params! {":id": id, ":organisation_id": organisation_id},
                |row| AbsenceRow::try_from(row),
            )
            .optional()?;
        row.map(AbsenceRow::into_record).transpose()
    }

    pub fn list_by_organisation(
        conn: &Connection,
        organisation_id: &str,
    ) -> AppResult<Vec<AbsenceRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, organisation_id, kind, target_id, date, hours
                FROM absences
                WHERE organisation_id = :organisation_id
                ORDER BY date, id
            "#,
        )?;
        let records = stmt
            .query_map(named_params! {":organisation_id": organisation_id}, |row| {
                AbsenceRow::try_from(row)
            })?
            .map(|row| row.map_err(AppError::from).and_then(AbsenceRow::into_record))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(records)
    }
}
