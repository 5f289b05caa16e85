use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::commitment::{CommitmentRecord, CommitmentTarget};

const SELECT_COLUMNS: &str = "id, organisation_id, target_type, target_id, person_id, \
     project_id, start_date, end_date, percentage";

#[derive(Debug, Clone)]
pub struct CommitmentRow {
    pub id: String,
    pub organisation_id: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    /// Legacy direct reference, still written for person targets.
    pub person_id: Option<String>,
    pub project_id: String,
    pub start_date: String,
    pub end_date: String,
    pub percentage: f64,
}

impl CommitmentRow {
    pub fn from_record(record: &CommitmentRecord) -> Self {
        let person_id = match &record.target {
            CommitmentTarget::Person(id) => Some(id.clone()),
            CommitmentTarget::Team(_) => None,
        };
        Self {
            id: record.id.clone(),
            organisation_id: record.organisation_id.clone(),
            target_type: Some(record.target.kind().as_str().to_string()),
            target_id: Some(record.target.id().to_string()),
            person_id,
            project_id: record.project_id.clone(),
            start_date: record.start_date.clone(),
            end_date: record.end_date.clone(),
            percentage: record.percentage,
        }
    }

    /// Rows without a target type are legacy person commitments.
    pub fn into_record(self) -> AppResult<CommitmentRecord> {
        let target = CommitmentTarget::from_fields(
            self.target_type.as_deref(),
            self.target_id.as_deref(),
            self.person_id.as_deref(),
        )
        .map_err(|message| AppError::validation(format!("commitment {}: {message}", self.id)))?;

        Ok(CommitmentRecord {
            id: self.id,
            organisation_id: self.organisation_id,
            target,
            project_id: self.project_id,
            start_date: self.start_date,
            end_date: self.end_date,
            percentage: self.percentage,
        })
    }
}

impl TryFrom<&Row<'_>> for CommitmentRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            organisation_id: row.get("organisation_id")?,
            target_type: row.get("target_type")?,
            target_id: row.get("target_id")?,
            person_id: row.get("person_id")?,
            project_id: row.get("project_id")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            percentage: row.get("percentage")?,
        })
    }
}

pub struct CommitmentRepository;

impl CommitmentRepository {
    pub fn insert(conn: &Connection, record: &CommitmentRecord) -> AppResult<()> {
        let row = CommitmentRow::from_record(record);
        conn.execute(
            r#"
                INSERT INTO commitments (
                    id, organisation_id, target_type, target_id, person_id,
                    project_id, start_date, end_date, percentage
                ) VALUES (
                    :id, :organisation_id, :target_type, :target_id, :person_id,
                    :project_id, :start_date, :end_date, :percentage
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":target_type": &row.target_type,
                ":target_id": &row.target_id,
                ":person_id": &row.person_id,
                ":project_id": &row.project_id,
                ":start_date": &row.start_date,
                ":end_date": &row.end_date,
                ":percentage": row.percentage,
            },
        )?;
        Ok(())
    }

    pub fn update(conn: &Connection, record: &CommitmentRecord) -> AppResult<bool> {
        let row = CommitmentRow::from_record(record);
        let changed = conn.execute(
            r#"
                UPDATE commitments
                SET target_type = :target_type,
                    target_id = :target_id,
                    person_id = :person_id,
                    project_id = :project_id,
                    start_date = :start_date,
                    end_date = :end_date,
                    percentage = :percentage
                WHERE id = :id AND organisation_id = :organisation_id
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":target_type": &row.target_type,
                ":target_id": &row.target_id,
                ":person_id": &row.person_id,
                ":project_id": &row.project_id,
                ":start_date": &row.start_date,
                ":end_date": &row.end_date,
                ":percentage": row.percentage,
            },
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, organisation_id: &str, id: &str) -> AppResult<bool> {
        let changed = conn.execute(
            "DELETE FROM commitments WHERE id = :id AND organisation_id = :organisation_id",
            named_params! {":id": id, ":organisation_id": organisation_id},
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_id(
        conn: &Connection,
        organisation_id: &str,
        id: &str,
    ) -> AppResult<Option<CommitmentRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM commitments WHERE id = :id AND organisation_id = :organisation_id"
        );
        let row = conn
            .query_row(
                &sql,
                named_params! {":id": id, ":organisation_id": organisation_id},
                |row| CommitmentRow::try_from(row),
            )
            .optional()?;
        row.map(CommitmentRow::into_record).transpose()
    }

    pub fn list_by_organisation(
        conn: &Connection,
        organisation_id: &str,
    ) -> AppResult<Vec<CommitmentRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM commitments WHERE organisation_id = :organisation_id ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(named_params! {":organisation_id": organisation_id}, |row| {
                CommitmentRow::try_from(row)
            })?
            .map(|row| row.map_err(AppError::from).and_then(CommitmentRow::into_record))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(records)
    }

    pub fn list_by_project(
        conn: &Connection,
        organisation_id: &str,
        project_id: &str,
    ) -> AppResult<Vec<CommitmentRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM commitments \
             WHERE organisation_id = :organisation_id AND project_id = :project_id ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                named_params! {":organisation_id": organisation_id, ":project_id": project_id},
                |row| CommitmentRow::try_from(row),
            )?
            .map(|row| row.map_err(AppError::from).and_then(CommitmentRow::into_record))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(records)
    }
}
