use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::project::ProjectRecord;

#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: String,
    pub organisation_id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub estimated_effort_hours: f64,
}

impl ProjectRow {
    pub fn from_record(record: &ProjectRecord) -> Self {
        Self {
            id: record.id.clone(),
            organisation_id: record.organisation_id.clone(),
            name: record.name.clone(),
            start_date: record.start_date.clone(),
            end_date: record.end_date.clone(),
            estimated_effort_hours: record.estimated_effort_hours,
        }
    }

    pub fn into_record(self) -> ProjectRecord {
        ProjectRecord {
            id: self.id,
            organisation_id: self.organisation_id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            estimated_effort_hours: self.estimated_effort_hours,
        }
    }
}

impl TryFrom<&Row<'_>> for ProjectRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            organisation_id: row.get("organisation_id")?,
            name: row.get("name")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            estimated_effort_hours: row.get("estimated_effort_hours")?,
        })
    }
}

pub struct ProjectRepository;

impl ProjectRepository {
    pub fn insert(conn: &Connection, record: &ProjectRecord) -> AppResult<()> {
        let row = ProjectRow::from_record(record);
        conn.execute(
            r#"
                INSERT INTO projects (
                    id, organisation_id, name, start_date, end_date, estimated_effort_hours
                ) VALUES (
                    :id, :organisation_id, :name, :start_date, :end_date, :estimated_effort_hours
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":name": &row.name,
                ":start_date": &row.start_date,
                ":end_date": &row.end_date,
                ":estimated_effort_hours": row.estimated_effort_hours,
            },
        )?;
        Ok(())
    }

    pub fn update(conn: &Connection, record: &ProjectRecord) -> AppResult<bool> {
        let row = ProjectRow::from_record(record);
        let changed = conn.execute(
            r#"
                UPDATE projects
                SET name = :name,
                    start_date = :start_date,
                    end_date = :end_date,
                    estimated_effort_hours = :estimated_effort_hours
                WHERE id = :id AND organisation_id = :organisation_id
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":name": &row.name,
                ":start_date": &row.start_date,
                ":end_date": &row.end_date,
                ":estimated_effort_hours": row.estimated_effort_hours,
            },
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, organisation_id: &str, id: &str) -> AppResult<bool> {
        let changed = conn.execute(
            "DELETE FROM projects WHERE id = :id AND organisation_id = :organisation_id",
            named_params! {":id": id, ":organisation_id": organisation_id},
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_id(
        conn: &Connection,
        organisation_id: &str,
        id: &str,
    ) -> AppResult<Option<ProjectRecord>> {
        let row = conn
            .query_row(
                r#"
                    SELECT id, organisation_id, name, start_date, end_date, estimated_effort_hours
                    FROM projects
                    WHERE id = :id AND organisation_id = :organisation_id
                "#,
                named_params! {":id": id, ":organisation_id": organisation_id},
                |row| ProjectRow::try_from(row),
            )
            .optional()?;
        Ok(row.map(ProjectRow::into_record))
    }

    pub fn list_by_organisation(
        conn: &Connection,
        organisation_id: &str,
    ) -> AppResult<Vec<ProjectRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, organisation_id, name, start_date, end_date, estimated_effort_hours
                FROM projects
                WHERE organisation_id = :organisation_id
                ORDER BY start_date, id
            "#,
        )?;
        let records = stmt
            .query_map(named_params! {":organisation_id": organisation_id}, |row| {
                ProjectRow::try_from(row)
            })?
            .map(|row| row.map(ProjectRow::into_record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
