use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use super::{deserialize_json, serialize_json};
use crate::error::{AppError, AppResult};
use crate::models::person::PersonRecord;

const SELECT_COLUMNS: &str =
    "id, organisation_id, name, employment_percentage, employment_changes";

#[derive(Debug, Clone)]
pub struct PersonRow {
    pub id: String,
    pub organisation_id: String,
    pub name: String,
    pub employment_percentage: f64,
    pub employment_changes: String,
}

impl PersonRow {
    pub fn from_record(record: &PersonRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            organisation_id: record.organisation_id.clone(),
            name: record.name.clone(),
            employment_percentage: record.employment_percentage,
            employment_changes: serialize_json(&record.employment_changes)?,
        })
    }

    pub fn into_record(self) -> AppResult<PersonRecord> {
        Ok(PersonRecord {
            employment_changes: deserialize_json("people.employment_changes", &self.employment_changes)?,
            id: self.id,
            organisation_id: self.organisation_id,
            name: self.name,
            employment_percentage: self.employment_percentage,
        })
    }
}

impl TryFrom<&Row<'_>> for PersonRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            organisation_id: row.get("organisation_id")?,
            name: row.get("name")?,
            employment_percentage: row.get("employment_percentage")?,
            employment_changes: row.get("employment_changes")?,
        })
    }
}

pub struct PersonRepository;

impl PersonRepository {
    pub fn insert(conn: &Connection, record: &PersonRecord) -> AppResult<()> {
        let row = PersonRow::from_record(record)?;
        conn.execute(
            r#"
                INSERT INTO people (id, organisation_id, name, employment_percentage, employment_changes)
                VALUES (:id, :organisation_id, :name, :employment_percentage, :employment_changes)
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":name": &row.name,
                ":employment_percentage": row.employment_percentage,
                ":employment_changes": &row.employment_changes,
            },
        )?;
        Ok(())
    }

    pub fn update(conn: &Connection, record: &PersonRecord) -> AppResult<bool> {
        let row = PersonRow::from_record(record)?;
        let changed = conn.execute(
            r#"
                UPDATE people
                SET name = :name,
                    employment_percentage = :employment_percentage,
                    employment_changes = :employment_changes
                WHERE id = :id AND organisation_id = :organisation_id
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":name": &row.name,
                ":employment_percentage": row.employment_percentage,
                ":employment_changes": &row.employment_changes,
            },
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, organisation_id: &str, id: &str) -> AppResult<bool> {
        let changed = conn.execute(
            "DELETE FROM people WHERE id = :id AND organisation_id = :organisation_id",
            named_params! {":id": id, ":organisation_id": organisation_id},
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_id(
        conn: &Connection,
        organisation_id: &str,
        id: &str,
    ) -> AppResult<Option<PersonRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM people WHERE id = :id AND organisation_id = :organisation_id"
        );
        let row = conn
            .query_row(
                &sql,
                named_params! {":id": id, ":organisation_id": organisation_id},
                |row| PersonRow::try_from(row),
            )
            .optional()?;
        row.map(PersonRow::into_record).transpose()
    }

    pub fn list_by_organisation(
        conn: &Connection,
        organisation_id: &str,
    ) -> AppResult<Vec<PersonRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM people WHERE organisation_id = :organisation_id ORDER BY name, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(named_params! {":organisation_id": organisation_id}, |row| {
                PersonRow::try_from(row)
            })?
            .map(|row| row.map_err(AppError::from).and_then(PersonRow::into_record))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(records)
    }
}
