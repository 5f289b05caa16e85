use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::organisation::OrganisationRecord;

#[derive(Debug, Clone)]
pub struct OrganisationRow {
    pub id: String,
    pub name: String,
    pub hours_per_day: f64,
    pub hours_per_week: f64,
    pub hours_per_year: f64,
}

impl OrganisationRow {
    pub fn from_record(record: &OrganisationRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            hours_per_day: record.hours_per_day,
            hours_per_week: record.hours_per_week,
            hours_per_year: record.hours_per_year,
        }
    }

    pub fn into_record(self) -> OrganisationRecord {
        OrganisationRecord {
            id: self.id,
            name: self.name,
            hours_per_day: self.hours_per_day,
            hours_per_week: self.hours_per_week,
            hours_per_year: self.hours_per_year,
        }
    }
}

impl TryFrom<&Row<'_>> for OrganisationRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            hours_per_day: row.get("hours_per_day")?,
            hours_per_week: row.get("hours_per_week")?,
            hours_per_year: row.get("hours_per_year")?,
        })
    }
}

pub struct OrganisationRepository;

impl OrganisationRepository {
    pub fn insert(conn: &Connection, record: &OrganisationRecord) -> AppResult<()> {
        let row = OrganisationRow::from_record(record);
        conn.execute(
            r#"
                INSERT INTO organisations (id, name, hours_per_day, hours_per_week, hours_per_year)
                VALUES (:id, :name, :hours_per_day, :hours_per_week, :hours_per_year)
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":hours_per_day": row.hours_per_day,
                ":hours_per_week": row.hours_per_week,
                ":hours_per_year": row.hours_per_year,
            },
        )?;
        Ok(())
    }

    pub fn update(conn: &Connection, record: &OrganisationRecord) -> AppResult<bool> {
        let row = OrganisationRow::from_record(record);
        let changed = conn.execute(
            r#"
                UPDATE organisations
                SET name = :name,
                    hours_per_day = :hours_per_day,
                    hours_per_week = :hours_per_week,
                    hours_per_year = :hours_per_year
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":hours_per_day": row.hours_per_day,
                ":hours_per_week": row.hours_per_week,
                ":hours_per_year": row.hours_per_year,
            },
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<bool> {
        let changed = conn.execute(
            "DELETE FROM organisations WHERE id = :id",
            named_params! {":id": id},
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<OrganisationRecord>> {
        let row = conn
            .query_row(
                r#"
                    SELECT id, name, hours_per_day, hours_per_week, hours_per_year
                    FROM organisations
                    WHERE id = :id
                "#,
                named_params! {":id": id},
                |row| OrganisationRow::try_from(row),
            )
            .optional()?;
        Ok(row.map(OrganisationRow::into_record))
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<OrganisationRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, name, hours_per_day, hours_per_week, hours_per_year
                FROM organisations
                ORDER BY name, id
            "#,
        )?;
        let records = stmt
            .query_map([], |row| OrganisationRow::try_from(row))?
            .map(|row| row.map(OrganisationRow::into_record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
