use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use super::{deserialize_json, serialize_json};
use crate::error::{AppError, AppResult};
use crate::models::team::TeamRecord;

#[derive(Debug, Clone)]
pub struct TeamRow {
    pub id: String,
    pub organisation_id: String,
    pub name: String,
    pub member_ids: String,
}

impl TeamRow {
    pub fn from_record(record: &TeamRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            organisation_id: record.organisation_id.clone(),
            name: record.name.clone(),
            member_ids: serialize_json(&record.member_ids)?,
        })
    }

    pub fn into_record(self) -> AppResult<TeamRecord> {
        Ok(TeamRecord {
            member_ids: deserialize_json("teams.member_ids", &self.member_ids)?,
            id: self.id,
            organisation_id: self.organisation_id,
            name: self.name,
        })
    }
}

impl TryFrom<&Row<'_>> for TeamRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            organisation_id: row.get("organisation_id")?,
            name: row.get("name")?,
            member_ids: row.get("member_ids")?,
        })
    }
}

pub struct TeamRepository;

impl TeamRepository {
    pub fn insert(conn: &Connection, record: &TeamRecord) -> AppResult<()> {
        let row = TeamRow::from_record(record)?;
        conn.execute(
            r#"
                INSERT INTO teams (id, organisation_id, name, member_ids)
                VALUES (:id, :organisation_id, :name, :member_ids)
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":name": &row.name,
                ":member_ids": &row.member_ids,
            },
        )?;
        Ok(())
    }

    pub fn update(conn: &Connection, record: &TeamRecord) -> AppResult<bool> {
        let row = TeamRow::from_record(record)?;
        let changed = conn.execute(
            r#"
                UPDATE teams
                SET name = :name, member_ids = :member_ids
                WHERE id = :id AND organisation_id = :organisation_id
            "#,
            named_params! {
                ":id": &row.id,
                ":organisation_id": &row.organisation_id,
                ":name": &row.name,
                ":member_ids": &row.member_ids,
            },
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, organisation_id: &str, id: &str) -> AppResult<bool> {
        let changed = conn.execute(
            "DELETE FROM teams WHERE id = :id AND organisation_id = :organisation_id",
            named_params! {":id": id, ":organisation_id": organisation_id},
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_id(
        conn: &Connection,
        organisation_id: &str,
        id: &str,
    ) -> AppResult<Option<TeamRecord>> {
        let row = conn
            .query_row(
                r#"
                    SELECT id, organisation_id, name, member_ids
                    FROM teams
                    WHERE id = :id AND organisation_id = :organisation_id
                "#,
                named_params! {":id": id, ":organisation_id": organisation_id},
                |row| TeamRow::try_from(row),
            )
            .optional()?;
        row.map(TeamRow::into_record).transpose()
    }

    pub fn list_by_organisation(
        conn: &Connection,
        organisation_id: &str,
    ) -> AppResult<Vec<TeamRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, organisation_id, name, member_ids
                FROM teams
                WHERE organisation_id = :organisation_id
                ORDER BY name, id
            "#,
        )?;
        let records = stmt
            .query_map(named_params! {":organisation_id": organisation_id}, |row| {
                TeamRow::try_from(row)
            })?
            .map(|row| row.map_err(AppError::from).and_then(TeamRow::into_record))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(records)
    }
}
