use chrono::Utc;
use rusqlite::{Connection, Row};
use tracing::info;

use crate::error::AppResult;

const USER_VERSION: i32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationInfo {
    pub version: i32,
    pub description: String,
    pub applied_at: String,
}

pub fn run(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );
        "#,
    )?;

    let mut current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {current_version}"), [])?;
        record_migration(conn, 1, "Initial capacity planning schema")?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {current_version}"), [])?;
        record_migration(conn, 2, "Add team commitment targets")?;
    }

    if current_version != USER_VERSION {
        conn.execute(&format!("PRAGMA user_version = {USER_VERSION}"), [])?;
    }

    Ok(())
}

pub fn get_migration_history(conn: &Connection) -> AppResult<Vec<MigrationInfo>> {
    let mut stmt =
        conn.prepare("SELECT version, description, applied_at FROM migration_history ORDER BY version")?;
    let history = stmt
        .query_map([], |row| {
            Ok(MigrationInfo {
                version: row.get(0)?,
                description: row.get(1)?,
                applied_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(history)
}

fn record_migration(conn: &Connection, version: i32, description: &str) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO migration_history (version, description, applied_at) VALUES (?, ?, ?)",
        (version, description, now),
    )?;
    Ok(())
}

/// Databases created before team targets only carry `person_id` on
/// commitments. The columns are added and left empty; rows are normalized
/// when read.
fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    ensure_column(conn, "commitments", "target_type", "TEXT")?;
    ensure_column(conn, "commitments", "target_id", "TEXT")?;
    ensure_column(conn, "commitments", "person_id", "TEXT")?;
    Ok(())
}

fn ensure_column(conn: &Connection, table: &str, column: &str, definition: &str) -> AppResult<()> {
    if !column_exists(conn, table, column)? {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition};"), [])?;
    }
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        if equals_name(row, column)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn equals_name(row: &Row<'_>, column: &str) -> Result<bool, rusqlite::Error> {
    let name: String = row.get(1)?;
    Ok(name.eq_ignore_ascii_case(column))
}
