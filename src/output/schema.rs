//! Database schema definitions
//!
//! The `runs` table is fixed. Record tables are generated from the record
//! field lists so their columns always match the exported schema.

use crate::records::{Category, ContentRecord, ProfileRecord, Record};
use rusqlite::Connection;

/// SQL schema for run tracking
pub const RUNS_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    entities_total INTEGER NOT NULL DEFAULT 0,
    entities_succeeded INTEGER NOT NULL DEFAULT 0,
    entities_skipped INTEGER NOT NULL DEFAULT 0,
    entities_failed INTEGER NOT NULL DEFAULT 0
);
"#;

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            _ => None,
        }
    }
}

/// Builds the `CREATE TABLE` statement for one record collection
pub fn record_table_sql(table: &str, fields: &[&str]) -> String {
    let columns: Vec<String> = fields.iter().map(|f| format!("    \"{}\"", f)).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    row_id INTEGER PRIMARY KEY AUTOINCREMENT,\n    run_id INTEGER NOT NULL REFERENCES runs(id),\n{columns}\n);\nCREATE INDEX IF NOT EXISTS idx_{table}_run ON {table}(run_id);",
        table = table,
        columns = columns.join(",\n")
    )
}

/// Initializes the database schema
///
/// Safe to call on an existing database.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(RUNS_SQL)?;
    conn.execute_batch(&record_table_sql(
        Category::Profile.collection(),
        ProfileRecord::FIELDS,
    ))?;
    for category in [Category::Primary, Category::Secondary] {
        conn.execute_batch(&record_table_sql(
            category.collection(),
            ContentRecord::FIELDS,
        ))?;
    }
    Ok(())
}
