//! SQLite dataset sink
//!
//! The database is opened and a `running` row is inserted into `runs` when the
//! sink is created. `write` stores every record tagged with that run and
//! finalizes the run row in a single transaction.

use crate::harvest::RunReport;
use crate::output::schema::{initialize_schema, RunStatus};
use crate::output::traits::{DatasetSink, OutputResult};
use crate::records::{BatchDataset, Category, FieldValue, Record, NOT_AVAILABLE};
use chrono::Utc;
use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::{params, params_from_iter, Connection, ToSql, Transaction};
use std::path::Path;

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(v) => ToSqlOutput::from(v.as_str()),
            Self::Integer(v) => ToSqlOutput::from(*v),
            Self::Boolean(v) => ToSqlOutput::from(*v),
            Self::Null => ToSqlOutput::from(Null),
            Self::NotAvailable => ToSqlOutput::from(NOT_AVAILABLE),
        })
    }
}

/// SQLite sink
pub struct SqliteOutput {
    conn: Connection,
    run_id: i64,
}

impl SqliteOutput {
    /// Opens (or creates) the database at `path` and starts a run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Digest of the configuration that produced the run
    pub fn open(path: &Path, config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        Self::start(conn, config_hash)
    }

    /// Opens an in-memory database
    pub fn open_in_memory(config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::start(conn, config_hash)
    }

    fn start(conn: Connection, config_hash: &str) -> OutputResult<Self> {
        initialize_schema(&conn)?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Started database run {}", run_id);

        Ok(Self { conn, run_id })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn insert_records<R: Record>(
        tx: &Transaction<'_>,
        table: &str,
        run_id: i64,
        records: &[R],
    ) -> OutputResult<()> {
        let columns: Vec<String> = R::FIELDS.iter().map(|f| format!("\"{}\"", f)).collect();
        let placeholders: Vec<String> = (1..=R::FIELDS.len() + 1)
            .map(|i| format!("?{}", i))
            .collect();
        let sql = format!(
            "INSERT INTO {} (run_id, {}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut stmt = tx.prepare(&sql)?;
        for record in records {
            let values = std::iter::once(&run_id as &dyn ToSql)
                .chain(record.values().into_iter().map(|v| v as &dyn ToSql));
            stmt.execute(params_from_iter(values))?;
        }
        Ok(())
    }
}

impl DatasetSink for SqliteOutput {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn write(&mut self, dataset: &BatchDataset, report: &RunReport) -> OutputResult<()> {
        let run_id = self.run_id;
        let status = if report.interrupted {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };

        let tx = self.conn.transaction()?;
        Self::insert_records(&tx, Category::Profile.collection(), run_id, dataset.users())?;
        Self::insert_records(&tx, Category::Primary.collection(), run_id, dataset.primary())?;
        Self::insert_records(
            &tx,
            Category::Secondary.collection(),
            run_id,
            dataset.secondary(),
        )?;
        tx.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, entities_total = ?3,
                entities_succeeded = ?4, entities_skipped = ?5, entities_failed = ?6
             WHERE id = ?7",
            params![
                status.to_db_string(),
                Utc::now().to_rfc3339(),
                report.total_entities as i64,
                report.succeeded() as i64,
                report.skipped() as i64,
                report.failed() as i64,
                run_id
            ],
        )?;
        tx.commit()?;

        tracing::info!(
            "Stored {} records in database run {} ({})",
            dataset.total_records(),
            run_id,
            status.to_db_string()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::EntityOutcome;
    use crate::records::{ContentRecord, HarvestResult, HarvestStatus, ProfileRecord};
    use crate::state::EntityState;
    use serde_json::json;
    use tempfile::TempDir;

    fn dataset() -> BatchDataset {
        let profile = serde_json::from_value(json!({
            "id": "7",
            "screen_name": "alice",
            "followers_count": 12,
            "verified": true,
            "location": null
        }))
        .unwrap();
        let items: Vec<_> = (0..3)
            .map(|i| serde_json::from_value(json!({"id": i.to_string()})).unwrap())
            .collect();

        let mut dataset = BatchDataset::new();
        dataset.append(HarvestResult {
            entity: "alice".to_string(),
            status: HarvestStatus::Success,
            profile: Some(ProfileRecord::from_raw(&profile)),
            primary: items
                .iter()
                .map(|item| ContentRecord::from_raw("7", item))
                .collect(),
            secondary: vec![ContentRecord::from_raw("7", &items[0])],
            primary_stop: None,
            secondary_stop: None,
        });
        dataset
    }

    fn report(interrupted: bool) -> RunReport {
        let mut report = RunReport::new(2);
        report.record(EntityOutcome::new("alice", EntityState::Succeeded, None));
        report.record(EntityOutcome::new(
            "ghost",
            EntityState::Skipped,
            Some("not found".into()),
        ));
        report.interrupted = interrupted;
        report
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_open_creates_running_run() {
        let sink = SqliteOutput::open_in_memory("abc123").unwrap();
        let (status, hash): (String, String) = sink
            .connection()
            .query_row(
                "SELECT status, config_hash FROM runs WHERE id = ?1",
                [sink.run_id()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        assert_eq!(status, "running");
        assert_eq!(hash, "abc123");
    }

    #[test]
    fn test_write_stores_records_and_finalizes_run() {
        let mut sink = SqliteOutput::open_in_memory("abc123").unwrap();
        sink.write(&dataset(), &report(false)).unwrap();

        let conn = sink.connection();
        assert_eq!(count(conn, "users"), 1);
        assert_eq!(count(conn, "tweets"), 3);
        assert_eq!(count(conn, "highlight_tweets"), 1);

        let (followers, verified, location, description): (i64, bool, Option<String>, String) =
            conn.query_row(
                "SELECT followers_count, verified, location, description FROM users",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(followers, 12);
        assert!(verified);
        assert_eq!(location, None);
        assert_eq!(description, "N/A");

        let (status, finished, succeeded, skipped): (String, Option<String>, i64, i64) = conn
            .query_row(
                "SELECT status, finished_at, entities_succeeded, entities_skipped FROM runs",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(status, "completed");
        assert!(finished.is_some());
        assert_eq!(succeeded, 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_interrupted_run_status() {
        let mut sink = SqliteOutput::open_in_memory("abc123").unwrap();
        sink.write(&dataset(), &report(true)).unwrap();

        let status: String = sink
            .connection()
            .query_row("SELECT status FROM runs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(status, "interrupted");
    }

    #[test]
    fn test_runs_accumulate_in_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harvest.db");

        for _ in 0..2 {
            let mut sink = SqliteOutput::open(&path, "abc123").unwrap();
            sink.write(&dataset(), &report(false)).unwrap();
        }

        let sink = SqliteOutput::open(&path, "abc123").unwrap();
        assert_eq!(sink.run_id(), 3);
        assert_eq!(count(sink.connection(), "tweets"), 6);
        let distinct: i64 = sink
            .connection()
            .query_row("SELECT COUNT(DISTINCT run_id) FROM tweets", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(distinct, 2);
    }
}
