//! SQLite-backed usage store.
//!
//! One row per usage record; grading fields start NULL and are written once
//! when the worker finishes a job. Grading notes are stored as a JSON
//! column, timestamps as RFC 3339 text.

use super::{UsageQuery, UsageStore};
use crate::model::{QualityGradingNotes, UsageRecord, UsageUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS usage_records (
    usage_id      TEXT PRIMARY KEY,
    tenant_id     TEXT,
    quality_score INTEGER,
    grading_notes TEXT,
    graded_at     TEXT,
    graded_by     TEXT,
    created_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_usage_records_created_at ON usage_records(created_at);
CREATE INDEX IF NOT EXISTS idx_usage_records_tenant ON usage_records(tenant_id);
";

#[derive(Clone)]
pub struct SqliteUsageStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUsageStore {
    /// Open a file-backed store.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store (for testing).
    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_connection(conn: &Connection) -> anyhow::Result<()> {
        // WAL mode for file-backed DBs (no-op for in-memory)
        let _ = conn.execute("PRAGMA journal_mode = WAL", []);
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert the base record, as the upstream producer does before grading.
    pub fn insert_usage(
        &self,
        usage_id: &str,
        tenant_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO usage_records(usage_id, tenant_id, created_at) VALUES (?1, ?2, ?3)",
            params![usage_id, tenant_id, created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get(&self, usage_id: &str) -> anyhow::Result<Option<UsageRecord>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT usage_id, tenant_id, quality_score, grading_notes, graded_at, graded_by, created_at
                 FROM usage_records WHERE usage_id = ?1",
                params![usage_id],
                row_to_record,
            )
            .optional()?;
        Ok(row)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<UsageRecord> {
    let notes_json: Option<String> = row.get(3)?;
    let graded_at_raw: Option<String> = row.get(4)?;
    let created_at_raw: String = row.get(6)?;
    Ok(UsageRecord {
        usage_id: row.get(0)?,
        tenant_id: row.get(1)?,
        quality_score: row.get(2)?,
        grading_notes: notes_json
            .as_deref()
            .and_then(|s| serde_json::from_str::<QualityGradingNotes>(s).ok()),
        graded_at: graded_at_raw.as_deref().and_then(parse_utc),
        graded_by: row.get(5)?,
        created_at: parse_utc(&created_at_raw).unwrap_or_default(),
    })
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[async_trait]
impl UsageStore for SqliteUsageStore {
    async fn update(&self, usage_id: &str, update: &UsageUpdate) -> anyhow::Result<()> {
        let notes = serde_json::to_string(&update.grading_notes)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO usage_records(usage_id, quality_score, grading_notes, graded_at, graded_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?4)
             ON CONFLICT(usage_id) DO UPDATE SET
                 quality_score = excluded.quality_score,
                 grading_notes = excluded.grading_notes,
                 graded_at = excluded.graded_at,
                 graded_by = excluded.graded_by",
            params![
                usage_id,
                update.quality_score,
                notes,
                update.graded_at.to_rfc3339(),
                update.graded_by,
            ],
        )?;
        Ok(())
    }

    async fn query(&self, filter: &UsageQuery) -> anyhow::Result<Vec<UsageRecord>> {
        let conn = self.conn.lock().unwrap();
        let since = filter.since.map(|s| s.to_rfc3339());
        let mut stmt = conn.prepare(
            "SELECT usage_id, tenant_id, quality_score, grading_notes, graded_at, graded_by, created_at
             FROM usage_records
             WHERE (?1 IS NULL OR created_at >= ?1)
               AND (?2 IS NULL OR tenant_id = ?2)
             ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![since, filter.tenant_id], row_to_record)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
