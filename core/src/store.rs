//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The database is an opaque key-value store. All snapshots live in
//! one JSON array under SNAPSHOTS_KEY and every write replaces the
//! whole array (read, mutate, write). Concurrent writers: last wins.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ForecastError, ForecastResult},
    planner::PlannerState,
    snapshot::{self, Snapshot},
};

pub const SNAPSHOTS_KEY: &str = "roofing_forecast_snapshots";

/// Listing entry for a stored snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotSummary {
    pub id:        String,
    pub name:      String,
    pub timestamp: String,
}

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &str) -> ForecastResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory store (used in tests).
    pub fn in_memory() -> ForecastResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ForecastResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_kv_store.sql"))?;
        Ok(())
    }

    // ── Raw key-value access ───────────────────────────────────

    pub fn get(&self, key: &str) -> ForecastResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> ForecastResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ── Snapshots ──────────────────────────────────────────────

    fn read_documents(&self) -> ForecastResult<Vec<Value>> {
        match self.get(SNAPSHOTS_KEY)? {
            None => Ok(Vec::new()),
            Some(json) => Ok(serde_json::from_str(&json)?),
        }
    }

    fn write_documents(&self, docs: &[Value]) -> ForecastResult<()> {
        let json = serde_json::to_string(docs)?;
        self.put(SNAPSHOTS_KEY, &json)
    }

    /// Every stored snapshot, oldest first.
    pub fn list_snapshots(&self) -> ForecastResult<Vec<SnapshotSummary>> {
        let docs = self.read_documents()?;
        Ok(docs
            .iter()
            .map(|d| SnapshotSummary {
                id:        str_field(d, "id"),
                name:      str_field(d, "name"),
                timestamp: str_field(d, "timestamp"),
            })
            .collect())
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> ForecastResult<()> {
        let mut docs = self.read_documents()?;
        docs.push(serde_json::to_value(snapshot)?);
        self.write_documents(&docs)?;
        log::info!("snapshot '{}' saved as {}", snapshot.name, snapshot.id);
        Ok(())
    }

    /// Capture `state` under `name` and store it.
    pub fn save_state(&self, name: &str, state: &PlannerState) -> ForecastResult<Snapshot> {
        let snapshot = snapshot::serialize(name, state, Utc::now())?;
        self.save_snapshot(&snapshot)?;
        Ok(snapshot)
    }

    pub fn load_snapshot(&self, id: &str) -> ForecastResult<Snapshot> {
        let docs = self.read_documents()?;
        let doc = docs
            .iter()
            .find(|d| d.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| ForecastError::SnapshotNotFound { id: id.to_string() })?;
        snapshot::decode(doc)
    }

    pub fn restore_state(&self, id: &str) -> ForecastResult<PlannerState> {
        snapshot::deserialize(&self.load_snapshot(id)?)
    }

    /// Delete by id. Absent ids are ignored.
    pub fn delete_snapshot(&self, id: &str) -> ForecastResult<()> {
        let mut docs = self.read_documents()?;
        let before = docs.len();
        docs.retain(|d| d.get("id").and_then(Value::as_str) != Some(id));
        if docs.len() < before {
            self.write_documents(&docs)?;
            log::info!("snapshot {id} deleted");
        }
        Ok(())
    }
}

fn str_field(doc: &Value, key: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
