// SQLite persistence for computed valuation snapshots.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::engine::LeagueValuation;

/// SQLite-backed store of league valuations. Each save appends a row; the
/// newest row per league is the current snapshot.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS valuation_snapshots (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                league_id   TEXT NOT NULL,
                season      INTEGER NOT NULL,
                computed_at TEXT NOT NULL,
                payload     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_valuation_snapshots_league
                ON valuation_snapshots(league_id, id);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Store a league valuation. Returns the new row id.
    pub fn save_snapshot(&self, valuation: &LeagueValuation) -> Result<i64> {
        let payload =
            serde_json::to_string(valuation).context("failed to serialize valuation")?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO valuation_snapshots (league_id, season, computed_at, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                valuation.league_id,
                valuation.season,
                valuation.computed_at.to_rfc3339(),
                payload,
            ],
        )
        .with_context(|| format!("failed to save snapshot for league {}", valuation.league_id))?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recently saved valuation for `league_id`, if any.
    pub fn load_latest_snapshot(&self, league_id: &str) -> Result<Option<LeagueValuation>> {
        let conn = self.conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM valuation_snapshots
                 WHERE league_id = ?1 ORDER BY id DESC LIMIT 1",
                params![league_id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query latest snapshot")?;

        payload
            .map(|json| {
                serde_json::from_str(&json).context("failed to deserialize stored valuation")
            })
            .transpose()
    }

    pub fn snapshot_count(&self, league_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM valuation_snapshots WHERE league_id = ?1",
                params![league_id],
                |row| row.get(0),
            )
            .context("failed to count snapshots")?;
        Ok(count as usize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
