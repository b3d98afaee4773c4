//! SQLite-backed preference and feedback storage.
//!
//! One database file holds both the preference vectors and the feedback
//! log, so a feedback application touches a single store.

use super::models::{FeedbackAction, FeedbackRecord};
use super::schema::PROFILE_VERSIONED_SCHEMAS;
use super::trait_def::{FeedbackStore, PreferenceStore};
use crate::config::InitialPreference;
use crate::embedding::l2_normalize;
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{bail, Context, Result};
use rand::Rng;
use rand_distr::StandardNormal;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed store for preference vectors and the feedback log.
#[derive(Clone)]
pub struct SqliteProfileStore {
    conn: Arc<Mutex<Connection>>,
    dim: usize,
    initial_policy: InitialPreference,
    /// Normalized catalog mean, required when the policy is `Mean`.
    catalog_mean: Option<Vec<f64>>,
}

impl SqliteProfileStore {
    pub fn new<P: AsRef<Path>>(
        db_path: P,
        dim: usize,
        initial_policy: InitialPreference,
        catalog_mean: Option<Vec<f64>>,
    ) -> Result<Self> {
        if initial_policy == InitialPreference::Mean && catalog_mean.is_none() {
            bail!("Initial preference policy 'mean' requires a catalog mean vector");
        }
        if let Some(mean) = &catalog_mean {
            if mean.len() != dim {
                bail!(
                    "Catalog mean dimension mismatch: expected {}, got {}",
                    dim,
                    mean.len()
                );
            }
        }

        let mut conn =
            Connection::open(db_path.as_ref()).context("Failed to open profile database")?;
        migrate_if_needed(&mut conn, PROFILE_VERSIONED_SCHEMAS, "profile")?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on profile database")?;

        let users: usize =
            conn.query_row("SELECT COUNT(*) FROM user_preference", [], |r| r.get(0))?;
        info!("Profile store ready: {} users with preferences", users);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            dim,
            initial_policy,
            catalog_mean,
        })
    }

    fn initial_vector(&self) -> Vec<f64> {
        match self.initial_policy {
            InitialPreference::Zero => vec![0.0; self.dim],
            InitialPreference::Random => {
                let mut rng = rand::rng();
                let mut vector: Vec<f64> =
                    (0..self.dim).map(|_| rng.sample(StandardNormal)).collect();
                l2_normalize(&mut vector);
                vector
            }
            // Presence is validated in the constructor
            InitialPreference::Mean => self.catalog_mean.clone().unwrap_or_else(|| vec![0.0; self.dim]),
        }
    }

    /// Read the stored vector, inserting the initial vector on first access
    /// so that a random initialization stays stable across calls.
    fn get_or_init(&self, conn: &Connection, user_id: &str) -> Result<Vec<f64>> {
        let stored = conn
            .query_row(
                "SELECT vector FROM user_preference WHERE user_id = ?1",
                params![user_id],
                |r| r.get::<_, String>(0),
            )
            .optional()?;
        if let Some(vector_json) = stored {
            return Ok(serde_json::from_str(&vector_json)?);
        }

        let vector = self.initial_vector();
        conn.execute(
            "INSERT INTO user_preference (user_id, vector) VALUES (?1, ?2)",
            params![user_id, serde_json::to_string(&vector)?],
        )?;
        Ok(vector)
    }

    fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<FeedbackRecord> {
        let action_str: String = row.get("action")?;
        let action = FeedbackAction::from_str(&action_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let delta_json: String = row.get("delta")?;
        let delta_applied: Vec<f64> = serde_json::from_str(&delta_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(FeedbackRecord {
            feedback_id: row.get("feedback_id")?,
            user_id: row.get("user_id")?,
            track_id: row.get("track_id")?,
            action,
            delta_applied,
            undone: row.get::<_, i64>("undone")? != 0,
            created_at: row.get("created")?,
        })
    }
}

impl PreferenceStore for SqliteProfileStore {
    fn get(&self, user_id: &str) -> Result<Vec<f64>> {
        let conn = self.conn.lock().unwrap();
        self.get_or_init(&conn, user_id)
    }

    fn apply_delta(&self, user_id: &str, delta: &[f64]) -> Result<Vec<f64>> {
        if delta.len() != self.dim {
            bail!(
                "Delta dimension mismatch: expected {}, got {}",
                self.dim,
                delta.len()
            );
        }
        let conn = self.conn.lock().unwrap();
        let mut vector = self.get_or_init(&conn, user_id)?;
        for (slot, d) in vector.iter_mut().zip(delta.iter()) {
            *slot += d;
        }
        l2_normalize(&mut vector);
        conn.execute(
            "UPDATE user_preference
             SET vector = ?2, updated = cast(strftime('%s','now') as int)
             WHERE user_id = ?1",
            params![user_id, serde_json::to_string(&vector)?],
        )?;
        Ok(vector)
    }
}

impl FeedbackStore for SqliteProfileStore {
    fn append_feedback(
        &self,
        user_id: &str,
        track_id: &str,
        action: FeedbackAction,
        delta: &[f64],
    ) -> Result<FeedbackRecord> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO feedback (user_id, track_id, action, delta) VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                track_id,
                action.as_str(),
                serde_json::to_string(delta)?
            ],
        )?;
        let feedback_id = conn.last_insert_rowid();
        let created_at: i64 = conn.query_row(
            "SELECT created FROM feedback WHERE feedback_id = ?1",
            params![feedback_id],
            |r| r.get(0),
        )?;
        Ok(FeedbackRecord {
            feedback_id,
            user_id: user_id.to_string(),
            track_id: track_id.to_string(),
            action,
            delta_applied: delta.to_vec(),
            undone: false,
            created_at,
        })
    }

    fn last_active_feedback(&self, user_id: &str) -> Result<Option<FeedbackRecord>> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT * FROM feedback
                 WHERE user_id = ?1 AND undone = 0
                 ORDER BY feedback_id DESC
                 LIMIT 1",
                params![user_id],
                Self::record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn mark_undone(&self, feedback_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE feedback SET undone = 1 WHERE feedback_id = ?1",
            params![feedback_id],
        )?;
        if updated != 1 {
            bail!("Feedback record {} not found", feedback_id);
        }
        Ok(())
    }

    fn liked_track_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT track_id FROM feedback
             WHERE user_id = ?1
             AND action IN ('like', 'more_like_this')
             AND undone = 0",
        )?;
        let ids = stmt
            .query_map(params![user_id], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn feedback_history(&self, user_id: &str, limit: usize) -> Result<Vec<FeedbackRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM feedback
             WHERE user_id = ?1
             ORDER BY feedback_id DESC
             LIMIT ?2",
        )?;
        let records = stmt
            .query_map(params![user_id, limit], Self::record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}
