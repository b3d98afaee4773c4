//! SQLite-backed catalog store implementation.

use super::models::{CandidateFilter, NewTrack, TrackEmbedding};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::embedding::{l2_normalize, RawFeatures};
use crate::sqlite_persistence::migrate_if_needed;
use crate::vibes::{Vibe, VibeTag};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed catalog store.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let mut conn = Connection::open(db_path.as_ref()).context("Failed to open catalog database")?;

        migrate_if_needed(&mut conn, CATALOG_VERSIONED_SCHEMAS, "catalog")?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on catalog database")?;

        Self::seed_vibes(&conn)?;

        let tracks: usize = conn.query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))?;
        info!("Catalog store ready: {} tracks", tracks);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn seed_vibes(conn: &Connection) -> Result<()> {
        for vibe in Vibe::ALL {
            conn.execute(
                "INSERT OR IGNORE INTO vibes (vibe_id, name, description, color) VALUES (?1, ?2, ?3, ?4)",
                params![vibe.id(), vibe.name(), vibe.description(), vibe.color()],
            )?;
        }
        Ok(())
    }

    fn track_from_row(row: &rusqlite::Row) -> rusqlite::Result<TrackEmbedding> {
        let vector_json: String = row.get("vector")?;
        let vector: Vec<f64> = serde_json::from_str(&vector_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(TrackEmbedding {
            position: row.get("position")?,
            track_id: row.get("track_id")?,
            artist_id: row.get("artist_id")?,
            vector,
            raw_features: RawFeatures {
                acousticness: row.get("acousticness")?,
                danceability: row.get("danceability")?,
                energy: row.get("energy")?,
                instrumentalness: row.get("instrumentalness")?,
                liveness: row.get("liveness")?,
                loudness: row.get("loudness")?,
                speechiness: row.get("speechiness")?,
                valence: row.get("valence")?,
                tempo: row.get("tempo")?,
            },
        })
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get_track(&self, track_id: &str) -> Result<Option<TrackEmbedding>> {
        let conn = self.conn.lock().unwrap();
        let track = conn
            .query_row(
                "SELECT * FROM tracks WHERE track_id = ?1",
                params![track_id],
                Self::track_from_row,
            )
            .optional()?;
        Ok(track)
    }

    fn list_candidates(&self, filter: &CandidateFilter) -> Result<Vec<TrackEmbedding>> {
        let conn = self.conn.lock().unwrap();
        let tracks = match (filter.vibe, filter.unseen_by.as_deref()) {
            (None, None) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM tracks ORDER BY position"
                )?;
                let rows = stmt.query_map([], Self::track_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            (Some(vibe), None) => {
                let mut stmt = conn.prepare(
                    "SELECT tracks.* FROM tracks
                     INNER JOIN track_vibes ON tracks.track_id = track_vibes.track_id
                     WHERE track_vibes.vibe_id = ?1
                     ORDER BY position"
                )?;
                let rows = stmt.query_map(params![vibe.id()], Self::track_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            (None, Some(user_id)) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM tracks
                     WHERE track_id NOT IN (
                         SELECT track_id FROM seen_tracks WHERE user_id = ?1
                     )
                     ORDER BY position"
                )?;
                let rows = stmt.query_map(params![user_id], Self::track_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            (Some(vibe), Some(user_id)) => {
                let mut stmt = conn.prepare(
                    "SELECT tracks.* FROM tracks
                     INNER JOIN track_vibes ON tracks.track_id = track_vibes.track_id
                     WHERE track_vibes.vibe_id = ?1
                     AND tracks.track_id NOT IN (
                         SELECT track_id FROM seen_tracks WHERE user_id = ?2
                     )
                     ORDER BY position"
                )?;
                let rows = stmt.query_map(params![vibe.id(), user_id], Self::track_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(tracks)
    }

    fn tracks_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))?)
    }

    fn upsert_track(&self, track: &NewTrack, vibes: &[Vibe]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM tracks WHERE track_id = ?1",
            params![track.track_id],
        )?;
        tx.execute(
            "DELETE FROM track_vibes WHERE track_id = ?1",
            params![track.track_id],
        )?;

        let f = &track.raw_features;
        tx.execute(
            "INSERT INTO tracks (track_id, artist_id, vector, acousticness, danceability, energy, \
             instrumentalness, liveness, loudness, speechiness, valence, tempo)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                track.track_id,
                track.artist_id,
                serde_json::to_string(&track.vector)?,
                f.acousticness,
                f.danceability,
                f.energy,
                f.instrumentalness,
                f.liveness,
                f.loudness,
                f.speechiness,
                f.valence,
                f.tempo,
            ],
        )?;

        for vibe in vibes {
            tx.execute(
                "INSERT INTO track_vibes (track_id, vibe_id) VALUES (?1, ?2)",
                params![track.track_id, vibe.id()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn track_vibes(&self, track_id: &str) -> Result<Vec<Vibe>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT vibe_id FROM track_vibes WHERE track_id = ?1 ORDER BY vibe_id",
        )?;
        let ids = stmt
            .query_map(params![track_id], |r| r.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let mut vibes = Vec::with_capacity(ids.len());
        for id in ids {
            match Vibe::from_id(id) {
                Some(vibe) => vibes.push(vibe),
                None => bail!("Unknown vibe id {} stored for track {}", id, track_id),
            }
        }
        Ok(vibes)
    }

    fn mean_vector(&self, dim: usize) -> Result<Vec<f64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT vector FROM tracks")?;
        let vectors = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut mean = vec![0.0f64; dim];
        if vectors.is_empty() {
            return Ok(mean);
        }
        for vector_json in &vectors {
            let vector: Vec<f64> = serde_json::from_str(vector_json)?;
            if vector.len() != dim {
                bail!(
                    "Catalog vector dimension mismatch: expected {}, got {}",
                    dim,
                    vector.len()
                );
            }
            for (slot, value) in mean.iter_mut().zip(vector.iter()) {
                *slot += value;
            }
        }
        let count = vectors.len() as f64;
        for slot in mean.iter_mut() {
            *slot /= count;
        }
        l2_normalize(&mut mean);
        Ok(mean)
    }

    fn mark_seen(&self, user_id: &str, track_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO seen_tracks (user_id, track_id) VALUES (?1, ?2)",
            params![user_id, track_id],
        )?;
        Ok(())
    }

    fn is_seen(&self, user_id: &str, track_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let seen = conn
            .query_row(
                "SELECT 1 FROM seen_tracks WHERE user_id = ?1 AND track_id = ?2",
                params![user_id, track_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(seen.is_some())
    }

    fn list_vibe_tags(&self) -> Result<Vec<VibeTag>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT vibe_id, name, description, color FROM vibes ORDER BY name")?;
        let tags = stmt
            .query_map([], |r| {
                Ok(VibeTag {
                    vibe_id: r.get(0)?,
                    name: r.get(1)?,
                    description: r.get(2)?,
                    color: r.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }
}
