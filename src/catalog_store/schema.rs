//! SQLite schema definitions for the catalog database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

/// Track table. `position` aliases the rowid and records insertion order,
/// which ranking uses as its tie-break.
const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("position", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("track_id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("artist_id", &SqlType::Text, non_null = true),
        sqlite_column!("vector", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("acousticness", &SqlType::Real, non_null = true),
        sqlite_column!("danceability", &SqlType::Real, non_null = true),
        sqlite_column!("energy", &SqlType::Real, non_null = true),
        sqlite_column!("instrumentalness", &SqlType::Real, non_null = true),
        sqlite_column!("liveness", &SqlType::Real, non_null = true),
        sqlite_column!("loudness", &SqlType::Real, non_null = true),
        sqlite_column!("speechiness", &SqlType::Real, non_null = true),
        sqlite_column!("valence", &SqlType::Real, non_null = true),
        sqlite_column!("tempo", &SqlType::Real, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_tracks_artist", "artist_id")],
    unique_constraints: &[],
};

/// Vibe taxonomy table, seeded at store creation.
const VIBES_TABLE: Table = Table {
    name: "vibes",
    columns: &[
        sqlite_column!("vibe_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!("color", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// Track-to-vibe membership, recomputed on every (re-)ingestion.
const TRACK_VIBES_TABLE: Table = Table {
    name: "track_vibes",
    columns: &[
        sqlite_column!("track_id", &SqlType::Text, non_null = true),
        sqlite_column!("vibe_id", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_track_vibes_vibe", "vibe_id")],
    unique_constraints: &[&["track_id", "vibe_id"]],
};

/// Per-user seen set. Grows monotonically; there is no removal path.
const SEEN_TRACKS_TABLE: Table = Table {
    name: "seen_tracks",
    columns: &[
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("track_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "seen_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_seen_tracks_user", "user_id")],
    unique_constraints: &[&["user_id", "track_id"]],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        TRACKS_TABLE,
        VIBES_TABLE,
        TRACK_VIBES_TABLE,
        SEEN_TRACKS_TABLE,
    ],
    migration: None,
}];
