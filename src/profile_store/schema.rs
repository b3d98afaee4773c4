//! SQLite schema definitions for the user profile database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

/// One preference vector per user, stored as a JSON array.
const USER_PREFERENCE_TABLE: Table = Table {
    name: "user_preference",
    columns: &[
        sqlite_column!("user_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("vector", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!(
            "updated",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// Append-only feedback log; rows are only ever mutated to flip `undone`.
const FEEDBACK_TABLE: Table = Table {
    name: "feedback",
    columns: &[
        sqlite_column!("feedback_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("track_id", &SqlType::Text, non_null = true),
        sqlite_column!("action", &SqlType::Text, non_null = true),
        sqlite_column!("delta", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("undone", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_feedback_user", "user_id")],
    unique_constraints: &[],
};

pub const PROFILE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USER_PREFERENCE_TABLE, FEEDBACK_TABLE],
    migration: None,
}];
