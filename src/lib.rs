//! Vibey Recommender Library
//!
//! Preference-learning and feed-ranking engine for music tracks. The engine
//! maintains a per-user preference vector in an embedding space, updates it
//! online from user feedback (with exact undo), and ranks candidate tracks
//! into explore-mode and vibe-mode feeds.
//!
//! HTTP transport, authentication, session handling, and playback-source
//! resolution are deliberately out of scope; an outer server layer consumes
//! [`recommender::RecommenderEngine`] directly.

pub mod catalog_store;
pub mod config;
pub mod embedding;
pub mod error;
pub mod profile_store;
pub mod recommender;
pub mod sqlite_persistence;
pub mod vibes;

// Re-export commonly used types for convenience
pub use catalog_store::{
    CandidateFilter, CatalogStore, NewTrack, SqliteCatalogStore, TrackEmbedding,
};
pub use config::{InitialPreference, RecommenderSettings};
pub use embedding::{EmbeddingModel, RawFeatures};
pub use error::RecommenderError;
pub use profile_store::{
    FeedbackAction, FeedbackRecord, FeedbackStore, PreferenceStore, SqliteProfileStore,
};
pub use recommender::{FeedEntry, FeedMode, FeedRequest, RecommenderEngine};
pub use vibes::{Vibe, VibeTag};
