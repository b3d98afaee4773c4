//! The recommender engine facade.
//!
//! Ties the catalog, preference and feedback stores together behind the
//! three operations an outer transport layer consumes: feed generation,
//! feedback application and taxonomy listing.

mod models;
mod ranker;
mod user_locks;

pub use models::{FeedEntry, FeedMode, FeedRequest};

use crate::catalog_store::{CatalogStore, NewTrack};
use crate::config::{RecommenderSettings, MAX_FEED_SIZE, MIN_FEED_SIZE};
use crate::embedding::{EmbeddingModel, RawFeatures};
use crate::error::RecommenderError;
use crate::profile_store::{FeedbackAction, FeedbackRecord, FeedbackStore, PreferenceStore};
use crate::vibes::{self, Vibe, VibeTag};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::debug;
use user_locks::UserLocks;

pub struct RecommenderEngine {
    catalog: Arc<dyn CatalogStore>,
    preferences: Arc<dyn PreferenceStore>,
    feedback: Arc<dyn FeedbackStore>,
    embedding: EmbeddingModel,
    settings: RecommenderSettings,
    user_locks: UserLocks,
}

impl RecommenderEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        preferences: Arc<dyn PreferenceStore>,
        feedback: Arc<dyn FeedbackStore>,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            catalog,
            preferences,
            feedback,
            embedding: EmbeddingModel::new(settings.embedding_dim),
            settings,
            user_locks: UserLocks::new(),
        }
    }

    /// The vibe taxonomy, ordered by name.
    pub fn get_vibes(&self) -> Result<Vec<VibeTag>, RecommenderError> {
        Ok(self.catalog.list_vibe_tags()?)
    }

    /// Embed a track's raw features and add it to the catalog, replacing
    /// any existing track with the same id and recomputing its vibes.
    pub fn ingest_track(
        &self,
        track_id: &str,
        artist_id: &str,
        features: &RawFeatures,
    ) -> Result<(), RecommenderError> {
        let vector = self.embedding.embed(features);
        let assigned = vibes::classify(features);
        self.catalog.upsert_track(
            &NewTrack {
                track_id: track_id.to_string(),
                artist_id: artist_id.to_string(),
                vector,
                raw_features: features.clone(),
            },
            &assigned,
        )?;
        debug!(track_id, artist_id, vibes = assigned.len(), "Ingested track");
        Ok(())
    }

    /// Apply one feedback action to a user's preference vector.
    ///
    /// Same-user calls are serialized through a per-user lock so no update
    /// can be lost to a race; unrelated users proceed in parallel. For
    /// `Undo` the `track_id` argument is ignored: undo always targets the
    /// most recent record with `undone = false`.
    pub fn apply_feedback(
        &self,
        user_id: &str,
        track_id: &str,
        action: FeedbackAction,
    ) -> Result<FeedbackRecord, RecommenderError> {
        let lock = self.user_locks.user_lock(user_id);
        let _guard = lock.lock().unwrap();

        if action == FeedbackAction::Undo {
            return self.undo_locked(user_id);
        }

        let track = self
            .catalog
            .get_track(track_id)?
            .ok_or_else(|| RecommenderError::TrackNotFound(track_id.to_string()))?;

        let rate = match action {
            FeedbackAction::Like => self.settings.alpha_like,
            FeedbackAction::Dislike => -self.settings.beta_dislike,
            FeedbackAction::MoreLikeThis => self.settings.gamma_more_like,
            FeedbackAction::Undo => unreachable!("handled above"),
        };
        let delta: Vec<f64> = track.vector.iter().map(|v| v * rate).collect();

        self.preferences.apply_delta(user_id, &delta)?;
        let record = self
            .feedback
            .append_feedback(user_id, track_id, action, &delta)?;
        // Feedback implies exposure
        self.catalog.mark_seen(user_id, track_id)?;

        debug!(user_id, track_id, action = action.as_str(), "Applied feedback");
        Ok(record)
    }

    /// Reverse the most recent non-undone record. Runs under the caller's
    /// per-user lock. Chained undos walk backwards through the log, one
    /// distinct record per call; nothing new is appended, so an undo can
    /// never itself be undone.
    fn undo_locked(&self, user_id: &str) -> Result<FeedbackRecord, RecommenderError> {
        let record = self
            .feedback
            .last_active_feedback(user_id)?
            .ok_or(RecommenderError::NoHistory)?;

        let inverse: Vec<f64> = record.delta_applied.iter().map(|d| -d).collect();
        self.preferences.apply_delta(user_id, &inverse)?;
        self.feedback.mark_undone(record.feedback_id)?;

        debug!(
            user_id,
            feedback_id = record.feedback_id,
            "Reversed feedback record"
        );
        Ok(FeedbackRecord {
            undone: true,
            ..record
        })
    }

    /// Generate a feed for a user. Every returned track is marked seen
    /// before the call returns.
    pub fn get_feed(
        &self,
        user_id: &str,
        request: &FeedRequest,
    ) -> Result<Vec<FeedEntry>, RecommenderError> {
        let limit = request.limit.unwrap_or(self.settings.default_feed_size);
        if !(MIN_FEED_SIZE..=MAX_FEED_SIZE).contains(&limit) {
            return Err(RecommenderError::InvalidLimit(limit));
        }

        // The feed mutates the seen set, so it serializes against the same
        // user's feedback; other users are unaffected.
        let lock = self.user_locks.user_lock(user_id);
        let _guard = lock.lock().unwrap();

        let preference = self.preferences.get(user_id)?;
        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let entries = match request.mode {
            FeedMode::Explore => ranker::explore_feed(
                self.catalog.as_ref(),
                &preference,
                user_id,
                limit,
                self.settings.explore_candidate_multiplier,
                self.settings.diversity_artist_penalty,
                &mut rng,
            )?,
            FeedMode::Vibe(vibe_id) => {
                let vibe =
                    Vibe::from_id(vibe_id).ok_or(RecommenderError::InvalidVibe(vibe_id))?;
                ranker::vibe_feed(
                    self.catalog.as_ref(),
                    self.feedback.as_ref(),
                    &preference,
                    user_id,
                    vibe,
                    limit,
                    self.settings.vibe_unseen_ratio,
                    &mut rng,
                )?
            }
        };

        for entry in &entries {
            self.catalog.mark_seen(user_id, &entry.track_id)?;
        }

        debug!(user_id, returned = entries.len(), "Generated feed");
        Ok(entries)
    }

    /// A user's feedback log, newest first, including undone records.
    pub fn get_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>, RecommenderError> {
        Ok(self.feedback.feedback_history(user_id, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::SqliteCatalogStore;
    use crate::config::InitialPreference;
    use crate::embedding::{dot, l2_norm};
    use crate::profile_store::SqliteProfileStore;
    use tempfile::tempdir;

    /// Engine over a 2-dimensional embedding space with hand-placed
    /// tracks, so scores are easy to reason about.
    fn test_engine(dir: &tempfile::TempDir) -> RecommenderEngine {
        let settings = RecommenderSettings {
            embedding_dim: 2,
            ..RecommenderSettings::default()
        };
        let catalog =
            Arc::new(SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap());
        let profiles = Arc::new(
            SqliteProfileStore::new(
                dir.path().join("profile.db"),
                2,
                InitialPreference::Zero,
                None,
            )
            .unwrap(),
        );
        RecommenderEngine::new(catalog.clone(), profiles.clone(), profiles, settings)
    }

    fn put_track(engine: &RecommenderEngine, track_id: &str, artist_id: &str, vector: [f64; 2]) {
        engine
            .catalog
            .upsert_track(
                &NewTrack {
                    track_id: track_id.to_string(),
                    artist_id: artist_id.to_string(),
                    vector: vector.to_vec(),
                    raw_features: RawFeatures::default(),
                },
                &[],
            )
            .unwrap();
    }

    #[test]
    fn test_feedback_moves_preference_toward_track() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        put_track(&engine, "t1", "a1", [1.0, 0.0]);

        engine
            .apply_feedback("u1", "t1", FeedbackAction::Like)
            .unwrap();
        let preference = engine.preferences.get("u1").unwrap();
        assert!((l2_norm(&preference) - 1.0).abs() < 1e-9);
        assert!(dot(&preference, &[1.0, 0.0]) > 0.9);

        // Feedback implies exposure
        assert!(engine.catalog.is_seen("u1", "t1").unwrap());
    }

    #[test]
    fn test_dislike_pushes_away() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        put_track(&engine, "t1", "a1", [1.0, 0.0]);

        engine
            .apply_feedback("u1", "t1", FeedbackAction::Dislike)
            .unwrap();
        let preference = engine.preferences.get("u1").unwrap();
        assert!(dot(&preference, &[1.0, 0.0]) < 0.0);
    }

    #[test]
    fn test_feedback_unknown_track_fails() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        let result = engine.apply_feedback("u1", "nope", FeedbackAction::Like);
        assert!(matches!(result, Err(RecommenderError::TrackNotFound(_))));
    }

    #[test]
    fn test_undo_restores_previous_vector() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        put_track(&engine, "t1", "a1", [1.0, 0.0]);
        put_track(&engine, "t2", "a2", [0.0, 1.0]);

        engine
            .apply_feedback("u1", "t1", FeedbackAction::Like)
            .unwrap();
        let before = engine.preferences.get("u1").unwrap();

        engine
            .apply_feedback("u1", "t2", FeedbackAction::Like)
            .unwrap();
        let undone = engine
            .apply_feedback("u1", "", FeedbackAction::Undo)
            .unwrap();
        assert!(undone.undone);
        assert_eq!(undone.track_id, "t2");

        let after = engine.preferences.get("u1").unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_chained_undo_reverses_distinct_records() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        put_track(&engine, "t1", "a1", [1.0, 0.0]);
        put_track(&engine, "t2", "a2", [0.0, 1.0]);
        put_track(&engine, "t3", "a3", [0.7, 0.7]);

        for track in ["t1", "t2", "t3"] {
            engine
                .apply_feedback("u1", track, FeedbackAction::Like)
                .unwrap();
        }

        let first_undo = engine
            .apply_feedback("u1", "", FeedbackAction::Undo)
            .unwrap();
        let second_undo = engine
            .apply_feedback("u1", "", FeedbackAction::Undo)
            .unwrap();
        // Two consecutive undos reverse the 3rd then the 2nd record
        assert_eq!(first_undo.track_id, "t3");
        assert_eq!(second_undo.track_id, "t2");
        assert_ne!(first_undo.feedback_id, second_undo.feedback_id);
    }

    #[test]
    fn test_undo_without_history_fails() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        let result = engine.apply_feedback("u1", "", FeedbackAction::Undo);
        assert!(matches!(result, Err(RecommenderError::NoHistory)));
    }

    #[test]
    fn test_undo_does_not_unsee() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        put_track(&engine, "t1", "a1", [1.0, 0.0]);

        engine
            .apply_feedback("u1", "t1", FeedbackAction::Like)
            .unwrap();
        engine
            .apply_feedback("u1", "", FeedbackAction::Undo)
            .unwrap();
        assert!(engine.catalog.is_seen("u1", "t1").unwrap());
    }

    #[test]
    fn test_feed_limit_bounds() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        put_track(&engine, "t1", "a1", [1.0, 0.0]);

        assert!(engine.get_feed("u1", &FeedRequest::explore(0)).is_err());
        assert!(engine.get_feed("u1", &FeedRequest::explore(51)).is_err());
        assert!(engine.get_feed("u2", &FeedRequest::explore(1)).is_ok());
        assert!(engine.get_feed("u3", &FeedRequest::explore(50)).is_ok());
    }

    #[test]
    fn test_feed_invalid_vibe() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        let result = engine.get_feed("u1", &FeedRequest::vibe(99, 5));
        assert!(matches!(result, Err(RecommenderError::InvalidVibe(99))));
    }

    #[test]
    fn test_explore_diversity_penalty_demotes_repeated_artist() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        // Artist X dominates on raw score; artist Y is close behind.
        put_track(&engine, "x1", "artist_x", [1.0, 0.0]);
        put_track(&engine, "x2", "artist_x", [0.98, 0.199]);
        put_track(&engine, "x3", "artist_x", [0.96, 0.28]);
        put_track(&engine, "y1", "artist_y", [0.9, 0.436]);

        // Preference ends up pointing at [1, 0] and x1 becomes seen
        engine
            .apply_feedback("u1", "x1", FeedbackAction::Like)
            .unwrap();
        // u1 has now seen x1; remaining unseen pool is x2, x3, y1 with raw
        // scores 0.98, 0.96 and 0.9. After picking x2, the 0.3 penalty
        // drops x3 to 0.66, so y1 must come second.
        let feed = engine
            .get_feed("u1", &FeedRequest::explore(2).with_seed(7))
            .unwrap();
        let ids: Vec<&str> = feed.iter().map(|e| e.track_id.as_str()).collect();
        assert_eq!(ids, vec!["x2", "y1"]);
    }

    #[test]
    fn test_get_history() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        put_track(&engine, "t1", "a1", [1.0, 0.0]);
        put_track(&engine, "t2", "a2", [0.0, 1.0]);

        engine
            .apply_feedback("u1", "t1", FeedbackAction::Like)
            .unwrap();
        engine
            .apply_feedback("u1", "t2", FeedbackAction::Dislike)
            .unwrap();

        let history = engine.get_history("u1", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].track_id, "t2");
        assert_eq!(history[0].action, FeedbackAction::Dislike);
    }

    #[test]
    fn test_get_vibes_full_taxonomy() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        let tags = engine.get_vibes().unwrap();
        assert_eq!(tags.len(), 6);
    }

    #[test]
    fn test_ingest_track_embeds_and_classifies() {
        let dir = tempdir().unwrap();
        let engine = test_engine(&dir);
        let features = RawFeatures {
            energy: 0.9,
            danceability: 0.8,
            valence: 0.7,
            ..RawFeatures::default()
        };
        engine.ingest_track("t1", "a1", &features).unwrap();

        let track = engine.catalog.get_track("t1").unwrap().unwrap();
        assert_eq!(track.vector.len(), 2);
        assert!((l2_norm(&track.vector) - 1.0).abs() < 1e-9);
        let assigned = engine.catalog.track_vibes("t1").unwrap();
        assert!(assigned.contains(&Vibe::Energetic));
        assert!(assigned.contains(&Vibe::Party));
    }
}
