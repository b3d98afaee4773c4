//! Shared test fixtures for end-to-end recommender tests.
//!
//! Builds a full engine over temp sqlite files with a small hand-placed
//! catalog in a 2-dimensional embedding space, so similarity scores are
//! easy to reason about in assertions.

use std::sync::Arc;
use tempfile::TempDir;
use vibey_recommender::{
    CatalogStore, InitialPreference, NewTrack, RawFeatures, RecommenderEngine,
    RecommenderSettings, SqliteCatalogStore, SqliteProfileStore, Vibe,
};

pub const USER_ID: &str = "user-1";
pub const OTHER_USER_ID: &str = "user-2";

/// A complete engine with direct handles to its stores for seeding and
/// white-box assertions.
pub struct TestEngine {
    pub engine: RecommenderEngine,
    pub catalog: Arc<SqliteCatalogStore>,
    pub profiles: Arc<SqliteProfileStore>,
    _dir: TempDir,
}

impl TestEngine {
    /// An empty 2-dimensional engine with default rates and zero initial
    /// preference.
    pub fn empty() -> Self {
        Self::with_settings(RecommenderSettings {
            embedding_dim: 2,
            ..RecommenderSettings::default()
        })
    }

    pub fn with_settings(settings: RecommenderSettings) -> Self {
        let dir = TempDir::new().unwrap();
        let catalog = Arc::new(SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap());
        let catalog_mean = if settings.initial_preference == InitialPreference::Mean {
            Some(catalog.mean_vector(settings.embedding_dim).unwrap())
        } else {
            None
        };
        let profiles = Arc::new(
            SqliteProfileStore::new(
                dir.path().join("profile.db"),
                settings.embedding_dim,
                settings.initial_preference,
                catalog_mean,
            )
            .unwrap(),
        );
        let engine = RecommenderEngine::new(
            catalog.clone(),
            profiles.clone(),
            profiles.clone(),
            settings,
        );
        Self {
            engine,
            catalog,
            profiles,
            _dir: dir,
        }
    }

    /// An engine seeded with twelve tracks across four artists, all tagged
    /// chill, spread around the unit circle.
    pub fn seeded() -> Self {
        let fixture = Self::empty();
        for i in 0..12 {
            // Angles within a quarter turn keep all pairwise dots positive.
            let angle = i as f64 * std::f64::consts::FRAC_PI_2 / 12.0;
            fixture.put_track(
                &format!("track-{i}"),
                &format!("artist-{}", i % 4),
                [angle.cos(), angle.sin()],
                &[Vibe::Chill],
            );
        }
        fixture
    }

    pub fn put_track(&self, track_id: &str, artist_id: &str, vector: [f64; 2], vibes: &[Vibe]) {
        self.catalog
            .upsert_track(
                &NewTrack {
                    track_id: track_id.to_string(),
                    artist_id: artist_id.to_string(),
                    vector: vector.to_vec(),
                    raw_features: RawFeatures::default(),
                },
                vibes,
            )
            .unwrap();
    }
}
