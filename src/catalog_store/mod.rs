mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{CandidateFilter, NewTrack, TrackEmbedding};
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;
