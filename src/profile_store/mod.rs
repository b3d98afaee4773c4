mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{FeedbackAction, FeedbackRecord};
pub use store::SqliteProfileStore;
pub use trait_def::{FeedbackStore, PreferenceStore};
