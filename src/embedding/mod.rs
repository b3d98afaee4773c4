mod model;
mod vector;

pub use model::{EmbeddingModel, RawFeatures};
pub use vector::{dot, l2_norm, l2_normalize};
