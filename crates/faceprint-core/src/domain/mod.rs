//! Core domain types for face embedding extraction.

mod embedding;
mod record;

pub use embedding::{Embedding, EMBEDDING_SIZE};
pub use record::{EmbeddingRecord, ImageDimensions, ImageInfo};
