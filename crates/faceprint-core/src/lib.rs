//! Faceprint Core - Face embedding extraction engine
//!
//! This crate contains the domain types, the inference engine (backend
//! selection, weight loading, pixel normalization, embedding network),
//! and the `FaceEmbedder` lifecycle facade.

pub mod domain;
mod embedder;
pub mod inference;
pub mod ports;

pub use domain::{Embedding, EmbeddingRecord, ImageDimensions, ImageInfo, EMBEDDING_SIZE};
pub use embedder::{ExtractError, FaceEmbedder, LoadState};
pub use inference::{Backend, CPU_THREADS};
pub use ports::{ImageSource, ProgressEvent, ProgressSink, RecordOutput};
