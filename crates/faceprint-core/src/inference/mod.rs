//! Inference engine: backend selection, weight loading, preprocessing,
//! and the embedding network itself.

mod backend;
mod facenet;
mod loader;
pub mod preprocess;

pub use backend::{Backend, CPU_THREADS};
pub use facenet::{weight_shapes, MobileFaceNet};
pub use loader::load_weights;

#[cfg(test)]
pub(crate) use facenet::fixture;
