//! Face embedder lifecycle: load, extract, release.

use std::path::Path;

use anyhow::Result;
use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::domain::Embedding;
use crate::inference::{load_weights, Backend, MobileFaceNet};

/// Outcome of the most recent lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// A session is attached and ready.
    Loaded,
    /// Loading failed; the embedder stays unloaded.
    Failed {
        /// Why the load failed.
        reason: String,
    },
    /// Resources were torn down via [`FaceEmbedder::release`].
    Released,
}

/// Why an extraction produced no embedding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// No session is attached (load failed or already released).
    #[error("no model is loaded")]
    NotLoaded,
    /// The runtime failed while embedding the image.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Owns the embedding session and its backend resources.
///
/// Construction never fails: a load error is logged and leaves the
/// embedder observable as unloaded, with the reason kept in
/// [`LoadState::Failed`]. All operations are synchronous; the type is
/// not internally synchronized, so concurrent use of one instance must
/// be serialized by the caller.
pub struct FaceEmbedder {
    session: Option<MobileFaceNet>,
    backend: Backend,
    state: LoadState,
}

impl FaceEmbedder {
    /// Loads the model from `model_path` on an automatically selected
    /// backend.
    #[must_use]
    pub fn load(model_path: impl AsRef<Path>) -> Self {
        Self::load_with_backend(model_path, Backend::select())
    }

    /// Loads the model on a specific backend.
    #[must_use]
    pub fn load_with_backend(model_path: impl AsRef<Path>, backend: Backend) -> Self {
        let path = model_path.as_ref();
        match Self::build_session(path, &backend) {
            Ok(session) => {
                info!(
                    "Model loaded from {} on {} backend",
                    path.display(),
                    backend.name()
                );
                Self {
                    session: Some(session),
                    backend,
                    state: LoadState::Loaded,
                }
            }
            Err(e) => {
                warn!("Model load failed for {}: {e:#}", path.display());
                Self {
                    session: None,
                    backend,
                    state: LoadState::Failed {
                        reason: format!("{e:#}"),
                    },
                }
            }
        }
    }

    fn build_session(path: &Path, backend: &Backend) -> Result<MobileFaceNet> {
        let vb = load_weights(path, &backend.device())?;
        MobileFaceNet::new(vb)
    }

    /// Extracts a 512-dimensional L2-normalized embedding from an image.
    ///
    /// Blocks until preprocessing and inference complete.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::NotLoaded`] when no session is attached.
    /// - [`ExtractError::Inference`] when the runtime fails; the error
    ///   is also logged.
    pub fn extract_features(&self, image: &DynamicImage) -> Result<Embedding, ExtractError> {
        let Some(session) = self.session.as_ref() else {
            return Err(ExtractError::NotLoaded);
        };

        session.embed(image).map_err(|e| {
            warn!("Feature extraction failed: {e:#}");
            ExtractError::Inference(format!("{e:#}"))
        })
    }

    /// Returns true while a session is attached.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the outcome of the last lifecycle transition.
    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.state
    }

    /// Returns the backend this embedder was constructed with.
    #[must_use]
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Tears down the session and its backend resources.
    ///
    /// Idempotent: safe to call repeatedly and safe on an embedder that
    /// never loaded.
    pub fn release(&mut self) {
        if self.session.take().is_some() {
            debug!("Embedding session released");
        }
        self.state = LoadState::Released;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    use crate::domain::EMBEDDING_SIZE;
    use crate::inference::fixture;

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(96, 96, |x, y| {
            Rgb([(x * 2 % 256) as u8, (y * 2 % 256) as u8, 200])
        }))
    }

    fn loaded_embedder(dir: &tempfile::TempDir) -> FaceEmbedder {
        let path = dir.path().join("faceprint.safetensors");
        fixture::write_zeroed_weights(&path).unwrap();
        FaceEmbedder::load_with_backend(&path, Backend::threaded_cpu())
    }

    #[test]
    fn test_missing_model_collapses_to_unloaded() {
        let embedder = FaceEmbedder::load("/nonexistent/faceprint.safetensors");
        assert!(!embedder.is_loaded());
        assert!(matches!(embedder.load_state(), LoadState::Failed { .. }));
    }

    #[test]
    fn test_corrupt_model_collapses_to_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.safetensors");
        std::fs::write(&path, b"definitely not weights").unwrap();

        let embedder = FaceEmbedder::load_with_backend(&path, Backend::threaded_cpu());
        assert!(!embedder.is_loaded());
        let LoadState::Failed { reason } = embedder.load_state() else {
            panic!("expected failed state");
        };
        assert!(!reason.is_empty());
    }

    #[test]
    fn test_extract_without_model_is_tagged() {
        let embedder = FaceEmbedder::load("/nonexistent/faceprint.safetensors");
        let result = embedder.extract_features(&test_image());
        assert_eq!(result.unwrap_err(), ExtractError::NotLoaded);
    }

    #[test]
    fn test_loaded_embedder_extracts_fixed_length() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = loaded_embedder(&dir);
        assert!(embedder.is_loaded());
        assert_eq!(*embedder.load_state(), LoadState::Loaded);

        let embedding = embedder.extract_features(&test_image()).unwrap();
        assert_eq!(embedding.len(), EMBEDDING_SIZE);
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut embedder = loaded_embedder(&dir);
        assert!(embedder.is_loaded());

        embedder.release();
        assert!(!embedder.is_loaded());
        assert_eq!(*embedder.load_state(), LoadState::Released);

        embedder.release();
        assert!(!embedder.is_loaded());
    }

    #[test]
    fn test_extract_after_release_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let mut embedder = loaded_embedder(&dir);
        embedder.release();

        let result = embedder.extract_features(&test_image());
        assert_eq!(result.unwrap_err(), ExtractError::NotLoaded);
    }

    #[test]
    fn test_release_never_loaded_is_safe() {
        let mut embedder = FaceEmbedder::load("/nonexistent/faceprint.safetensors");
        embedder.release();
        embedder.release();
        assert!(!embedder.is_loaded());
    }
}
