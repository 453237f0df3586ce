//! Synthetic weight files for integration tests.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use safetensors::tensor::TensorView;

/// Writes a weight file matching the network's tensor manifest, with every
/// tensor zeroed. Loads cleanly and produces deterministic (all-zero)
/// embeddings, which is enough to exercise the full pipeline.
pub fn write_zeroed_weights(path: &Path) -> Result<()> {
    let shapes = faceprint_core::inference::weight_shapes();
    let buffers: Vec<Vec<u8>> = shapes
        .iter()
        .map(|(_, shape)| vec![0u8; shape.iter().product::<usize>() * 4])
        .collect();

    let mut tensors = HashMap::new();
    for ((name, shape), data) in shapes.iter().zip(&buffers) {
        let view = TensorView::new(safetensors::Dtype::F32, shape.clone(), data)?;
        tensors.insert(name.clone(), view);
    }

    let serialized = safetensors::serialize(tensors, &None)?;
    std::fs::write(path, serialized)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_file_is_valid_safetensors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.safetensors");
        write_zeroed_weights(&path).unwrap();

        let data = std::fs::read(&path).unwrap();
        let parsed = safetensors::SafeTensors::deserialize(&data).unwrap();
        assert!(!parsed.names().is_empty());
    }
}
