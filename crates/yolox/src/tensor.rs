//! Raw tensor dumps: the output buffer written as consecutive native-endian `f32` values.

use crate::error::{Result, YoloxError};
use std::path::Path;

const F32_SIZE: usize = size_of::<f32>();

/// Reinterpret raw bytes as `f32` values. The length must be a whole number of values.
pub fn tensor_from_bytes(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % F32_SIZE != 0 {
        return Err(YoloxError::ResourceLoad(format!(
            "tensor dump is {} bytes, not a whole number of f32 values",
            bytes.len()
        )));
    }
    // Copies, so the byte buffer does not need f32 alignment.
    Ok(bytemuck::pod_collect_to_vec(bytes))
}

/// Read a raw tensor dump from disk.
pub fn read_tensor(path: impl AsRef<Path>) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let values = tensor_from_bytes(&bytes)?;
    tracing::debug!(path = %path.display(), values = values.len(), "Read tensor dump");
    Ok(values)
}
