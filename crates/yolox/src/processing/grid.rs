use crate::types::GridCell;

/// Enumerate every anchor position across every stride level.
///
/// Order is strides-outer, rows-middle, columns-inner. This is the order the YOLOX head
/// flattens its output in, so the position of a cell in the returned vector is the anchor
/// index used to slice the output tensor. Dimensions that are not multiples of a stride
/// are truncated by integer division.
#[tracing::instrument(level = "debug")]
pub fn generate_grid(strides: &[u32], height: u32, width: u32) -> Vec<GridCell> {
    let mut grid = Vec::with_capacity(anchor_count(strides, height, width));

    for &stride in strides {
        if stride == 0 {
            tracing::warn!("Skipping zero stride");
            continue;
        }
        for y in 0..height / stride {
            for x in 0..width / stride {
                grid.push(GridCell { x, y, stride });
            }
        }
    }

    tracing::debug!(anchors = grid.len(), "Generated anchor grid");
    grid
}

/// Number of anchors [`generate_grid`] would produce, without allocating.
pub fn anchor_count(strides: &[u32], height: u32, width: u32) -> usize {
    strides
        .iter()
        .filter(|&&stride| stride > 0)
        .map(|&stride| (height / stride) as usize * (width / stride) as usize)
        .sum()
}

/// Crop `(width, height)` down to multiples of the largest stride.
///
/// Must run before [`generate_grid`] is called with real image dimensions.
pub fn crop_input_dims(width: u32, height: u32, strides: &[u32]) -> (u32, u32) {
    match strides.iter().copied().max() {
        Some(max_stride) if max_stride > 0 => {
            (width - width % max_stride, height - height % max_stride)
        }
        _ => (width, height),
    }
}
