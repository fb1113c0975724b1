use crate::{
    config::{DecoderConfig, validate_bbox_fields},
    error::{Result, YoloxError},
    types::{GridCell, Proposal},
};
use common::span;
use ndarray::ArrayViewD;

/// Decodes flat YOLOX head output into confidence-filtered proposals.
#[derive(Debug, Clone)]
pub struct ProposalDecoder {
    config: DecoderConfig,
}

impl ProposalDecoder {
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Decode a flat anchor-major buffer laid out in `grid` order.
    pub fn decode(&self, output: &[f32], grid: &[GridCell]) -> Result<Vec<Proposal>> {
        decode_proposals(
            output,
            grid,
            self.config.num_classes,
            self.config.num_bbox_fields,
            self.config.confidence_threshold,
        )
    }

    /// Decode a `[1, anchors, 5 + classes]` or `[anchors, 5 + classes]` tensor.
    pub fn decode_tensor(
        &self,
        output: &ArrayViewD<f32>,
        grid: &[GridCell],
    ) -> Result<Vec<Proposal>> {
        let shape = output.shape();
        let proposal_length = self.config.proposal_length();

        let valid = match shape {
            [1, _, len] | [_, len] => *len == proposal_length,
            _ => false,
        };
        if !valid {
            return Err(YoloxError::InvalidShape(shape.to_vec()));
        }

        match output.as_slice() {
            Some(flat) => self.decode(flat, grid),
            None => {
                let flat: Vec<f32> = output.iter().copied().collect();
                self.decode(&flat, grid)
            }
        }
    }
}

/// Decode every anchor in `grid` from `output` and keep those whose combined
/// probability is strictly above `confidence_threshold`.
///
/// Anchor `i` reads `output[i * (num_classes + num_bbox_fields)..]`. The result is sorted by
/// probability, highest first; equal probabilities keep anchor order.
#[tracing::instrument(skip(output, grid), fields(anchors = grid.len()))]
pub fn decode_proposals(
    output: &[f32],
    grid: &[GridCell],
    num_classes: usize,
    num_bbox_fields: usize,
    confidence_threshold: f32,
) -> Result<Vec<Proposal>> {
    validate_bbox_fields(num_bbox_fields)?;

    let Some((proposal_length, expected)) = num_classes
        .checked_add(num_bbox_fields)
        .and_then(|len| grid.len().checked_mul(len).map(|total| (len, total)))
    else {
        tracing::error!(num_classes, anchors = grid.len(), "Anchor grid size overflows");
        return Err(YoloxError::InvalidInput {
            expected: usize::MAX,
            actual: output.len(),
        });
    };
    if output.len() != expected {
        tracing::error!(
            expected,
            actual = output.len(),
            "Output buffer does not match anchor grid"
        );
        return Err(YoloxError::InvalidInput {
            expected,
            actual: output.len(),
        });
    }

    let mut proposals: Vec<Proposal> = {
        let _s = span!("decode_anchors");
        grid.iter()
            .zip(output.chunks_exact(proposal_length))
            .filter_map(|(cell, values)| decode_anchor(cell, values, num_bbox_fields))
            .filter(|p| p.probability > confidence_threshold)
            .collect()
    };

    proposals.sort_by(|a, b| b.probability.total_cmp(&a.probability));

    tracing::trace!(proposals = proposals.len(), "Decoded proposals");
    Ok(proposals)
}

/// Decode a single anchor's slice. `None` when there are no classes to score.
fn decode_anchor(cell: &GridCell, values: &[f32], num_bbox_fields: usize) -> Option<Proposal> {
    let stride = cell.stride as f32;

    let center_x = (values[0] + cell.x as f32) * stride;
    let center_y = (values[1] + cell.y as f32) * stride;
    let w = values[2].exp() * stride;
    let h = values[3].exp() * stride;
    let objectness = values[4];

    let (class_index, probability) = best_class(&values[num_bbox_fields..], objectness)?;

    Some(Proposal {
        x: center_x - w / 2.0,
        y: center_y - h / 2.0,
        width: w,
        height: h,
        class_index,
        probability,
    })
}

/// Pick the class maximizing `objectness * score`.
///
/// A later class only replaces the current best on a strictly greater probability, so
/// ties go to the lowest class index and a NaN never displaces an earlier class.
pub fn best_class(class_scores: &[f32], objectness: f32) -> Option<(usize, f32)> {
    class_scores
        .iter()
        .map(|&score| objectness * score)
        .enumerate()
        .fold(None, |best, (index, prob)| match best {
            Some((_, best_prob)) if prob > best_prob => Some((index, prob)),
            Some(_) => best,
            None => Some((index, prob)),
        })
}
