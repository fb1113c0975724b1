use common::span_debug;

use crate::{
    error::{IndexKind, Result, YoloxError},
    labels::LabelTable,
    types::{DetectionBox, LabeledProposal},
};

/// Attach label and color to the proposals picked by an external ranking step.
///
/// Output order follows `indices`. An index past the end of `proposals`, or a class index
/// past the end of `table`, is an error rather than a default label.
pub fn select_labeled<B>(
    proposals: &[B],
    indices: &[usize],
    table: &LabelTable,
) -> Result<Vec<LabeledProposal<B>>>
where
    B: DetectionBox + Clone,
{
    let _s = span_debug!("select_labeled");

    indices
        .iter()
        .map(|&index| -> Result<LabeledProposal<B>> {
            let bbox = proposals.get(index).ok_or(YoloxError::IndexOutOfRange {
                kind: IndexKind::Proposal,
                index,
                len: proposals.len(),
            })?;
            let entry = table.get(bbox.class_index())?;

            Ok(LabeledProposal {
                bbox: bbox.clone(),
                label: entry.label.clone(),
                color: entry.color,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        labels::LabelEntry,
        types::{Color, Proposal},
    };

    fn table() -> LabelTable {
        LabelTable::new(vec![
            LabelEntry {
                label: "person".to_string(),
                color: Color::rgb(1.0, 0.0, 0.0),
            },
            LabelEntry {
                label: "bicycle".to_string(),
                color: Color::rgb(0.0, 1.0, 0.0),
            },
        ])
    }

    fn proposal(class_index: usize, probability: f32) -> Proposal {
        Proposal {
            x: 0.0,
            y: 0.0,
            width: 8.0,
            height: 8.0,
            class_index,
            probability,
        }
    }

    /// Box type other than [`Proposal`] to exercise the trait seam.
    #[derive(Debug, Clone, PartialEq)]
    struct FixedBox {
        class: usize,
    }

    impl DetectionBox for FixedBox {
        fn x(&self) -> f32 {
            1.0
        }
        fn y(&self) -> f32 {
            2.0
        }
        fn width(&self) -> f32 {
            3.0
        }
        fn height(&self) -> f32 {
            4.0
        }
        fn class_index(&self) -> usize {
            self.class
        }
        fn probability(&self) -> f32 {
            0.9
        }
    }

    #[test]
    fn test_preserves_index_order() {
        let proposals = vec![proposal(0, 0.9), proposal(1, 0.8), proposal(0, 0.7)];

        let selected = select_labeled(&proposals, &[2, 0, 1], &table()).unwrap();

        let probs: Vec<f32> = selected.iter().map(|s| s.bbox.probability).collect();
        assert_eq!(probs, vec![0.7, 0.9, 0.8]);
        let labels: Vec<&str> = selected.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["person", "person", "bicycle"]);
        assert_eq!(selected[2].color, Color::rgb(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_duplicate_and_empty_indices() {
        let proposals = vec![proposal(1, 0.9)];
        assert_eq!(select_labeled(&proposals, &[0, 0], &table()).unwrap().len(), 2);
        assert!(select_labeled(&proposals, &[], &table()).unwrap().is_empty());
    }

    #[test]
    fn test_proposal_index_out_of_range() {
        let proposals = vec![proposal(0, 0.9)];

        match select_labeled(&proposals, &[0, 1], &table()) {
            Err(YoloxError::IndexOutOfRange { kind, index, len }) => {
                assert_eq!(kind, IndexKind::Proposal);
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("Expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_class_index_out_of_range() {
        let proposals = vec![proposal(5, 0.9)];

        match select_labeled(&proposals, &[0], &table()) {
            Err(YoloxError::IndexOutOfRange { kind, index, len }) => {
                assert_eq!(kind, IndexKind::Class);
                assert_eq!(index, 5);
                assert_eq!(len, 2);
            }
            other => panic!("Expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_table_fails_lookup() {
        let proposals = vec![proposal(0, 0.9)];
        let result = select_labeled(&proposals, &[0], &LabelTable::default());
        assert!(matches!(result, Err(YoloxError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_custom_box_type() {
        let boxes = vec![FixedBox { class: 1 }];

        let selected = select_labeled(&boxes, &[0], &table()).unwrap();

        assert_eq!(selected[0].bbox, FixedBox { class: 1 });
        assert_eq!(selected[0].label, "bicycle");
        assert_eq!(selected[0].to_xyxy(), (1.0, 2.0, 4.0, 6.0));
    }
}
