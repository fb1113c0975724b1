use serde::{Deserialize, Serialize};

/// Minimal geometry-and-score view of a detection box.
///
/// The selector and renderers only depend on this trait, so any box type carrying
/// pixel-space geometry plus a class index and probability can be plugged in.
pub trait DetectionBox {
    /// Left edge in input-pixel space.
    fn x(&self) -> f32;
    /// Top edge in input-pixel space.
    fn y(&self) -> f32;
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn class_index(&self) -> usize;
    fn probability(&self) -> f32;
}

/// One anchor position at one detection scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
    pub stride: u32,
}

/// A decoded, confidence-filtered candidate box prior to any suppression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub class_index: usize,
    /// objectness * best class score
    pub probability: f32,
}

impl DetectionBox for Proposal {
    fn x(&self) -> f32 {
        self.x
    }

    fn y(&self) -> f32 {
        self.y
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn class_index(&self) -> usize {
        self.class_index
    }

    fn probability(&self) -> f32 {
        self.probability
    }
}

/// Display color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque color from three channels.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// A box joined with its class label and display color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledProposal<B = Proposal> {
    pub bbox: B,
    pub label: String,
    pub color: Color,
}

impl<B: DetectionBox> LabeledProposal<B> {
    /// Corner form `(x1, y1, x2, y2)`.
    pub fn to_xyxy(&self) -> (f32, f32, f32, f32) {
        let x1 = self.bbox.x();
        let y1 = self.bbox.y();
        (
            x1,
            y1,
            x1 + self.bbox.width(),
            y1 + self.bbox.height(),
        )
    }
}
