//! Class label and display color table.
//!
//! The resource is a JSON document of the form
//!
//! ```json
//! { "items": [ { "label": "person", "color": [1.0, 0.0, 0.0] } ] }
//! ```
//!
//! Position in `items` is the class index.

use crate::{
    error::{IndexKind, Result, YoloxError},
    types::Color,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ColormapEntry {
    label: String,
    color: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ColormapList {
    items: Vec<ColormapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    pub label: String,
    pub color: Color,
}

/// Ordered class-index to (label, color) mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    entries: Vec<LabelEntry>,
}

impl LabelTable {
    pub fn new(entries: Vec<LabelEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, class_index: usize) -> Result<&LabelEntry> {
        self.entries
            .get(class_index)
            .ok_or(YoloxError::IndexOutOfRange {
                kind: IndexKind::Class,
                index: class_index,
                len: self.entries.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelEntry> {
        self.entries.iter()
    }
}

/// Parse a colormap document, failing on empty or malformed input.
pub fn try_load_table(text: &str) -> Result<LabelTable> {
    if text.trim().is_empty() {
        return Err(YoloxError::ResourceLoad(
            "class labels JSON is empty".to_string(),
        ));
    }

    let list: ColormapList = serde_json::from_str(text).map_err(|e| {
        YoloxError::ResourceLoad(format!("failed to deserialize class labels JSON: {}", e))
    })?;

    let entries = list
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| -> Result<LabelEntry> {
            let color = parse_color(&item.color).ok_or_else(|| {
                YoloxError::ResourceLoad(format!(
                    "entry {} ('{}'): color must be three values in [0, 1], got {:?}",
                    index, item.label, item.color
                ))
            })?;
            Ok(LabelEntry {
                label: item.label,
                color,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LabelTable::new(entries))
}

/// Parse a colormap document, logging any failure and falling back to an empty table.
///
/// Lookups against the empty table fail later with a class index error.
pub fn load_table(text: &str) -> LabelTable {
    match try_load_table(text) {
        Ok(table) => {
            tracing::debug!(classes = table.len(), "Loaded label table");
            table
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load label table");
            LabelTable::default()
        }
    }
}

/// Read and parse a colormap file; unreadable files behave like malformed ones.
pub fn load_table_from_path(path: impl AsRef<Path>) -> LabelTable {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => load_table(&text),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read label table");
            LabelTable::default()
        }
    }
}

fn parse_color(channels: &[f32]) -> Option<Color> {
    match channels {
        [r, g, b] if channels.iter().all(|c| (0.0..=1.0).contains(c)) => {
            Some(Color::rgb(*r, *g, *b))
        }
        _ => None,
    }
}
