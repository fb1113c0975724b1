pub mod config;
pub mod error;
pub mod labels;
pub mod logging;
pub mod processing;
pub mod tensor;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{AppConfig, DecoderConfig};
pub use error::{Result, YoloxError};
pub use labels::{LabelEntry, LabelTable, load_table, load_table_from_path, try_load_table};
pub use processing::{
    grid::{anchor_count, crop_input_dims, generate_grid},
    post::{ProposalDecoder, best_class, decode_proposals},
    select::select_labeled,
};
pub use tensor::{read_tensor, tensor_from_bytes};
pub use types::{Color, DetectionBox, GridCell, LabeledProposal, Proposal};
