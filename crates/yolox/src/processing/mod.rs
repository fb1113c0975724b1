pub mod grid;
pub mod post;
pub mod select;
