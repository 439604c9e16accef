//! Terminal UI components.
//!
//! - [`render`]: editor pane with gutter, caret and selection
//! - status and toast bars along the bottom

mod render;
mod status;

pub use render::{TAB_WIDTH, byte_col_at, display_col, line_number_width, render};
