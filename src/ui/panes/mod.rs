//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code display with syntax highlighting and the selected span
//! - [`tree`]: Outline of the syntax tree with the selected node
//! - [`status`]: Status bar with keybindings and the selected node's kind, span and parent
//!
//! Each pane module exports a primary `render_*` function plus the scroll or
//! render state it needs.

pub mod source;
pub mod status;
pub mod tree;

pub use source::{render_source_pane, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use tree::{render_tree_pane, TreeScrollState};
