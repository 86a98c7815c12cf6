//! Rectangular region selection
//!
//! This module contains:
//! - The selection rectangle with change notification (model.rs)
//! - Resize handle layout and hit testing (handles.rs)
//! - The pointer and keyboard state machine that edits it (editor.rs)

pub mod editor;
pub mod handles;
pub mod model;

pub use editor::{EditorEvent, SelectionEditor};
pub use handles::Handles;
pub use model::Selection;
