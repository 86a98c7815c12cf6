//! Annotation rendering module
//!
//! This module contains:
//! - Flattening trait sets onto an image using tiny-skia
//! - Blur and pixelate image effects
//! - The debounce timer that coalesces flattening after edits

pub mod debounce;
pub mod image;

pub use debounce::{Debouncer, FLATTEN_DELAY};
