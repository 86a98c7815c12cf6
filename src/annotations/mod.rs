//! Annotation traits and the geometry derived from them
//!
//! This module provides:
//! - The seven trait records making up an annotation (`traits`)
//! - Validity and visibility through the trait dependency graph (`validity`)
//! - Font metrics for text traits (`text`)
//! - Path, hit region and bounds synthesis (`compose`)
//! - An ordered annotation list with change notification (`document`)

pub mod compose;
pub mod document;
pub mod text;
pub mod traits;
pub mod validity;

pub use compose::{clear_for_init, fast_init, init, re_init, transform};
pub use document::{AnnotationDocument, DocumentChange};
pub use text::{Font, GlyphMeasure, Monospace, TextMeasure};
pub use traits::*;
pub use validity::{TraitKind, is_valid, is_valid_trait_opt, is_visible};
