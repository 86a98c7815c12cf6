//! Pure domain types with minimal dependencies
//!
//! Geometry, vector paths and selection vocabulary used by both the
//! annotation engine and the region editor. Nothing here knows about
//! images or windows.

pub mod geometry;
pub mod path;
pub mod selection;
pub mod utils;

pub use geometry::*;
pub use path::{FillRule, HitRegion, Path, PathElement};
pub use selection::*;
