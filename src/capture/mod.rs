//! Screen capture input and accepted output
//!
//! This module provides:
//! - Screen image and accepted capture types (image.rs)
//! - The image source boundary and its consistency check (source.rs)
//! - Canvas assembly and accept-time cropping (compose.rs)

pub mod compose;
pub mod image;
pub mod source;

pub use compose::{Canvas, Platform};
pub use image::{Capture, ScreenImage};
pub use source::{ImageSource, ScreenInfo, gather};
