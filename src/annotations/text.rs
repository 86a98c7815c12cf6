//! Font description and text metrics
//!
//! Text traits need line height, cap height and advances to synthesise
//! their geometry. [`GlyphMeasure`] reads them from a real font through
//! `ab_glyph`; [`Monospace`] is a fixed-ratio estimate used when no font
//! file could be loaded.

use std::path::Path as FsPath;

use ab_glyph::{Font as _, FontArc, GlyphId, ScaleFont as _, point};
use anyhow::Context;

use crate::domain::{Point, Size};

/// Tab stops are this many 'x' advances apart
pub const TAB_STOP_CHARS: f32 = 8.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    /// Em size in logical pixels
    pub pixel_size: f32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            pixel_size: 16.0,
        }
    }
}

impl Font {
    pub fn new(family: impl Into<String>, pixel_size: f32) -> Self {
        Self {
            family: family.into(),
            pixel_size,
        }
    }
}

/// Font metrics in logical pixels
pub trait TextMeasure {
    /// Distance between consecutive baselines
    fn height(&self, font: &Font) -> f32;

    /// Height of capital letters above the baseline
    fn cap_height(&self, font: &Font) -> f32;

    /// Distance from the top of a line to its baseline
    fn ascent(&self, font: &Font) -> f32 {
        self.height(font) * 0.8
    }

    fn advance(&self, font: &Font, ch: char) -> f32;

    /// Default tab stop distance, rounded to whole pixels
    fn tab_stop(&self, font: &Font) -> f32 {
        (self.advance(font, 'x') * TAB_STOP_CHARS).round()
    }

    /// Size of `text` laid out line by line. Tabs jump to the next multiple
    /// of `tab_stop` and trailing spaces count.
    fn text_size(&self, font: &Font, text: &str, tab_stop: f32) -> Size {
        let mut width = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let mut x = 0.0f32;
            for ch in line.chars() {
                if ch == '\t' {
                    x = if tab_stop > 0.0 {
                        ((x / tab_stop).floor() + 1.0) * tab_stop
                    } else {
                        x
                    };
                } else {
                    x += self.advance(font, ch);
                }
            }
            width = width.max(x);
        }
        Size::new(width, lines as f32 * self.height(font))
    }

    /// Rasterise one line of text with its top-left at `origin`, reporting
    /// pixel coverage. Returns false when glyph outlines are not available.
    fn draw_line(
        &self,
        _font: &Font,
        _line: &str,
        _origin: Point,
        _coverage: &mut dyn FnMut(i32, i32, f32),
    ) -> bool {
        false
    }
}

/// Fixed-ratio metrics of a generic monospace face
#[derive(Clone, Copy, Debug, Default)]
pub struct Monospace;

impl TextMeasure for Monospace {
    fn height(&self, font: &Font) -> f32 {
        font.pixel_size * 1.2
    }

    fn cap_height(&self, font: &Font) -> f32 {
        font.pixel_size * 0.7
    }

    fn ascent(&self, font: &Font) -> f32 {
        font.pixel_size * 0.95
    }

    fn advance(&self, font: &Font, _ch: char) -> f32 {
        font.pixel_size * 0.6
    }
}

/// Metrics and glyph coverage from a loaded font file.
///
/// The font family of a [`Font`] is not used for lookup; every family maps
/// to the loaded face at the requested pixel size.
#[derive(Clone, Debug)]
pub struct GlyphMeasure {
    font: FontArc,
}

impl GlyphMeasure {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let font = FontArc::try_from_vec(bytes).context("Failed to parse font data")?;
        Ok(Self::new(font))
    }

    pub fn from_file(path: &FsPath) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font {}", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Load a font file, falling back to [`Monospace`] when it cannot be used
    pub fn load_or_fallback(path: &FsPath) -> Box<dyn TextMeasure> {
        match Self::from_file(path) {
            Ok(measure) => Box::new(measure),
            Err(e) => {
                log::warn!("Using monospace text metrics: {e:#}");
                Box::new(Monospace)
            }
        }
    }
}

impl TextMeasure for GlyphMeasure {
    fn height(&self, font: &Font) -> f32 {
        self.font.as_scaled(font.pixel_size).height()
    }

    fn cap_height(&self, font: &Font) -> f32 {
        let scaled = self.font.as_scaled(font.pixel_size);
        let glyph = scaled.scaled_glyph('H');
        match self.font.outline_glyph(glyph) {
            Some(outline) => -outline.px_bounds().min.y,
            None => scaled.ascent() * 0.7,
        }
    }

    fn ascent(&self, font: &Font) -> f32 {
        self.font.as_scaled(font.pixel_size).ascent()
    }

    fn advance(&self, font: &Font, ch: char) -> f32 {
        let scaled = self.font.as_scaled(font.pixel_size);
        scaled.h_advance(self.font.glyph_id(ch))
    }

    fn text_size(&self, font: &Font, text: &str, tab_stop: f32) -> Size {
        let scaled = self.font.as_scaled(font.pixel_size);
        let mut width = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let mut x = 0.0f32;
            let mut last: Option<GlyphId> = None;
            for ch in line.chars() {
                if ch == '\t' {
                    if tab_stop > 0.0 {
                        x = ((x / tab_stop).floor() + 1.0) * tab_stop;
                    }
                    last = None;
                    continue;
                }
                let id = self.font.glyph_id(ch);
                if let Some(prev) = last {
                    x += scaled.kern(prev, id);
                }
                x += scaled.h_advance(id);
                last = Some(id);
            }
            width = width.max(x);
        }
        Size::new(width, lines as f32 * scaled.height())
    }

    fn draw_line(
        &self,
        font: &Font,
        line: &str,
        origin: Point,
        coverage: &mut dyn FnMut(i32, i32, f32),
    ) -> bool {
        let scaled = self.font.as_scaled(font.pixel_size);
        let baseline = origin.y + scaled.ascent();
        let tab_stop = self.tab_stop(font);
        let mut x = origin.x;
        let mut last: Option<GlyphId> = None;
        for ch in line.chars() {
            if ch == '\t' {
                if tab_stop > 0.0 {
                    let rel = x - origin.x;
                    x = origin.x + ((rel / tab_stop).floor() + 1.0) * tab_stop;
                }
                last = None;
                continue;
            }
            let id = self.font.glyph_id(ch);
            if let Some(prev) = last {
                x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(font.pixel_size, point(x, baseline));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                let (bx, by) = (bounds.min.x as i32, bounds.min.y as i32);
                outline.draw(|gx, gy, cov| coverage(bx + gx as i32, by + gy as i32, cov));
            }
            x += scaled.h_advance(id);
            last = Some(id);
        }
        true
    }
}
