//! Annotation traits
//!
//! An annotation is a [`TraitSet`]: seven independently optional records.
//! Which records are present decides what the annotation is. A rectangle
//! outline is Geometry + Stroke, a numbered marker is Geometry + Fill + Text,
//! an arrow is Geometry + Stroke + Arrow, and so on.
//!
//! Derived fields (`Geometry::mouse_path`, `Geometry::visual_rect`,
//! `Stroke::path`) are filled in by [`super::compose`].

use tiny_skia::{Color, LineCap, LineJoin, StrokeDash};

use super::text::Font;
use crate::domain::{HitRegion, Margins, Path, RectF};

/// Paint used for fills, pens and text
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Brush {
    #[default]
    NoBrush,
    Solid(Color),
}

impl Brush {
    pub fn solid(r: u8, g: u8, b: u8, a: u8) -> Self {
        Brush::Solid(Color::from_rgba8(r, g, b, a))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Brush::NoBrush)
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Brush::NoBrush => None,
            Brush::Solid(c) => Some(*c),
        }
    }

    /// True when painting with this brush would change pixels
    pub fn is_opaque_enough(&self) -> bool {
        self.color().is_some_and(|c| c.alpha() > 0.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PenStyle {
    NoPen,
    #[default]
    Solid,
    Dash,
    Dot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pen {
    pub width: f32,
    pub style: PenStyle,
    pub cap: LineCap,
    pub join: LineJoin,
    pub brush: Brush,
}

impl Default for Pen {
    /// One unit wide, solid, round caps and joins, no paint
    fn default() -> Self {
        Self {
            width: 1.0,
            style: PenStyle::Solid,
            cap: LineCap::Round,
            join: LineJoin::Round,
            brush: Brush::NoBrush,
        }
    }
}

impl Pen {
    pub fn new(width: f32, brush: Brush) -> Self {
        Self {
            width,
            brush,
            ..Self::default()
        }
    }

    /// Stroker settings for this pen. Dash patterns scale with the width.
    pub fn to_stroke(&self) -> tiny_skia::Stroke {
        let w = self.width.max(f32::EPSILON);
        let dash = match self.style {
            PenStyle::Dash => StrokeDash::new(vec![4.0 * w, 2.0 * w], 0.0),
            PenStyle::Dot => StrokeDash::new(vec![w, 2.0 * w], 0.0),
            PenStyle::Solid | PenStyle::NoPen => None,
        };
        tiny_skia::Stroke {
            width: self.width,
            line_cap: self.cap,
            line_join: self.join,
            dash,
            ..Default::default()
        }
    }
}

/// Root trait: where the annotation is and what can be clicked
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub path: Path,
    pub mouse_path: HitRegion,
    pub visual_rect: RectF,
}

impl Geometry {
    pub fn new(path: Path) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.visual_rect.is_empty() && !self.path.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stroke {
    pub pen: Pen,
    /// Outline of the geometry path drawn with `pen`
    pub path: Path,
}

impl Stroke {
    pub fn new(pen: Pen) -> Self {
        Self {
            pen,
            path: Path::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.path.is_empty() && self.pen.style != PenStyle::NoPen
    }
}

/// Which case of [`Fill`] is active
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillKind {
    Brush,
    Blur,
    Pixelate,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    Brush(Brush),
    /// Smooth down and up scale of the pixels under the shape
    Blur { factor: u32 },
    /// Block average of the pixels under the shape
    Pixelate { factor: u32 },
}

impl Fill {
    pub fn kind(&self) -> FillKind {
        match self {
            Fill::Brush(_) => FillKind::Brush,
            Fill::Blur { .. } => FillKind::Blur,
            Fill::Pixelate { .. } => FillKind::Pixelate,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Fill::Brush(brush) => !brush.is_none(),
            Fill::Blur { factor } | Fill::Pixelate { factor } => *factor > 1,
        }
    }
}

/// Which case of [`TextContent`] is active
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    String,
    Number,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TextContent {
    String(String),
    Number(i64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub content: TextContent,
    pub font: Font,
    pub brush: Brush,
}

impl Text {
    pub fn string(text: impl Into<String>, font: Font, brush: Brush) -> Self {
        Self {
            content: TextContent::String(text.into()),
            font,
            brush,
        }
    }

    pub fn number(n: i64, font: Font, brush: Brush) -> Self {
        Self {
            content: TextContent::Number(n),
            font,
            brush,
        }
    }

    pub fn kind(&self) -> TextKind {
        match self.content {
            TextContent::String(_) => TextKind::String,
            TextContent::Number(_) => TextKind::Number,
        }
    }

    /// Text as it is drawn
    pub fn text(&self) -> String {
        match &self.content {
            TextContent::String(s) => s.clone(),
            TextContent::Number(n) => n.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        if !self.brush.is_opaque_enough() {
            return false;
        }
        match &self.content {
            TextContent::String(s) => !s.is_empty(),
            TextContent::Number(_) => true,
        }
    }
}

/// Adds an arrow head at the end of the stroke
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Arrow;

/// Paints with a multiply blend so the content underneath stays readable
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Highlight;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shadow {
    pub enabled: bool,
}

impl Default for Shadow {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Shadow {
    pub const X_OFFSET: f32 = 1.0;
    pub const Y_OFFSET: f32 = 1.0;
    pub const RADIUS: f32 = 2.0;
    /// Extra room the shadow needs around the visual rect
    pub const MARGINS: Margins = Margins::new(
        Self::RADIUS - Self::X_OFFSET,
        Self::RADIUS - Self::Y_OFFSET,
        Self::RADIUS + Self::X_OFFSET,
        Self::RADIUS + Self::Y_OFFSET,
    );
}

/// The seven optional traits of one annotation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraitSet {
    pub geometry: Option<Geometry>,
    pub stroke: Option<Stroke>,
    pub fill: Option<Fill>,
    pub text: Option<Text>,
    pub arrow: Option<Arrow>,
    pub highlight: Option<Highlight>,
    pub shadow: Option<Shadow>,
}

impl TraitSet {
    pub fn with_geometry(mut self, path: Path) -> Self {
        self.geometry = Some(Geometry::new(path));
        self
    }

    pub fn with_stroke(mut self, pen: Pen) -> Self {
        self.stroke = Some(Stroke::new(pen));
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_text(mut self, text: Text) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_arrow(mut self) -> Self {
        self.arrow = Some(Arrow);
        self
    }

    pub fn with_highlight(mut self) -> Self {
        self.highlight = Some(Highlight);
        self
    }

    pub fn with_shadow(mut self, enabled: bool) -> Self {
        self.shadow = Some(Shadow { enabled });
        self
    }

    /// Clickable region, empty without geometry
    pub fn mouse_path(&self) -> HitRegion {
        self.geometry
            .as_ref()
            .map(|g| g.mouse_path.clone())
            .unwrap_or_default()
    }

    /// Area the annotation paints into, null without geometry
    pub fn visual_rect(&self) -> RectF {
        self.geometry
            .as_ref()
            .map(|g| g.visual_rect)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_margins() {
        assert_eq!(Shadow::MARGINS, Margins::new(1.0, 1.0, 3.0, 3.0));
    }

    #[test]
    fn fill_validity_per_case() {
        assert!(!Fill::Brush(Brush::NoBrush).is_valid());
        assert!(Fill::Brush(Brush::solid(255, 0, 0, 255)).is_valid());
        assert!(!Fill::Blur { factor: 1 }.is_valid());
        assert!(Fill::Pixelate { factor: 2 }.is_valid());
        assert_eq!(Fill::Blur { factor: 4 }.kind(), FillKind::Blur);
    }

    #[test]
    fn text_validity() {
        let font = Font::default();
        let red = Brush::solid(255, 0, 0, 255);
        assert!(!Text::string("", font.clone(), red).is_valid());
        assert!(Text::string("hi", font.clone(), red).is_valid());
        assert!(Text::number(0, font.clone(), red).is_valid());
        assert!(!Text::number(3, font.clone(), Brush::NoBrush).is_valid());
        assert!(!Text::string("hi", font, Brush::solid(0, 0, 0, 0)).is_valid());
    }

    #[test]
    fn number_text_is_plain_decimal() {
        let t = Text::number(1234, Font::default(), Brush::NoBrush);
        assert_eq!(t.text(), "1234");
        assert_eq!(t.kind(), TextKind::Number);
    }

    #[test]
    fn dashed_pen_scales_pattern() {
        let pen = Pen {
            style: PenStyle::Dash,
            ..Pen::new(3.0, Brush::solid(0, 0, 0, 255))
        };
        let stroke = pen.to_stroke();
        assert_eq!(stroke.width, 3.0);
        assert!(stroke.dash.is_some());
        assert!(Pen::default().to_stroke().dash.is_none());
    }
}
