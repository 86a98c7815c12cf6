//! Derived geometry for trait sets
//!
//! Every annotation stores a user supplied geometry path and a handful of
//! derived values: the stroked outline, the clickable region and the
//! painted bounds. The functions here fill those in from whatever traits
//! are present, and keep them in step when the annotation is transformed.

use std::f32::consts::PI;

use tiny_skia::Transform;

use super::text::TextMeasure;
use super::traits::{Shadow, TextKind, TraitSet};
use crate::domain::utils::{is_translation_only, map_rect};
use crate::domain::{FillRule, HitRegion, Path, Point, RectF};

/// Length given to a single point so the stroker has a segment to work with
const MIN_SEGMENT: f32 = 0.0001;

/// Spread of each arrow head barb from the reversed shaft direction
const ARROW_HEAD_ANGLE: f32 = 30.0 * PI / 180.0;

/// Margin around a number marker, relative to the cap height
const NUMBER_MARGIN_FACTOR: f32 = 1.33;

/// Path with at least two points. An empty or single point path becomes a
/// tiny horizontal segment starting at its first point.
pub fn min_path(path: &Path) -> Path {
    if !path.is_empty() {
        return path.clone();
    }
    let start = path.first_point().unwrap_or_default();
    let mut dot = Path::from_point(start);
    dot.line_to(start.translated(MIN_SEGMENT, 0.0));
    dot
}

/// Open two-barb arrow head at the end of the line `from -> to`
pub fn arrow_head(from: Point, to: Point, stroke_width: f32) -> Path {
    let length = (stroke_width * 3.0).max(8.0);
    // Angle measured counter-clockwise with y pointing up
    let back = (-(to.y - from.y)).atan2(to.x - from.x) + PI;
    let barb = |angle: f32| Point::new(to.x + length * angle.cos(), to.y - length * angle.sin());
    let mut path = Path::from_point(barb(back + ARROW_HEAD_ANGLE));
    path.line_to(to);
    path.line_to(barb(back - ARROW_HEAD_ANGLE));
    path
}

/// Geometry path for a text trait, built from the first point of the
/// current geometry. Strings get a box whose first line is vertically
/// centred on the point, numbers get a circle around it.
pub fn create_text_path(traits: &TraitSet, measure: &dyn TextMeasure) -> Path {
    let Some(geometry) = traits.geometry.as_ref() else {
        return Path::new();
    };
    let Some(text) = traits.text.as_ref() else {
        return geometry.path.clone();
    };
    let start = geometry.path.first_point().unwrap_or_default();
    let rect = RectF::from_points(start, start);
    let mut path = Path::from_point(start);
    match text.kind() {
        TextKind::String => {
            let line_height = measure.height(&text.font);
            let tab_stop = measure.tab_stop(&text.font);
            let size = measure.text_size(&text.font, &text.text(), tab_stop);
            let width = size.width.max(line_height);
            let height = size.height.max(line_height);
            // TODO: right-to-left strings should extend to the left of the anchor
            path.add_rect(rect.adjusted(
                0.0,
                -line_height / 2.0,
                width,
                height - line_height / 2.0,
            ));
        }
        TextKind::Number => {
            let margin = measure.cap_height(&text.font) * NUMBER_MARGIN_FACTOR;
            path.add_ellipse(rect.adjusted(-margin, -margin, margin, margin));
        }
    }
    path
}

/// Stroked outline of the geometry, with the arrow head when present
pub fn create_stroke_path(traits: &TraitSet) -> Path {
    let (Some(geometry), Some(stroke)) = (traits.geometry.as_ref(), traits.stroke.as_ref()) else {
        return Path::new();
    };
    let skia_stroke = stroke.pen.to_stroke();
    let shaft = min_path(&geometry.path);
    let mut outline = shaft.stroked(&skia_stroke);
    if traits.arrow.is_some() {
        let points = shaft.points();
        if let [.., from, to] = points.as_slice() {
            let head = arrow_head(*from, *to, stroke.pen.width);
            outline.extend(&head.stroked(&skia_stroke));
        }
    }
    outline.set_fill_rule(FillRule::Winding);
    outline
}

/// Clickable region: geometry path and stroke outline together, filled
pub fn create_mouse_path(traits: &TraitSet) -> HitRegion {
    let mut region = HitRegion::new();
    if let Some(geometry) = traits.geometry.as_ref() {
        region.unite(&geometry.path);
    }
    if let Some(stroke) = traits.stroke.as_ref() {
        region.unite(&stroke.path);
    }
    region
}

/// Painted bounds: stroke and geometry bounds, plus room for the shadow
pub fn create_visual_rect(traits: &TraitSet) -> RectF {
    let Some(geometry) = traits.geometry.as_ref() else {
        return RectF::default();
    };
    let mut rect = geometry.path.bounding_rect();
    if let Some(stroke) = traits.stroke.as_ref() {
        rect = stroke.path.bounding_rect().united(&rect);
    }
    let shadow = traits.shadow.is_some_and(|s| s.enabled);
    if shadow && !rect.is_empty() {
        rect = rect.grown_by(Shadow::MARGINS);
    }
    rect
}

/// Fill in the derived values needed for painting, leaving anything
/// already set untouched
pub fn fast_init(traits: &mut TraitSet, measure: &dyn TextMeasure) {
    let Some(geometry) = traits.geometry.as_ref() else {
        return;
    };
    if geometry.path.is_empty() && traits.text.is_some() {
        let path = create_text_path(traits, measure);
        if let Some(geometry) = traits.geometry.as_mut() {
            geometry.path = path;
        }
    }
    if traits.stroke.as_ref().is_some_and(|s| s.path.is_empty()) {
        let path = create_stroke_path(traits);
        if let Some(stroke) = traits.stroke.as_mut() {
            stroke.path = path;
        }
    }
    if traits.visual_rect().is_empty() {
        let rect = create_visual_rect(traits);
        if let Some(geometry) = traits.geometry.as_mut() {
            geometry.visual_rect = rect;
        }
    }
}

/// [`fast_init`] plus the clickable region
pub fn init(traits: &mut TraitSet, measure: &dyn TextMeasure) {
    fast_init(traits, measure);
    let needs_mouse_path = traits
        .geometry
        .as_ref()
        .is_some_and(|g| g.mouse_path.is_empty());
    if needs_mouse_path {
        let region = create_mouse_path(traits);
        if let Some(geometry) = traits.geometry.as_mut() {
            geometry.mouse_path = region;
        }
    }
}

/// Drop derived values so the next [`init`] rebuilds them. Text geometry
/// collapses back to its anchor point.
pub fn clear_for_init(traits: &mut TraitSet, measure: &dyn TextMeasure) {
    if let Some(geometry) = traits.geometry.as_mut() {
        geometry.mouse_path.clear();
        geometry.visual_rect = RectF::default();
    }
    if let Some(stroke) = traits.stroke.as_mut() {
        stroke.path.clear();
    }
    let (Some(text), Some(geometry)) = (traits.text.as_ref(), traits.geometry.as_mut()) else {
        return;
    };
    let single = geometry.path.point_count() == 1;
    let first = geometry.path.first_point().unwrap_or_default();
    let anchor = match text.kind() {
        TextKind::String => {
            let top_left = if single {
                first
            } else {
                geometry.path.bounding_rect().top_left()
            };
            top_left.translated(0.0, measure.height(&text.font) / 2.0)
        }
        TextKind::Number => {
            if single {
                first
            } else {
                geometry.path.bounding_rect().center()
            }
        }
    };
    geometry.path = Path::from_point(anchor);
}

/// Rebuild every derived value from scratch
pub fn re_init(traits: &mut TraitSet, measure: &dyn TextMeasure) {
    clear_for_init(traits, measure);
    init(traits, measure);
}

/// Apply `ts` to the geometry and stroke.
///
/// Translations, and anything applied to text, only move things. Other
/// transforms map the existing stroke outline rather than stroking again,
/// so a non-uniform scale also scales the pen; call [`re_init`] afterwards
/// when the outline must be exact.
pub fn transform(ts: &Transform, traits: &mut TraitSet) {
    if ts.is_identity() {
        return;
    }
    let only_translating = is_translation_only(ts) || traits.text.is_some();
    let (dx, dy) = (ts.tx, ts.ty);
    if let Some(geometry) = traits.geometry.as_mut() {
        if only_translating {
            geometry.path.translate(dx, dy);
            geometry.mouse_path.translate(dx, dy);
            geometry.visual_rect = geometry.visual_rect.translated(dx, dy);
        } else {
            geometry.path = geometry.path.transformed(ts);
            geometry.mouse_path = geometry.mouse_path.transformed(ts);
            geometry.visual_rect = map_rect(ts, geometry.visual_rect);
        }
    }
    if let Some(stroke) = traits.stroke.as_mut() {
        if only_translating {
            stroke.path.translate(dx, dy);
        } else {
            stroke.path = stroke.path.transformed(ts);
        }
    }
}
