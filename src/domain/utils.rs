//! Stateless geometry helpers shared by the annotation engine and the
//! selection editor

use tiny_skia::Transform;

use super::geometry::{Point, RectF, Size};

/// Size of one device pixel in logical units
#[inline]
pub fn dpx(device_pixel_ratio: f32) -> f32 {
    1.0 / device_pixel_ratio
}

/// Round a logical value so it lands on a whole device pixel
#[inline]
pub fn dpr_round(value: f32, device_pixel_ratio: f32) -> f32 {
    (value * device_pixel_ratio).round() / device_pixel_ratio
}

/// Keep `rect` inside `bounds` by moving it. The size only shrinks when it
/// is larger than the bounds on that axis.
pub fn rect_bounded(rect: RectF, bounds: RectF) -> RectF {
    let bounds = bounds.normalized();
    let mut r = rect.normalized();
    if r.width > bounds.width {
        r.width = bounds.width;
    }
    if r.height > bounds.height {
        r.height = bounds.height;
    }
    let max_x = (bounds.right() - r.width).max(bounds.left());
    let max_y = (bounds.bottom() - r.height).max(bounds.top());
    r.x = r.x.clamp(bounds.left(), max_x);
    r.y = r.y.clamp(bounds.top(), max_y);
    r
}

/// Part of `rect` that lies inside `bounds`
pub fn rect_clipped(rect: RectF, bounds: RectF) -> RectF {
    rect.intersected(&bounds)
}

/// Whether `point` lies inside the ellipse inscribed in `bounds`
pub fn ellipse_contains(bounds: RectF, point: Point) -> bool {
    let r = bounds.normalized();
    if r.is_empty() {
        return false;
    }
    let rx = r.width / 2.0;
    let ry = r.height / 2.0;
    let c = r.center();
    let nx = (point.x - c.x) / rx;
    let ny = (point.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Per-axis factor that turns `old_size` into `new_size`.
///
/// The sign of the old size is kept and its magnitude never goes below 1,
/// so degenerate sources do not blow up the result.
pub fn scale_for_size(old_size: Size, new_size: Size) -> (f32, f32) {
    let w_divisor = old_size.width.abs().max(1.0).copysign(old_size.width);
    let h_divisor = old_size.height.abs().max(1.0).copysign(old_size.height);
    (new_size.width / w_divisor, new_size.height / h_divisor)
}

/// Translation that keeps `anchor` in place after scaling about the origin
pub fn un_translate_scale(sx: f32, sy: f32, anchor: Point) -> (f32, f32) {
    (-anchor.x * sx + anchor.x, -anchor.y * sy + anchor.y)
}

/// Apply an affine transform to a single point
#[inline]
pub fn map_point(ts: &Transform, p: Point) -> Point {
    Point::new(
        ts.sx * p.x + ts.kx * p.y + ts.tx,
        ts.ky * p.x + ts.sy * p.y + ts.ty,
    )
}

/// Bounding rectangle of the four transformed corners of `rect`
pub fn map_rect(ts: &Transform, rect: RectF) -> RectF {
    let corners = [
        map_point(ts, rect.top_left()),
        map_point(ts, rect.top_right()),
        map_point(ts, rect.bottom_left()),
        map_point(ts, rect.bottom_right()),
    ];
    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for c in corners {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }
    RectF::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// True when the transform only moves things around
pub fn is_translation_only(ts: &Transform) -> bool {
    ts.sx == 1.0 && ts.sy == 1.0 && ts.kx == 0.0 && ts.ky == 0.0
}
