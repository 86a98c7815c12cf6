//! Geometric types for logical coordinates, selections and pixel regions

use std::num::NonZeroU32;

/// Point in logical coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height in logical units, possibly negative
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// Per-edge margins used to grow a rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Floating point rectangle stored as origin and size.
///
/// The raw form keeps whatever sign the size was given with, so a rectangle
/// dragged up and to the left has a negative width and height. Geometric
/// queries go through [`RectF::normalized`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning from `top_left` to `bottom_right`
    pub fn from_points(top_left: Point, bottom_right: Point) -> Self {
        Self::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn horizontal_center(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn vertical_center(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// True when the rectangle has no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True when both width and height are exactly zero
    pub fn is_null(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Same rectangle with non-negative width and height
    pub fn normalized(&self) -> RectF {
        let mut r = *self;
        if r.width < 0.0 {
            r.x += r.width;
            r.width = -r.width;
        }
        if r.height < 0.0 {
            r.y += r.height;
            r.height = -r.height;
        }
        r
    }

    /// Point containment, inclusive of all four edges
    pub fn contains(&self, p: Point) -> bool {
        let r = self.normalized();
        if r.is_null() {
            return false;
        }
        p.x >= r.left() && p.x <= r.right() && p.y >= r.top() && p.y <= r.bottom()
    }

    pub fn contains_rect(&self, other: &RectF) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        b.left() >= a.left() && b.right() <= a.right() && b.top() >= a.top() && b.bottom() <= a.bottom()
    }

    pub fn intersects(&self, other: &RectF) -> bool {
        !self.intersected(other).is_empty()
    }

    /// Overlapping region, or an empty rectangle when there is none
    pub fn intersected(&self, other: &RectF) -> RectF {
        let a = self.normalized();
        let b = other.normalized();
        let left = a.left().max(b.left());
        let top = a.top().max(b.top());
        let right = a.right().min(b.right());
        let bottom = a.bottom().min(b.bottom());
        if left < right && top < bottom {
            RectF::new(left, top, right - left, bottom - top)
        } else {
            RectF::default()
        }
    }

    /// Bounding rectangle of both. A null rectangle does not contribute.
    pub fn united(&self, other: &RectF) -> RectF {
        if self.is_null() {
            return other.normalized();
        }
        if other.is_null() {
            return self.normalized();
        }
        let a = self.normalized();
        let b = other.normalized();
        let left = a.left().min(b.left());
        let top = a.top().min(b.top());
        let right = a.right().max(b.right());
        let bottom = a.bottom().max(b.bottom());
        RectF::new(left, top, right - left, bottom - top)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> RectF {
        RectF::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Move each edge by the given amount
    pub fn adjusted(&self, dx1: f32, dy1: f32, dx2: f32, dy2: f32) -> RectF {
        RectF::new(
            self.x + dx1,
            self.y + dy1,
            self.width + dx2 - dx1,
            self.height + dy2 - dy1,
        )
    }

    pub fn grown_by(&self, m: Margins) -> RectF {
        self.adjusted(-m.left, -m.top, m.right, m.bottom)
    }

    /// Scale position and size by the same factor
    pub fn scaled(&self, factor: f32) -> RectF {
        RectF::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Round each component to the nearest integer
    pub fn to_rect(&self) -> Rect {
        let r = self.normalized();
        let left = r.x.round() as i32;
        let top = r.y.round() as i32;
        Rect::new(
            left,
            top,
            left + r.width.round() as i32,
            top + r.height.round() as i32,
        )
    }

    /// Smallest integer rectangle covering this one
    pub fn to_aligned_rect(&self) -> Rect {
        let r = self.normalized();
        Rect::new(
            r.left().floor() as i32,
            r.top().floor() as i32,
            r.right().ceil() as i32,
            r.bottom().ceil() as i32,
        )
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        RectF::new(
            r.left as f32,
            r.top as f32,
            r.width() as f32,
            r.height() as f32,
        )
    }
}

/// Integer rectangle in pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Non-zero pixel dimensions, or `None` for a degenerate rectangle
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new((self.width()).unsigned_abs())?;
        let height = NonZeroU32::new((self.height()).unsigned_abs())?;
        Some(RectDimension { width, height })
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_flips_negative_extent() {
        let r = RectF::new(50.0, 40.0, -30.0, -20.0).normalized();
        assert_eq!(r, RectF::new(20.0, 20.0, 30.0, 20.0));
    }

    #[test]
    fn united_ignores_null_rect() {
        let a = RectF::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.united(&RectF::default()), a);
        assert_eq!(RectF::default().united(&a), a);
        let b = RectF::new(20.0, 0.0, 5.0, 5.0);
        assert_eq!(a.united(&b), RectF::new(5.0, 0.0, 20.0, 15.0));
    }

    #[test]
    fn intersected_disjoint_is_empty() {
        let a = RectF::new(0.0, 0.0, 10.0, 10.0);
        let b = RectF::new(20.0, 20.0, 10.0, 10.0);
        assert!(a.intersected(&b).is_empty());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn grown_by_margins() {
        let r = RectF::new(10.0, 10.0, 10.0, 10.0).grown_by(Margins::new(1.0, 1.0, 3.0, 3.0));
        assert_eq!(r, RectF::new(9.0, 9.0, 14.0, 14.0));
    }

    #[test]
    fn integer_rect_intersection() {
        let a = Rect::from_xywh(0, 0, 100, 100);
        let b = Rect::from_xywh(50, 50, 100, 100);
        assert_eq!(a.intersect(b), Some(Rect::new(50, 50, 100, 100)));
        assert!(Rect::new(3, 3, 3, 9).dimensions().is_none());
    }
}
