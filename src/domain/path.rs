//! Vector paths for annotation geometry
//!
//! A [`Path`] may hold a lone anchor point, which tiny-skia paths cannot, so
//! annotation geometry is kept in this type and only converted to
//! `tiny_skia::Path` for stroking and rasterisation.

use tiny_skia::{PathBuilder, PathSegment, Transform};

use super::geometry::{Point, RectF};
use super::utils::map_point;

/// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
pub const BEZIER_K: f32 = 0.552_284_8;

/// Max subdivisions when flattening one cubic segment
const MAX_CURVE_STEPS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathElement {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// How overlapping contours decide what is inside
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    OddEven,
    Winding,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    elements: Vec<PathElement>,
    fill_rule: FillRule,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path holding a single anchor point
    pub fn from_point(p: Point) -> Self {
        let mut path = Self::new();
        path.move_to(p);
        path
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    /// Start a new contour. Consecutive moves collapse into the last one.
    pub fn move_to(&mut self, p: Point) {
        if let Some(PathElement::MoveTo(last)) = self.elements.last_mut() {
            *last = p;
            return;
        }
        self.elements.push(PathElement::MoveTo(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.ensure_started();
        self.elements.push(PathElement::LineTo(p));
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.ensure_started();
        self.elements.push(PathElement::CubicTo(c1, c2, p));
    }

    pub fn close(&mut self) {
        match self.elements.last() {
            None | Some(PathElement::Close) | Some(PathElement::MoveTo(_)) => {}
            _ => self.elements.push(PathElement::Close),
        }
    }

    fn ensure_started(&mut self) {
        if self.elements.is_empty() {
            self.elements.push(PathElement::MoveTo(Point::default()));
        }
    }

    /// Append a closed rectangle contour
    pub fn add_rect(&mut self, r: RectF) {
        self.move_to(r.top_left());
        self.line_to(r.top_right());
        self.line_to(r.bottom_right());
        self.line_to(r.bottom_left());
        self.close();
    }

    /// Append an ellipse inscribed in `r`, built from four cubic arcs
    pub fn add_ellipse(&mut self, r: RectF) {
        let c = r.center();
        let rx = r.width / 2.0;
        let ry = r.height / 2.0;
        let kx = rx * BEZIER_K;
        let ky = ry * BEZIER_K;
        let (cx, cy) = (c.x, c.y);

        // Start at top
        self.move_to(Point::new(cx, cy - ry));
        // Top to right
        self.cubic_to(
            Point::new(cx + kx, cy - ry),
            Point::new(cx + rx, cy - ky),
            Point::new(cx + rx, cy),
        );
        // Right to bottom
        self.cubic_to(
            Point::new(cx + rx, cy + ky),
            Point::new(cx + kx, cy + ry),
            Point::new(cx, cy + ry),
        );
        // Bottom to left
        self.cubic_to(
            Point::new(cx - kx, cy + ry),
            Point::new(cx - rx, cy + ky),
            Point::new(cx - rx, cy),
        );
        // Left to top
        self.cubic_to(
            Point::new(cx - rx, cy - ky),
            Point::new(cx - kx, cy - ry),
            Point::new(cx, cy - ry),
        );
        self.close();
    }

    /// Append all contours of another path
    pub fn extend(&mut self, other: &Path) {
        for el in &other.elements {
            match *el {
                PathElement::MoveTo(p) => self.move_to(p),
                PathElement::LineTo(p) => self.line_to(p),
                PathElement::CubicTo(c1, c2, p) => self.cubic_to(c1, c2, p),
                PathElement::Close => self.close(),
            }
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// True when there is nothing to draw: no elements or a lone anchor
    pub fn is_empty(&self) -> bool {
        matches!(self.elements.as_slice(), [] | [PathElement::MoveTo(_)])
    }

    /// Every on-curve and control point, in order
    pub fn points(&self) -> Vec<Point> {
        let mut pts = Vec::with_capacity(self.elements.len() * 2);
        for el in &self.elements {
            match *el {
                PathElement::MoveTo(p) | PathElement::LineTo(p) => pts.push(p),
                PathElement::CubicTo(c1, c2, p) => pts.extend([c1, c2, p]),
                PathElement::Close => {}
            }
        }
        pts
    }

    /// Number of points, counting cubic control points
    pub fn point_count(&self) -> usize {
        self.points().len()
    }

    pub fn first_point(&self) -> Option<Point> {
        self.points().first().copied()
    }

    /// Exact bounds of the drawn outline
    pub fn bounding_rect(&self) -> RectF {
        let mut bounds = Bounds::default();
        let mut current = Point::default();
        for el in &self.elements {
            match *el {
                PathElement::MoveTo(p) | PathElement::LineTo(p) => {
                    bounds.add(p);
                    current = p;
                }
                PathElement::CubicTo(c1, c2, p) => {
                    bounds.add(p);
                    for t in cubic_extrema(current, c1, c2, p) {
                        bounds.add(cubic_point(current, c1, c2, p, t));
                    }
                    current = p;
                }
                PathElement::Close => {}
            }
        }
        bounds.rect()
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for el in &mut self.elements {
            match el {
                PathElement::MoveTo(p) | PathElement::LineTo(p) => *p = p.translated(dx, dy),
                PathElement::CubicTo(c1, c2, p) => {
                    *c1 = c1.translated(dx, dy);
                    *c2 = c2.translated(dx, dy);
                    *p = p.translated(dx, dy);
                }
                PathElement::Close => {}
            }
        }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Path {
        let mut path = self.clone();
        path.translate(dx, dy);
        path
    }

    /// Map every point through an affine transform
    pub fn transformed(&self, ts: &Transform) -> Path {
        let elements = self
            .elements
            .iter()
            .map(|el| match *el {
                PathElement::MoveTo(p) => PathElement::MoveTo(map_point(ts, p)),
                PathElement::LineTo(p) => PathElement::LineTo(map_point(ts, p)),
                PathElement::CubicTo(c1, c2, p) => PathElement::CubicTo(
                    map_point(ts, c1),
                    map_point(ts, c2),
                    map_point(ts, p),
                ),
                PathElement::Close => PathElement::Close,
            })
            .collect();
        Path {
            elements,
            fill_rule: self.fill_rule,
        }
    }

    /// Contours as polylines, curves subdivided. Open contours are treated
    /// as implicitly closed by the caller.
    pub fn flatten(&self) -> Vec<Vec<Point>> {
        let mut contours: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        for el in &self.elements {
            match *el {
                PathElement::MoveTo(p) => {
                    if current.len() > 1 {
                        contours.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(p);
                }
                PathElement::LineTo(p) => current.push(p),
                PathElement::CubicTo(c1, c2, p) => {
                    let start = current.last().copied().unwrap_or_default();
                    let hull = start.distance(c1) + c1.distance(c2) + c2.distance(p);
                    let steps = ((hull / 2.0).ceil() as usize).clamp(4, MAX_CURVE_STEPS);
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        current.push(cubic_point(start, c1, c2, p, t));
                    }
                }
                PathElement::Close => {
                    if current.len() > 1 {
                        let start = current[0];
                        contours.push(std::mem::take(&mut current));
                        // A close leaves the pen at the contour start
                        current.push(start);
                    }
                }
            }
        }
        if current.len() > 1 {
            contours.push(current);
        }
        contours
    }

    /// Point-in-path test using this path's fill rule
    pub fn contains(&self, p: Point) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut winding = 0i32;
        for contour in self.flatten() {
            winding += winding_number(&contour, p);
        }
        match self.fill_rule {
            FillRule::Winding => winding != 0,
            FillRule::OddEven => winding.rem_euclid(2) == 1,
        }
    }

    /// Convert for stroking and rasterisation. Lone anchors have no
    /// tiny-skia equivalent and yield `None`.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut pb = PathBuilder::new();
        for el in &self.elements {
            match *el {
                PathElement::MoveTo(p) => pb.move_to(p.x, p.y),
                PathElement::LineTo(p) => pb.line_to(p.x, p.y),
                PathElement::CubicTo(c1, c2, p) => pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathElement::Close => pb.close(),
            }
        }
        pb.finish()
    }

    /// Import a tiny-skia path, raising quadratic segments to cubics
    pub fn from_skia(path: &tiny_skia::Path, fill_rule: FillRule) -> Path {
        let mut out = Path::new();
        out.fill_rule = fill_rule;
        let mut current = Point::default();
        let mut contour_start = Point::default();
        for seg in path.segments() {
            match seg {
                PathSegment::MoveTo(p) => {
                    current = Point::new(p.x, p.y);
                    contour_start = current;
                    out.move_to(current);
                }
                PathSegment::LineTo(p) => {
                    current = Point::new(p.x, p.y);
                    out.line_to(current);
                }
                PathSegment::QuadTo(q, p) => {
                    let q = Point::new(q.x, q.y);
                    let end = Point::new(p.x, p.y);
                    let c1 = current + (q - current).scaled(2.0 / 3.0);
                    let c2 = end + (q - end).scaled(2.0 / 3.0);
                    out.cubic_to(c1, c2, end);
                    current = end;
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    current = Point::new(p.x, p.y);
                    out.cubic_to(Point::new(c1.x, c1.y), Point::new(c2.x, c2.y), current);
                }
                PathSegment::Close => {
                    out.close();
                    current = contour_start;
                }
            }
        }
        out
    }

    /// Outline of this path drawn with `stroke`, as a filled shape
    pub fn stroked(&self, stroke: &tiny_skia::Stroke) -> Path {
        self.to_skia()
            .and_then(|p| p.stroke(stroke, 1.0))
            .map(|p| Path::from_skia(&p, FillRule::Winding))
            .unwrap_or_default()
    }
}

/// Clickable area made of one or more filled shapes.
///
/// Each part is filled with the winding rule, and a point is inside the
/// region when any part contains it, so interior clicks register even on
/// self-intersecting outlines.
///
/// The union is kept unmerged: overlapping parts are not simplified into one
/// outline, so [`HitRegion::parts`] follows the inputs rather than the shape.
/// Containment and [`HitRegion::bounds`] answer for the union as a whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitRegion {
    parts: Vec<Path>,
}

impl HitRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the given paths, dropping empty ones
    pub fn union_of<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut region = Self::new();
        for path in paths {
            region.unite(path);
        }
        region
    }

    pub fn unite(&mut self, path: &Path) {
        if path.is_empty() {
            return;
        }
        let mut part = path.clone();
        part.set_fill_rule(FillRule::Winding);
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[Path] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(Path::is_empty)
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }

    pub fn contains(&self, p: Point) -> bool {
        self.parts.iter().any(|part| part.contains(p))
    }

    pub fn bounding_rect(&self) -> RectF {
        self.parts
            .iter()
            .fold(RectF::default(), |acc, part| acc.united(&part.bounding_rect()))
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for part in &mut self.parts {
            part.translate(dx, dy);
        }
    }

    pub fn transformed(&self, ts: &Transform) -> HitRegion {
        HitRegion {
            parts: self.parts.iter().map(|p| p.transformed(ts)).collect(),
        }
    }
}

#[derive(Default)]
struct Bounds {
    min: Option<Point>,
    max: Point,
}

impl Bounds {
    fn add(&mut self, p: Point) {
        match self.min.as_mut() {
            None => {
                self.min = Some(p);
                self.max = p;
            }
            Some(min) => {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                self.max.x = self.max.x.max(p.x);
                self.max.y = self.max.y.max(p.y);
            }
        }
    }

    fn rect(&self) -> RectF {
        match self.min {
            Some(min) => RectF::from_points(min, self.max),
            None => RectF::default(),
        }
    }
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Parameters in (0, 1) where the curve turns on either axis
fn cubic_extrema(p0: Point, p1: Point, p2: Point, p3: Point) -> Vec<f32> {
    let mut ts = Vec::with_capacity(4);
    for (a0, a1, a2, a3) in [(p0.x, p1.x, p2.x, p3.x), (p0.y, p1.y, p2.y, p3.y)] {
        let c = a1 - a0;
        let d = a2 - a1;
        let e = a3 - a2;
        let qa = c - 2.0 * d + e;
        let qb = 2.0 * (d - c);
        let qc = c;
        if qa.abs() < 1e-6 {
            if qb.abs() > 1e-6 {
                ts.push(-qc / qb);
            }
        } else {
            let disc = qb * qb - 4.0 * qa * qc;
            if disc >= 0.0 {
                let sq = disc.sqrt();
                ts.push((-qb + sq) / (2.0 * qa));
                ts.push((-qb - sq) / (2.0 * qa));
            }
        }
    }
    ts.retain(|t| *t > 0.0 && *t < 1.0);
    ts
}

/// Signed crossings of a closed polygon around `p`
fn winding_number(polygon: &[Point], p: Point) -> i32 {
    let mut wn = 0;
    let n = polygon.len();
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let side = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            wn -= 1;
        }
    }
    wn
}
