//! Resize handle layout and hit testing

use crate::domain::utils::ellipse_contains;
use crate::domain::{InputModality, MouseLocation, Point, RectF};

pub const HANDLE_RADIUS_MOUSE: f32 = 9.0;
pub const HANDLE_RADIUS_TOUCH: f32 = 12.0;
/// Gap kept between neighbouring handles on a small selection
pub const MIN_SPACING_BETWEEN_HANDLES: f32 = 20.0;
/// Handles react to presses this many radii from their center
pub const DRAG_AREA_FACTOR: f32 = 2.0;

/// Handle order used by [`Handles::positions`]
pub const HANDLE_LOCATIONS: [MouseLocation; 8] = [
    MouseLocation::TopLeft,
    MouseLocation::TopRight,
    MouseLocation::BottomRight,
    MouseLocation::BottomLeft,
    MouseLocation::Top,
    MouseLocation::Right,
    MouseLocation::Bottom,
    MouseLocation::Left,
];

pub fn handle_radius(modality: InputModality) -> f32 {
    match modality {
        InputModality::Mouse => HANDLE_RADIUS_MOUSE,
        InputModality::Touch => HANDLE_RADIUS_TOUCH,
    }
}

/// Centers of the eight handles and the area they cover
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Handles {
    pub positions: [Point; 8],
    /// Bounds of all handles, inflated by the radius
    pub rect: RectF,
}

impl Handles {
    /// Lay out the handles around `selection`.
    ///
    /// A selection too small to fit the handles apart pushes all of them
    /// outward by the same amount. Handle lines that then sit closer than
    /// `radius` to an edge of the canvas are pulled back inside, with
    /// `pen_width` of slack on the right and bottom.
    pub fn compute(selection: RectF, screens_rect: RectF, radius: f32, pen_width: f32) -> Self {
        let center_x = selection.horizontal_center();
        let center_y = selection.vertical_center();

        let min_space = 4.0 * radius + 2.0 * MIN_SPACING_BETWEEN_HANDLES;
        let min_edge = selection.width.min(selection.height);
        let offset = ((min_space - min_edge) / 2.0).max(0.0);

        let left = selection.left() - offset;
        let right = selection.right() + offset;
        let top = selection.top() - offset;
        let bottom = selection.bottom() + offset;

        let canvas = screens_rect.translated(-screens_rect.x, -screens_rect.y);
        let off_top = (top - canvas.top() - radius).min(0.0);
        let off_right = (canvas.right() - right - radius + pen_width).min(0.0);
        let off_bottom = (canvas.bottom() - bottom - radius + pen_width).min(0.0);
        let off_left = (left - canvas.left() - radius).min(0.0);

        let hl = left - off_left;
        let hr = right + off_right;
        let ht = top - off_top;
        let hb = bottom + off_bottom;
        let positions = [
            Point::new(hl, ht),
            Point::new(hr, ht),
            Point::new(hr, hb),
            Point::new(hl, hb),
            Point::new(center_x, ht),
            Point::new(hr, center_y),
            Point::new(center_x, hb),
            Point::new(hl, center_y),
        ];
        let rect = RectF::from_points(
            positions[0].translated(-radius, -radius),
            positions[2].translated(radius, radius),
        );
        Self { positions, rect }
    }

    pub fn position(&self, location: MouseLocation) -> Option<Point> {
        HANDLE_LOCATIONS
            .iter()
            .position(|l| *l == location)
            .map(|i| self.positions[i])
    }

    /// First handle whose enlarged drag area holds `p`, corners before edges
    pub fn hit(&self, p: Point, radius: f32) -> Option<MouseLocation> {
        let r = radius * DRAG_AREA_FACTOR;
        HANDLE_LOCATIONS
            .iter()
            .zip(self.positions)
            .find(|(_, center)| {
                ellipse_contains(RectF::new(center.x - r, center.y - r, 2.0 * r, 2.0 * r), p)
            })
            .map(|(location, _)| *location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: RectF = RectF::new(0.0, 0.0, 1000.0, 800.0);

    #[test]
    fn large_selection_handles_sit_on_the_rect() {
        let sel = RectF::new(100.0, 100.0, 200.0, 150.0);
        let h = Handles::compute(sel, CANVAS, HANDLE_RADIUS_MOUSE, 1.0);
        assert_eq!(h.position(MouseLocation::TopLeft), Some(Point::new(100.0, 100.0)));
        assert_eq!(h.position(MouseLocation::Bottom), Some(Point::new(200.0, 250.0)));
        assert_eq!(h.position(MouseLocation::Right), Some(Point::new(300.0, 175.0)));
        assert_eq!(h.rect, RectF::new(91.0, 91.0, 218.0, 168.0));
    }

    #[test]
    fn small_selection_handles_float_symmetrically() {
        let sel = RectF::new(400.0, 300.0, 30.0, 10.0);
        let h = Handles::compute(sel, CANVAS, HANDLE_RADIUS_MOUSE, 1.0);
        let c = sel.center();
        for (location, p) in HANDLE_LOCATIONS.iter().zip(h.positions) {
            let outside = p.x < sel.left() || p.x > sel.right() || p.y < sel.top() || p.y > sel.bottom();
            assert!(outside, "{location:?} at {p:?} is inside");
        }
        let tl = h.positions[0];
        let br = h.positions[2];
        assert!(((tl.x + br.x) / 2.0 - c.x).abs() < 1e-4);
        assert!(((tl.y + br.y) / 2.0 - c.y).abs() < 1e-4);
        // offset is half the shortfall of 4 * 9 + 2 * 20 = 76
        assert!((sel.top() - tl.y - 33.0).abs() < 1e-4);
    }

    #[test]
    fn handles_near_canvas_edge_are_pulled_in() {
        let sel = RectF::new(0.0, 2.0, 1000.0, 798.0);
        let h = Handles::compute(sel, CANVAS, HANDLE_RADIUS_MOUSE, 1.0);
        let tl = h.positions[0];
        let br = h.positions[2];
        assert_eq!(tl, Point::new(9.0, 9.0));
        assert_eq!(br, Point::new(992.0, 792.0));
    }

    #[test]
    fn small_selection_in_corner_keeps_handles_on_canvas() {
        let sel = RectF::new(0.0, 0.0, 30.0, 30.0);
        let h = Handles::compute(sel, CANVAS, HANDLE_RADIUS_MOUSE, 1.0);
        // Top and left are pulled in, bottom and right still float outward
        assert_eq!(h.positions[0], Point::new(9.0, 9.0));
        assert_eq!(h.positions[2], Point::new(53.0, 53.0));
        for p in h.positions {
            assert!(p.x >= HANDLE_RADIUS_MOUSE && p.y >= HANDLE_RADIUS_MOUSE, "{p:?} is off the canvas");
        }
    }

    #[test]
    fn hit_uses_enlarged_area() {
        let sel = RectF::new(100.0, 100.0, 200.0, 150.0);
        let h = Handles::compute(sel, CANVAS, HANDLE_RADIUS_MOUSE, 1.0);
        assert_eq!(h.hit(Point::new(115.0, 100.0), HANDLE_RADIUS_MOUSE), Some(MouseLocation::TopLeft));
        assert_eq!(h.hit(Point::new(200.0, 252.0), HANDLE_RADIUS_MOUSE), Some(MouseLocation::Bottom));
        assert_eq!(h.hit(Point::new(150.0, 150.0), HANDLE_RADIUS_MOUSE), None);
    }

    #[test]
    fn touch_radius_is_larger() {
        assert!(handle_radius(InputModality::Touch) > handle_radius(InputModality::Mouse));
    }
}
