//! Assemble per-screen captures into one canvas and cut accepted regions
//! back out of them

use image::{Rgba, RgbaImage, imageops};

use super::image::{Capture, ScreenImage};
use crate::domain::utils::rect_clipped;
use crate::domain::{Point, RectF, Size};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// How the display server reports screen geometry
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Platform {
    /// One ratio shared by every screen
    X11 { device_pixel_ratio: f32 },
    /// Each screen has its own ratio and the editor works in logical units
    #[default]
    Wayland,
}

impl Platform {
    /// Ratio between editor coordinates and canvas pixels
    pub fn device_pixel_ratio(self) -> f32 {
        match self {
            Platform::X11 { device_pixel_ratio } if device_pixel_ratio > 0.0 => device_pixel_ratio,
            Platform::X11 { .. } | Platform::Wayland => 1.0,
        }
    }
}

/// Assembled screens in canvas pixels
#[derive(Clone, Debug)]
pub struct Canvas {
    pub image: RgbaImage,
    /// Union of every screen's rectangle on the virtual desktop
    pub screens_rect: RectF,
    /// Top-left pixel of each screen inside `image`, in screen order
    pub placements: Vec<(i64, i64)>,
}

impl Canvas {
    /// Canvas bounds in editor coordinates, always anchored at the origin
    pub fn local_rect(&self) -> RectF {
        RectF::new(0.0, 0.0, self.screens_rect.width, self.screens_rect.height)
    }
}

/// Where a screen sits on the virtual desktop for `platform`. On X11 the
/// image is measured with the application ratio, on Wayland with its own.
pub fn virtual_rect(screen: &ScreenImage, platform: Platform) -> RectF {
    let size = match platform {
        Platform::X11 { .. } => {
            let dpr = platform.device_pixel_ratio();
            let px = screen.pixel_size();
            Size::new((px.width / dpr).round(), (px.height / dpr).round())
        }
        Platform::Wayland => screen.logical_size(),
    };
    RectF::from_origin_size(screen.rect.top_left(), size)
}

pub fn screens_rect(screens: &[ScreenImage], platform: Platform) -> RectF {
    screens
        .iter()
        .fold(RectF::default(), |acc, s| acc.united(&virtual_rect(s, platform)))
}

/// Pixel offset of every screen relative to `origin`.
///
/// A screen whose image is larger than its logical geometry pushes the
/// screens listed after it that start past its right (or bottom) edge by the
/// difference. Only later screens move, so the result depends on the order
/// the backend listed them in.
pub fn placements(screens: &[ScreenImage], origin: Point) -> Vec<(i64, i64)> {
    let mut points: Vec<Point> = screens.iter().map(|s| s.rect.top_left()).collect();
    for (i, screen) in screens.iter().enumerate() {
        if !screen.is_scaled() {
            continue;
        }
        let p = screen.rect.top_left();
        let logical = screen.rect.size();
        let delta_x = screen.width() as f32 - logical.width;
        let delta_y = screen.height() as f32 - logical.height;
        for (j, later) in screens.iter().enumerate().skip(i) {
            let q = later.rect.top_left();
            if q.x >= p.x + logical.width {
                points[j].x += delta_x;
            }
            if q.y >= p.y + logical.height {
                points[j].y += delta_y;
            }
        }
    }
    points
        .into_iter()
        .map(|p| ((p.x - origin.x).round() as i64, (p.y - origin.y).round() as i64))
        .collect()
}

/// Paint every screen onto a black canvas at its corrected offset. The
/// canvas grows past the union rectangle when scaled screens need the room.
pub fn assemble(screens: &[ScreenImage], platform: Platform) -> Canvas {
    let screens_rect = screens_rect(screens, platform);
    let placements = placements(screens, screens_rect.top_left());

    let mut width = screens_rect.width.round().max(0.0) as i64;
    let mut height = screens_rect.height.round().max(0.0) as i64;
    for (screen, (x, y)) in screens.iter().zip(&placements) {
        width = width.max(x + i64::from(screen.width()));
        height = height.max(y + i64::from(screen.height()));
    }
    let width = u32::try_from(width).unwrap_or_default();
    let height = u32::try_from(height).unwrap_or_default();

    let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);
    for (screen, (x, y)) in screens.iter().zip(&placements) {
        imageops::overlay(&mut image, &screen.image, *x, *y);
    }
    log::debug!(
        "Canvas {}x{} from {} screens, union {:?}",
        width,
        height,
        screens.len(),
        screens_rect
    );

    Canvas {
        image,
        screens_rect,
        placements,
    }
}

/// Cut `selection` (editor coordinates) out of the assembled canvas. A
/// selection covering the whole canvas returns it as is.
pub fn crop_canvas(canvas: &RgbaImage, selection: RectF, device_pixel_ratio: f32) -> RgbaImage {
    let bounds = RectF::new(0.0, 0.0, canvas.width() as f32, canvas.height() as f32);
    let region = rect_clipped(selection.normalized().scaled(device_pixel_ratio), bounds).to_rect();
    let Some(dims) = region.dimensions() else {
        log::warn!("Selection {:?} lies outside the canvas", selection);
        return RgbaImage::new(0, 0);
    };
    if (dims.width(), dims.height()) == canvas.dimensions() {
        return canvas.clone();
    }
    imageops::crop_imm(
        canvas,
        region.left.max(0) as u32,
        region.top.max(0) as u32,
        dims.width(),
        dims.height(),
    )
    .to_image()
}

/// Cut `selection` out of the individual screens at their native
/// resolution.
///
/// When a single screen covers the whole selection its pixels are returned
/// untouched. Otherwise every overlapping piece is scaled to the highest
/// ratio among the screens and painted onto a black image, so no screen is
/// shown below its native density.
pub fn crop_screens(screens: &[ScreenImage], screens_rect: RectF, selection: RectF) -> Capture {
    let origin = screens_rect.top_left();
    let region = selection.normalized();
    let sel = region.to_rect();
    let max_dpr = screens
        .iter()
        .map(|s| s.device_pixel_ratio)
        .fold(1.0f32, f32::max);

    let out_w = (sel.width().max(0) as f32 * max_dpr).round() as u32;
    let out_h = (sel.height().max(0) as f32 * max_dpr).round() as u32;
    let mut output = RgbaImage::from_pixel(out_w, out_h, BACKGROUND);

    for screen in screens {
        let local = screen.rect.translated(-origin.x, -origin.y).to_rect();
        let Some(inter) = local.intersect(sel) else {
            continue;
        };
        let dpr = screen.device_pixel_ratio;
        let px = ((inter.left - local.left) as f32 * dpr).round() as u32;
        let py = ((inter.top - local.top) as f32 * dpr).round() as u32;
        let pw = (inter.width() as f32 * dpr).round() as u32;
        let ph = (inter.height() as f32 * dpr).round() as u32;
        let piece = imageops::crop_imm(&screen.image, px, py, pw, ph).to_image();

        if inter.width() == sel.width() && inter.height() == sel.height() {
            return Capture {
                image: piece,
                device_pixel_ratio: dpr,
                region,
            };
        }

        let tw = (inter.width() as f32 * max_dpr).round() as u32;
        let th = (inter.height() as f32 * max_dpr).round() as u32;
        let piece = if piece.dimensions() != (tw, th) {
            imageops::resize(&piece, tw, th, imageops::FilterType::Nearest)
        } else {
            piece
        };
        let x = ((inter.left - sel.left) as f32 * max_dpr).round() as i64;
        let y = ((inter.top - sel.top) as f32 * max_dpr).round() as i64;
        imageops::overlay(&mut output, &piece, x, y);
    }

    Capture {
        image: output,
        device_pixel_ratio: max_dpr,
        region,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, c: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(c))
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn side_by_side_screens() {
        let screens = vec![
            ScreenImage::new(RectF::new(0.0, 0.0, 4.0, 4.0), solid(4, 4, RED), 1.0),
            ScreenImage::new(RectF::new(4.0, 0.0, 4.0, 2.0), solid(4, 2, BLUE), 1.0),
        ];
        let canvas = assemble(&screens, Platform::Wayland);
        assert_eq!(canvas.screens_rect, RectF::new(0.0, 0.0, 8.0, 4.0));
        assert_eq!(canvas.image.dimensions(), (8, 4));
        assert_eq!(canvas.image.get_pixel(1, 1).0, RED);
        assert_eq!(canvas.image.get_pixel(5, 1).0, BLUE);
        // Uncovered area stays black
        assert_eq!(canvas.image.get_pixel(5, 3).0, [0, 0, 0, 255]);
    }

    #[test]
    fn negative_origin_is_shifted_to_zero() {
        let screens = vec![
            ScreenImage::new(RectF::new(-4.0, -2.0, 4.0, 4.0), solid(4, 4, RED), 1.0),
            ScreenImage::new(RectF::new(0.0, 0.0, 4.0, 4.0), solid(4, 4, BLUE), 1.0),
        ];
        let canvas = assemble(&screens, Platform::Wayland);
        assert_eq!(canvas.placements, vec![(0, 0), (4, 2)]);
        assert_eq!(canvas.local_rect(), RectF::new(0.0, 0.0, 8.0, 6.0));
    }

    #[test]
    fn scaled_screen_pushes_later_screens() {
        let screens = vec![
            ScreenImage::new(RectF::new(0.0, 0.0, 4.0, 4.0), solid(8, 8, RED), 2.0),
            ScreenImage::new(RectF::new(4.0, 0.0, 4.0, 4.0), solid(4, 4, BLUE), 1.0),
        ];
        let canvas = assemble(&screens, Platform::Wayland);
        assert_eq!(canvas.placements, vec![(0, 0), (8, 0)]);
        assert_eq!(canvas.image.dimensions(), (12, 8));
        assert_eq!(canvas.image.get_pixel(7, 7).0, RED);
        assert_eq!(canvas.image.get_pixel(9, 1).0, BLUE);
    }

    #[test]
    fn correction_depends_on_screen_order() {
        let hidpi = ScreenImage::new(RectF::new(0.0, 0.0, 4.0, 4.0), solid(8, 8, RED), 2.0);
        let plain = ScreenImage::new(RectF::new(4.0, 0.0, 4.0, 4.0), solid(4, 4, BLUE), 1.0);
        let forward = placements(&[hidpi.clone(), plain.clone()], Point::default());
        let reversed = placements(&[plain, hidpi], Point::default());
        assert_eq!(forward[1], (8, 0));
        // Listed first, the plain screen is never corrected
        assert_eq!(reversed[0], (4, 0));
    }

    #[test]
    fn crop_canvas_returns_whole_canvas_for_full_selection() {
        let canvas = solid(6, 4, RED);
        let full = crop_canvas(&canvas, RectF::new(0.0, 0.0, 6.0, 4.0), 1.0);
        assert_eq!(full, canvas);
        let part = crop_canvas(&canvas, RectF::new(1.0, 0.0, 2.0, 2.0), 2.0);
        assert_eq!(part.dimensions(), (4, 4));
        // Clipped to the canvas
        let clipped = crop_canvas(&canvas, RectF::new(4.0, 2.0, 10.0, 10.0), 1.0);
        assert_eq!(clipped.dimensions(), (2, 2));
    }

    #[test]
    fn single_covering_screen_keeps_native_pixels() {
        let mut raw = solid(200, 100, RED);
        raw.put_pixel(3, 7, Rgba(BLUE));
        let screens = vec![ScreenImage::new(RectF::new(0.0, 0.0, 100.0, 50.0), raw.clone(), 2.0)];
        let capture = crop_screens(&screens, RectF::new(0.0, 0.0, 100.0, 50.0), RectF::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(capture.image, raw);
        assert_eq!(capture.device_pixel_ratio, 2.0);
    }

    #[test]
    fn spanning_selection_is_scaled_to_highest_ratio() {
        let screens = vec![
            ScreenImage::new(RectF::new(0.0, 0.0, 4.0, 4.0), solid(4, 4, RED), 1.0),
            ScreenImage::new(RectF::new(4.0, 0.0, 4.0, 4.0), solid(8, 8, BLUE), 2.0),
        ];
        let rect = RectF::new(0.0, 0.0, 8.0, 4.0);
        let capture = crop_screens(&screens, rect, RectF::new(2.0, 0.0, 4.0, 4.0));
        assert_eq!(capture.device_pixel_ratio, 2.0);
        assert_eq!(capture.image.dimensions(), (8, 8));
        assert_eq!(capture.image.get_pixel(1, 1).0, RED);
        assert_eq!(capture.image.get_pixel(6, 6).0, BLUE);
    }
}
