//! Screen image types handed in by the capture backend and out on accept

use image::RgbaImage;

use crate::domain::{Point, RectF, Size};

/// One screen's capture together with where the screen sits on the
/// virtual desktop
#[derive(Clone, Debug)]
pub struct ScreenImage {
    /// Logical geometry of the screen
    pub rect: RectF,
    pub image: RgbaImage,
    pub device_pixel_ratio: f32,
}

impl ScreenImage {
    pub fn new(rect: RectF, image: RgbaImage, device_pixel_ratio: f32) -> Self {
        log::debug!(
            "ScreenImage at {},{}: {}x{} pixels, dpr {}",
            rect.x,
            rect.y,
            image.width(),
            image.height(),
            device_pixel_ratio
        );
        Self {
            rect,
            image,
            device_pixel_ratio,
        }
    }

    /// Build the logical geometry from the image size and its ratio
    pub fn at(position: Point, image: RgbaImage, device_pixel_ratio: f32) -> Self {
        let logical = logical_size(image.width(), image.height(), device_pixel_ratio);
        Self::new(RectF::from_origin_size(position, logical), image, device_pixel_ratio)
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_size(&self) -> Size {
        Size::new(self.width() as f32, self.height() as f32)
    }

    /// Image size divided by the ratio, rounded to whole logical pixels
    pub fn logical_size(&self) -> Size {
        logical_size(self.width(), self.height(), self.device_pixel_ratio)
    }

    pub fn is_scaled(&self) -> bool {
        (self.device_pixel_ratio - 1.0).abs() > f32::EPSILON
    }
}

fn logical_size(width: u32, height: u32, device_pixel_ratio: f32) -> Size {
    let dpr = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
    Size::new(
        (width as f32 / dpr).round(),
        (height as f32 / dpr).round(),
    )
}

/// Accepted region, ready for export
#[derive(Clone, Debug, PartialEq)]
pub struct Capture {
    pub image: RgbaImage,
    /// Ratio that maps the image back onto the logical selection
    pub device_pixel_ratio: f32,
    /// Accepted selection in canvas coordinates
    pub region: RectF,
}
