//! Boundary to whatever grabs the screens

use image::RgbaImage;

use super::image::ScreenImage;
use crate::domain::RectF;

/// A connected screen as reported by the backend
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenInfo {
    pub name: String,
    /// Logical geometry on the virtual desktop
    pub geometry: RectF,
    pub device_pixel_ratio: f32,
}

/// Supplies screens and one captured image per screen, in the same order
pub trait ImageSource {
    fn screens(&self) -> Vec<ScreenInfo>;

    fn capture(&self) -> anyhow::Result<Vec<RgbaImage>>;
}

/// Pair every screen with its image.
///
/// A count mismatch means the backend and the screen list disagree about
/// the desktop; nothing sensible can be assembled from that.
pub fn gather(source: &dyn ImageSource) -> anyhow::Result<Vec<ScreenImage>> {
    let screens = source.screens();
    let images = source.capture()?;
    if screens.len() != images.len() {
        log::error!(
            "Got {} images for {} screens, refusing to assemble",
            images.len(),
            screens.len()
        );
        anyhow::bail!(
            "screen count ({}) does not match image count ({})",
            screens.len(),
            images.len()
        );
    }
    anyhow::ensure!(!screens.is_empty(), "no screens to capture");

    Ok(screens
        .into_iter()
        .zip(images)
        .map(|(screen, image)| ScreenImage::new(screen.geometry, image, screen.device_pixel_ratio))
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Source backed by images already in memory
    pub(crate) struct FixedSource {
        pub screens: Vec<ScreenInfo>,
        pub images: Vec<RgbaImage>,
    }

    impl ImageSource for FixedSource {
        fn screens(&self) -> Vec<ScreenInfo> {
            self.screens.clone()
        }

        fn capture(&self) -> anyhow::Result<Vec<RgbaImage>> {
            Ok(self.images.clone())
        }
    }

    pub(crate) fn screen(name: &str, geometry: RectF, dpr: f32) -> ScreenInfo {
        ScreenInfo {
            name: name.to_string(),
            geometry,
            device_pixel_ratio: dpr,
        }
    }

    #[test]
    fn pairs_screens_with_images() {
        let source = FixedSource {
            screens: vec![
                screen("left", RectF::new(0.0, 0.0, 4.0, 4.0), 1.0),
                screen("right", RectF::new(4.0, 0.0, 2.0, 2.0), 2.0),
            ],
            images: vec![RgbaImage::new(4, 4), RgbaImage::new(4, 4)],
        };
        let screens = gather(&source).expect("gather");
        assert_eq!(screens.len(), 2);
        assert_eq!(screens[1].rect, RectF::new(4.0, 0.0, 2.0, 2.0));
        assert_eq!(screens[1].device_pixel_ratio, 2.0);
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();
        let source = FixedSource {
            screens: vec![screen("only", RectF::new(0.0, 0.0, 4.0, 4.0), 1.0)],
            images: vec![RgbaImage::new(4, 4), RgbaImage::new(4, 4)],
        };
        let err = gather(&source).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn capture_errors_propagate() {
        struct Broken;
        impl ImageSource for Broken {
            fn screens(&self) -> Vec<ScreenInfo> {
                Vec::new()
            }
            fn capture(&self) -> anyhow::Result<Vec<RgbaImage>> {
                anyhow::bail!("portal closed")
            }
        }
        assert!(gather(&Broken).is_err());
    }
}
