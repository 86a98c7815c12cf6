use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use clipframe::annotations::{AnnotationDocument, Brush, Pen, TraitSet};
use clipframe::capture::{Capture, ImageSource, Platform, ScreenInfo};
use clipframe::config::Settings;
use clipframe::domain::{Path, Point, RectF};
use clipframe::selection::{EditorEvent, SelectionEditor};
use image::RgbaImage;

/// Crop a region out of screenshots taken of each screen
#[derive(Debug, Parser)]
#[command(name = "clipframe", version)]
struct Cli {
    /// Region to capture as x,y,width,height in logical units
    #[arg(long, value_parser = parse_region)]
    region: Option<RectF>,
    /// Outline the capture with a thin border
    #[arg(long)]
    frame: bool,
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// One image per screen, placed left to right
    #[arg(value_name = "SCREEN", required = true)]
    screens: Vec<PathBuf>,
}

/// Screens read from image files, laid out left to right
struct FileSource {
    paths: Vec<PathBuf>,
}

impl FileSource {
    fn open(&self) -> anyhow::Result<Vec<RgbaImage>> {
        self.paths
            .iter()
            .map(|p| {
                image::open(p)
                    .map(|img| img.to_rgba8())
                    .with_context(|| format!("Failed to open {}", p.display()))
            })
            .collect()
    }
}

impl ImageSource for FileSource {
    fn screens(&self) -> Vec<ScreenInfo> {
        let mut x = 0.0;
        let mut screens = Vec::new();
        for path in &self.paths {
            let (w, h) = match image::image_dimensions(path) {
                Ok(dims) => dims,
                Err(e) => {
                    log::warn!("Skipping {}: {e}", path.display());
                    continue;
                }
            };
            screens.push(ScreenInfo {
                name: path.display().to_string(),
                geometry: RectF::new(x, 0.0, w as f32, h as f32),
                device_pixel_ratio: 1.0,
            });
            x += w as f32;
        }
        screens
    }

    fn capture(&self) -> anyhow::Result<Vec<RgbaImage>> {
        self.open()
    }
}

fn parse_region(arg: &str) -> Result<RectF, String> {
    let parts = arg
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in {arg}: {e}"))?;
    match parts[..] {
        [x, y, w, h] => Ok(RectF::new(x, y, w, h)),
        _ => Err(format!("expected x,y,width,height, got {arg}")),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Cli {
        region,
        frame,
        output,
        screens,
    } = Cli::parse();

    let settings_path = Settings::default_path();
    let mut settings = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    settings.start_session();

    let mut editor = SelectionEditor::new(Platform::Wayland, settings);
    editor.load(&FileSource { paths: screens })?;
    if let Some(region) = region {
        editor.set_selection(region);
    }
    anyhow::ensure!(editor.accept(), "Nothing to capture");

    let mut capture = None;
    let mut remember = false;
    for event in editor.take_events() {
        match event {
            EditorEvent::Accepted(c) => capture = Some(c),
            EditorEvent::CropRegion(region) => {
                log::debug!("Remembering region {region:?}");
                remember = true;
            }
            _ => {}
        }
    }
    let Capture {
        mut image,
        device_pixel_ratio,
        region,
    } = *capture.context("Selection was not accepted")?;

    if frame {
        let mut path = Path::new();
        path.add_rect(RectF::new(0.0, 0.0, region.width, region.height));
        let mut doc = AnnotationDocument::default();
        doc.add(
            TraitSet::default()
                .with_geometry(path)
                .with_stroke(Pen::new(2.0, Brush::solid(220, 30, 30, 255))),
            Instant::now(),
        );
        doc.flatten_now(&mut image, Point::default(), device_pixel_ratio);
    }

    image
        .save(&output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    log::info!("Saved {}", output.display());

    if remember && let Some(path) = settings_path {
        editor.settings().save(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_region_and_files() {
        let cli = Cli::try_parse_from([
            "clipframe", "--region", "1, 2,30,40", "--frame", "out.png", "a.png", "b.png",
        ])
        .expect("parse");
        assert_eq!(cli.region, Some(RectF::new(1.0, 2.0, 30.0, 40.0)));
        assert!(cli.frame);
        assert_eq!(cli.output, PathBuf::from("out.png"));
        assert_eq!(cli.screens.len(), 2);
    }

    #[test]
    fn screens_are_required() {
        assert!(Cli::try_parse_from(["clipframe", "out.png"]).is_err());
    }

    #[test]
    fn malformed_region_is_rejected() {
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("1,2,x,4").is_err());
        assert!(Cli::try_parse_from(["clipframe", "--region", "1,2", "out.png", "a.png"]).is_err());
    }
}
