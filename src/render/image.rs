//! Flatten annotations onto an image using tiny-skia
//!
//! Paths are in logical coordinates. `origin` is the logical position of
//! the image's top-left pixel and `scale` its device pixel ratio.

use image::{RgbaImage, imageops};
use tiny_skia::{BlendMode, Color, Mask, Paint, Pixmap, Transform};

use crate::annotations::text::{Font, TextMeasure};
use crate::annotations::traits::{Fill, Shadow, TextKind, TraitSet};
use crate::annotations::validity::{TraitKind, is_valid_trait_opt, is_visible};
use crate::domain::{FillRule, Path, Point, Rect, RectF};

/// Opacity of the drop shadow before blurring
const SHADOW_ALPHA: u8 = 128;

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

fn skia_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::Winding => tiny_skia::FillRule::Winding,
        FillRule::OddEven => tiny_skia::FillRule::EvenOdd,
    }
}

/// Logical to image pixel mapping
fn to_pixels(origin: Point, scale: f32) -> Transform {
    Transform::from_row(scale, 0.0, 0.0, scale, -origin.x * scale, -origin.y * scale)
}

fn fill_path(img: &mut RgbaImage, path: &Path, color: Color, blend: BlendMode, ts: Transform) {
    let Some(skia_path) = path.to_skia() else {
        return;
    };
    with_pixmap(img, |pixmap| {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        paint.blend_mode = blend;
        pixmap.fill_path(&skia_path, &paint, skia_fill_rule(path.fill_rule()), ts, None);
    });
}

/// Pixel bounds of a logical rect, clipped to the image
fn pixel_rect(img: &RgbaImage, rect: RectF, origin: Point, scale: f32) -> Option<Rect> {
    let r = rect
        .translated(-origin.x, -origin.y)
        .scaled(scale)
        .to_aligned_rect();
    r.intersect(Rect::new(0, 0, img.width() as i32, img.height() as i32))
}

/// Block-average the image in `block` sized squares, starting at the
/// top-left corner
pub fn pixelated(src: &RgbaImage, block: u32) -> RgbaImage {
    let mut out = src.clone();
    let block = block.max(1);
    let (w, h) = (src.width(), src.height());

    let mut block_y = 0;
    while block_y < h {
        let block_end_y = (block_y + block).min(h);

        let mut block_x = 0;
        while block_x < w {
            let block_end_x = (block_x + block).min(w);

            let mut total = [0u64; 4];
            let mut pixel_count: u64 = 0;
            for py in block_y..block_end_y {
                for px in block_x..block_end_x {
                    let pixel = src.get_pixel(px, py);
                    for (t, c) in total.iter_mut().zip(pixel.0) {
                        *t += c as u64;
                    }
                    pixel_count += 1;
                }
            }

            if pixel_count > 0 {
                let avg = image::Rgba(total.map(|t| (t / pixel_count) as u8));
                for py in block_y..block_end_y {
                    for px in block_x..block_end_x {
                        out.put_pixel(px, py, avg);
                    }
                }
            }

            block_x += block;
        }
        block_y += block;
    }
    out
}

/// Cheap blur: smooth down-scale by `factor` then smooth up-scale back
pub fn blurred(src: &RgbaImage, factor: f32) -> RgbaImage {
    let (w, h) = (src.width(), src.height());
    if w == 0 || h == 0 || factor <= 1.0 {
        return src.clone();
    }
    let small_w = ((w as f32 / factor).round() as u32).max(1);
    let small_h = ((h as f32 / factor).round() as u32).max(1);
    let small = imageops::resize(src, small_w, small_h, imageops::FilterType::Triangle);
    imageops::resize(&small, w, h, imageops::FilterType::Triangle)
}

/// Replace the pixels under `path` with a blurred or pixelated copy
fn apply_effect(img: &mut RgbaImage, path: &Path, fill: &Fill, origin: Point, scale: f32) {
    let Some(area) = pixel_rect(img, path.bounding_rect(), origin, scale) else {
        return;
    };
    let Some(dims) = area.dimensions() else {
        return;
    };
    let (x0, y0) = (area.left as u32, area.top as u32);
    let region = imageops::crop_imm(&*img, x0, y0, dims.width(), dims.height()).to_image();
    // Effects scale with the device pixel ratio so high DPI images look the same
    let effected = match fill {
        Fill::Blur { factor } => blurred(&region, *factor as f32 * scale),
        Fill::Pixelate { factor } => {
            pixelated(&region, ((*factor as f32) * scale).round().max(1.0) as u32)
        }
        Fill::Brush(_) => return,
    };

    let (Some(skia_path), Some(mut mask)) = (path.to_skia(), Mask::new(img.width(), img.height()))
    else {
        return;
    };
    mask.fill_path(
        &skia_path,
        skia_fill_rule(path.fill_rule()),
        true,
        to_pixels(origin, scale),
    );
    let coverage = mask.data();
    let stride = img.width() as usize;
    for (x, y, effect_px) in effected.enumerate_pixels() {
        let (ix, iy) = (x0 + x, y0 + y);
        let cov = coverage[iy as usize * stride + ix as usize];
        if cov == 0 {
            continue;
        }
        let dst = img.get_pixel_mut(ix, iy);
        let a = cov as f32 / 255.0;
        for (d, s) in dst.0.iter_mut().zip(effect_px.0) {
            *d = (s as f32 * a + *d as f32 * (1.0 - a)).round() as u8;
        }
    }
}

/// Shape used for the drop shadow: the stroke outline, else the fill
fn shadow_shape(traits: &TraitSet) -> Option<&Path> {
    if is_valid_trait_opt(traits, TraitKind::Stroke, false) {
        return traits.stroke.as_ref().map(|s| &s.path);
    }
    if is_valid_trait_opt(traits, TraitKind::Fill, false) {
        return traits.geometry.as_ref().map(|g| &g.path);
    }
    None
}

fn draw_shadow(img: &mut RgbaImage, shape: &Path, origin: Point, scale: f32) {
    let (w, h) = (img.width(), img.height());
    let Some(skia_path) = shape.to_skia() else {
        return;
    };
    let Some(mut layer) = Pixmap::new(w, h) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, SHADOW_ALPHA);
    paint.anti_alias = true;
    let ts = to_pixels(origin, scale)
        .pre_translate(Shadow::X_OFFSET, Shadow::Y_OFFSET);
    layer.fill_path(&skia_path, &paint, skia_fill_rule(shape.fill_rule()), ts, None);

    let Some(layer) = RgbaImage::from_raw(w, h, layer.data().to_vec()) else {
        return;
    };
    let soft = imageops::blur(&layer, Shadow::RADIUS * scale / 2.0);
    imageops::overlay(img, &soft, 0, 0);
}

fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: [u8; 4], coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let a = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
    let dst = img.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        dst.0[i] = (color[i] as f32 * a + dst.0[i] as f32 * (1.0 - a)).round() as u8;
    }
    dst.0[3] = (255.0 * a + dst.0[3] as f32 * (1.0 - a)).round() as u8;
}

fn draw_text(
    img: &mut RgbaImage,
    traits: &TraitSet,
    origin: Point,
    scale: f32,
    measure: &dyn TextMeasure,
) {
    let (Some(text), Some(geometry)) = (traits.text.as_ref(), traits.geometry.as_ref()) else {
        return;
    };
    let Some(color) = text.brush.color() else {
        return;
    };
    let rgba = color.to_color_u8();
    let rgba = [rgba.red(), rgba.green(), rgba.blue(), rgba.alpha()];
    let content = text.text();
    let bounds = geometry.path.bounding_rect();
    let top_left = match text.kind() {
        TextKind::String => bounds.top_left(),
        TextKind::Number => {
            let size = measure.text_size(&text.font, &content, measure.tab_stop(&text.font));
            Point::new(
                bounds.horizontal_center() - size.width / 2.0,
                bounds.vertical_center() - size.height / 2.0,
            )
        }
    };

    let device_font = Font::new(text.font.family.clone(), text.font.pixel_size * scale);
    let line_height = measure.height(&text.font);
    for (i, line) in content.split('\n').enumerate() {
        let line_origin = Point::new(
            (top_left.x - origin.x) * scale,
            (top_left.y + i as f32 * line_height - origin.y) * scale,
        );
        let drawn = measure.draw_line(&device_font, line, line_origin, &mut |x, y, cov| {
            blend_pixel(img, x, y, rgba, cov)
        });
        if !drawn {
            log::debug!("No glyph outlines available, skipping text");
            return;
        }
    }
}

/// Paint one annotation: shadow, fill, stroke, then text
pub fn render_traits(
    img: &mut RgbaImage,
    traits: &TraitSet,
    origin: Point,
    scale: f32,
    measure: &dyn TextMeasure,
) {
    let Some(geometry) = traits.geometry.as_ref() else {
        return;
    };
    let ts = to_pixels(origin, scale);
    let blend = if traits.highlight.is_some() {
        BlendMode::Multiply
    } else {
        BlendMode::SourceOver
    };

    if traits.shadow.is_some_and(|s| s.enabled)
        && let Some(shape) = shadow_shape(traits)
    {
        draw_shadow(img, shape, origin, scale);
    }

    if is_valid_trait_opt(traits, TraitKind::Fill, false)
        && let Some(fill) = traits.fill.as_ref()
    {
        match fill {
            Fill::Brush(brush) => {
                if let Some(color) = brush.color() {
                    fill_path(img, &geometry.path, color, blend, ts);
                }
            }
            Fill::Blur { .. } | Fill::Pixelate { .. } => {
                apply_effect(img, &geometry.path, fill, origin, scale);
            }
        }
    }

    if is_valid_trait_opt(traits, TraitKind::Stroke, false)
        && let Some(stroke) = traits.stroke.as_ref()
        && let Some(color) = stroke.pen.brush.color()
    {
        fill_path(img, &stroke.path, color, blend, ts);
    }

    if is_valid_trait_opt(traits, TraitKind::Text, false) {
        draw_text(img, traits, origin, scale, measure);
    }
}

/// Paint every visible annotation in order, later ones on top
pub fn render_annotations(
    img: &mut RgbaImage,
    items: &[TraitSet],
    origin: Point,
    scale: f32,
    measure: &dyn TextMeasure,
) {
    let mut drawn = 0usize;
    for traits in items.iter().filter(|t| is_visible(t)) {
        render_traits(img, traits, origin, scale, measure);
        drawn += 1;
    }
    log::debug!(
        "Flattened {drawn} of {} annotations onto {}x{} image",
        items.len(),
        img.width(),
        img.height()
    );
}
