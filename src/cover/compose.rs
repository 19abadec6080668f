//! Image compositor for cover artifacts.
//!
//! Two pure operations on byte buffers, both producing a square JPEG of
//! the requested size: resize-and-letterbox for real artwork, and
//! gradient synthesis for the placeholder fallback. Neither touches disk
//! or network; the caller owns persistence.

use std::io::Cursor;

use ab_glyph::{Font, FontRef, PxScale, ScaleFont, point};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use rand::Rng;

use crate::error::{Error, Result};

/// JPEG quality for every encoded artifact.
const JPEG_QUALITY: u8 = 85;

/// Character budget for the rendered title, ellipsis included.
pub const TITLE_MAX_CHARS: usize = 20;

/// Character budget for the rendered artist, ellipsis included.
pub const ARTIST_MAX_CHARS: usize = 25;

const FONT_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const FONT_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Curated 2-color gradient pairs. Selection is pseudo-random via the
/// caller-supplied rng so tests can pin it.
const PALETTE: [[[u8; 3]; 2]; 10] = [
    [[138, 43, 226], [75, 0, 130]],
    [[255, 20, 147], [220, 20, 60]],
    [[30, 144, 255], [0, 191, 255]],
    [[255, 69, 0], [255, 140, 0]],
    [[148, 0, 211], [72, 61, 139]],
    [[0, 128, 128], [0, 191, 191]],
    [[255, 0, 127], [127, 0, 255]],
    [[220, 20, 60], [255, 105, 180]],
    [[0, 100, 200], [100, 150, 255]],
    [[255, 127, 0], [255, 69, 0]],
];

/// Decode arbitrary image bytes and fit them onto a black square canvas.
///
/// The longer dimension is scaled to `target`, preserving aspect ratio;
/// the shorter dimension is letterboxed. Fails with a decode error when
/// the bytes are not a valid raster image.
pub fn resize_letterbox(data: &[u8], target: u32) -> Result<Vec<u8>> {
    let original = image::load_from_memory(data)?;

    let (width, height) = (original.width(), original.height());
    let ratio = width as f64 / height as f64;
    let (new_width, new_height) = if ratio > 1.0 {
        (target, ((target as f64 / ratio) as u32).max(1))
    } else {
        (((target as f64 * ratio) as u32).max(1), target)
    };

    let resized = original
        .resize_exact(new_width, new_height, FilterType::Triangle)
        .to_rgb8();

    let mut canvas = RgbImage::from_pixel(target, target, Rgb([0, 0, 0]));
    let x = ((target - new_width) / 2) as i64;
    let y = ((target - new_height) / 2) as i64;
    image::imageops::overlay(&mut canvas, &resized, x, y);

    encode_jpeg(canvas)
}

/// Synthesize a gradient placeholder labeled with title and artist.
///
/// Corner-to-corner linear gradient from a palette pair picked through
/// `rng`, a translucent note glyph near center, and drop-shadowed text
/// near the bottom: bold truncated title over regular truncated artist.
pub fn gradient_cover(
    title: &str,
    artist: &str,
    target: u32,
    rng: &mut impl Rng,
) -> Result<Vec<u8>> {
    let [from, to] = PALETTE[rng.random_range(0..PALETTE.len())];

    let span = (2 * target.saturating_sub(1)).max(1) as f32;
    let mut canvas = RgbImage::from_fn(target, target, |x, y| {
        let t = (x + y) as f32 / span;
        Rgb([
            lerp(from[0], to[0], t),
            lerp(from[1], to[1], t),
            lerp(from[2], to[2], t),
        ])
    });

    draw_note_glyph(&mut canvas, target);

    let bold =
        FontRef::try_from_slice(FONT_BOLD).map_err(|e| Error::invalid_format(e.to_string()))?;
    let regular =
        FontRef::try_from_slice(FONT_REGULAR).map_err(|e| Error::invalid_format(e.to_string()))?;

    // Layout constants are tuned for a 400px canvas and scale linearly.
    let s = target as f32 / 400.0;
    let title_text = truncate_label(title, TITLE_MAX_CHARS);
    let artist_text = truncate_label(artist, ARTIST_MAX_CHARS);

    draw_centered_label(
        &mut canvas,
        &bold,
        PxScale::from(24.0 * s),
        target as f32 - 80.0 * s,
        &title_text,
        1.0,
        2.0 * s,
    );
    draw_centered_label(
        &mut canvas,
        &regular,
        PxScale::from(18.0 * s),
        target as f32 - 50.0 * s,
        &artist_text,
        0.78,
        2.0 * s,
    );

    encode_jpeg(canvas)
}

/// Truncate a label to `max` characters, ellipsis included.
pub fn truncate_label(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn lerp(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

fn encode_jpeg(canvas: RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    encoder.encode_image(&DynamicImage::ImageRgb8(canvas))?;
    Ok(buf)
}

/// Simple eighth-note motif: two stems under a beam, two note heads.
fn draw_note_glyph(canvas: &mut RgbImage, target: u32) {
    let s = target as f32 / 400.0;
    let white = [255, 255, 255];
    let alpha = 0.7;
    let cx = target as f32 / 2.0;
    let cy = target as f32 / 2.0 - 30.0 * s;

    fill_rect(canvas, cx - 28.0 * s, cy - 45.0 * s, 6.0 * s, 80.0 * s, white, alpha);
    fill_rect(canvas, cx + 22.0 * s, cy - 45.0 * s, 6.0 * s, 80.0 * s, white, alpha);
    fill_rect(canvas, cx - 28.0 * s, cy - 45.0 * s, 56.0 * s, 12.0 * s, white, alpha);
    fill_circle(canvas, cx - 32.0 * s, cy + 35.0 * s, 12.0 * s, white, alpha);
    fill_circle(canvas, cx + 18.0 * s, cy + 35.0 * s, 12.0 * s, white, alpha);
}

/// Render one horizontally centered text line with a drop shadow.
fn draw_centered_label(
    canvas: &mut RgbImage,
    font: &FontRef,
    scale: PxScale,
    baseline: f32,
    text: &str,
    alpha: f32,
    shadow_offset: f32,
) {
    let width = text_width(font, scale, text);
    let x = (canvas.width() as f32 - width) / 2.0;

    draw_text(
        canvas,
        font,
        scale,
        x + shadow_offset,
        baseline + shadow_offset,
        [0, 0, 0],
        0.4,
        text,
    );
    draw_text(canvas, font, scale, x, baseline, [255, 255, 255], alpha, text);
}

fn text_width(font: &FontRef, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    text.chars().map(|c| scaled.h_advance(font.glyph_id(c))).sum()
}

fn draw_text(
    canvas: &mut RgbImage,
    font: &FontRef,
    scale: PxScale,
    x: f32,
    baseline: f32,
    color: [u8; 3],
    alpha: f32,
    text: &str,
) {
    let scaled = font.as_scaled(scale);
    let mut caret = x;

    for c in text.chars() {
        let glyph_id = font.glyph_id(c);
        let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(glyph_id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i32 + gx as i32;
            let py = bounds.min.y as i32 + gy as i32;
            blend_px(canvas, px, py, color, coverage * alpha);
        });
    }
}

fn fill_rect(canvas: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: [u8; 3], alpha: f32) {
    for py in y as i32..(y + h) as i32 {
        for px in x as i32..(x + w) as i32 {
            blend_px(canvas, px, py, color, alpha);
        }
    }
}

fn fill_circle(canvas: &mut RgbImage, cx: f32, cy: f32, r: f32, color: [u8; 3], alpha: f32) {
    for py in (cy - r) as i32..=(cy + r) as i32 {
        for px in (cx - r) as i32..=(cx + r) as i32 {
            let dx = px as f32 - cx;
            let dy = py as f32 - cy;
            if dx * dx + dy * dy <= r * r {
                blend_px(canvas, px, py, color, alpha);
            }
        }
    }
}

fn blend_px(canvas: &mut RgbImage, x: i32, y: i32, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let a = alpha.clamp(0.0, 1.0);
    let px = canvas.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        px.0[i] = (px.0[i] as f32 * (1.0 - a) + color[i] as f32 * a).round() as u8;
    }
}
