//! Transform engine: pure functions over bitmaps.
//!
//! Both operations return a freshly allocated bitmap and never mutate the
//! input. Output is deterministic: identical inputs yield pixel-identical
//! results, which the round-trip tests rely on.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

/// Tone intensity applied by the editor's "apply filter" action.
pub const DEFAULT_TONE_INTENSITY: f32 = 0.8;

/// Inset of the overlay text rectangle from each image edge, in pixels.
const OVERLAY_INSET: i64 = 20;

/// Overlay glyphs are the 8x8 bitmap font scaled up 4x, i.e. 32 px tall.
const OVERLAY_GLYPH_SCALE: i64 = 4;
const GLYPH_SIZE: i64 = 8;

const OVERLAY_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Error)]
pub enum FilterError {
    /// The input carries no pixel data to filter. Undecodable byte streams
    /// are rejected upstream, at asset download time.
    #[error("input has no pixel data to filter")]
    EmptyImage,
}

/// Apply a sepia tone transform at the given intensity (clamped to 0.0–1.0).
///
/// Each channel is moved linearly from its original value towards the sepia
/// weighting of the pixel, so intensity 0.0 reproduces the input exactly.
/// Dimensions are preserved and the input is left untouched.
pub fn apply_tone_filter(image: &DynamicImage, intensity: f32) -> Result<DynamicImage, FilterError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(FilterError::EmptyImage);
    }
    let t = intensity.clamp(0.0, 1.0);
    let mut canvas = image.to_rgba8();
    for pixel in canvas.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
        // Standard sepia-tone weighting.
        let sr = (0.393 * rf + 0.769 * gf + 0.189 * bf).min(255.0);
        let sg = (0.349 * rf + 0.686 * gf + 0.168 * bf).min(255.0);
        let sb = (0.272 * rf + 0.534 * gf + 0.131 * bf).min(255.0);
        pixel.0 = [
            blend_channel(rf, sr, t),
            blend_channel(gf, sg, t),
            blend_channel(bf, sb, t),
            a,
        ];
    }
    Ok(DynamicImage::ImageRgba8(canvas))
}

fn blend_channel(original: f32, toned: f32, t: f32) -> u8 {
    (original + (toned - original) * t).round().clamp(0.0, 255.0) as u8
}

/// Composite `text` onto a copy of `image` at the image's native resolution.
///
/// When `enabled` is false or `text` is empty the result is a pixel-identical
/// copy (still a new bitmap, since the artifact is always recomputed). When
/// enabled, the text is drawn in opaque white, horizontally centered within a
/// rectangle inset [`OVERLAY_INSET`] pixels from each edge, starting at the
/// rectangle's top. Text that does not fit is clipped, never an error.
pub fn composite_overlay(image: &DynamicImage, text: &str, enabled: bool) -> DynamicImage {
    let mut canvas = image.to_rgba8();
    if enabled && !text.is_empty() {
        draw_overlay_text(&mut canvas, text);
    }
    DynamicImage::ImageRgba8(canvas)
}

fn draw_overlay_text(canvas: &mut RgbaImage, text: &str) {
    let width = i64::from(canvas.width());
    let advance = GLYPH_SIZE * OVERLAY_GLYPH_SCALE;
    let mut y = OVERLAY_INSET;

    for line in text.split('\n') {
        let line_width = line.chars().count() as i64 * advance;
        let rect_width = width - 2 * OVERLAY_INSET;
        // Centered within the inset rectangle; overlong lines extend past it
        // symmetrically and are clipped at the image bounds.
        let mut x = OVERLAY_INSET + (rect_width - line_width) / 2;
        for ch in line.chars() {
            draw_glyph(canvas, x, y, ch);
            x += advance;
        }
        y += advance;
    }
}

fn draw_glyph(canvas: &mut RgbaImage, x: i64, y: i64, ch: char) {
    let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
        return;
    };
    for (row_idx, row) in glyph.iter().enumerate() {
        for col_idx in 0..GLYPH_SIZE {
            if (row >> col_idx) & 1 == 0 {
                continue;
            }
            let px = x + col_idx * OVERLAY_GLYPH_SCALE;
            let py = y + row_idx as i64 * OVERLAY_GLYPH_SCALE;
            for sy in 0..OVERLAY_GLYPH_SCALE {
                for sx in 0..OVERLAY_GLYPH_SCALE {
                    put_pixel_clipped(canvas, px + sx, py + sy);
                }
            }
        }
    }
}

fn put_pixel_clipped(canvas: &mut RgbaImage, x: i64, y: i64) {
    if x >= 0 && y >= 0 && x < i64::from(canvas.width()) && y < i64::from(canvas.height()) {
        canvas.put_pixel(x as u32, y as u32, OVERLAY_COLOR);
    }
}
