// Software rendering of what the window shows.
// Visual outcomes:
// - Editor: the photo scaled to the window with the painted mask as a translucent pink layer.
// - Result: before/after comparison split by a vertical slider line.

use crate::gamma::GammaLut;
use crate::surface::RasterSurface;
use crate::types::Image;

/// Window pixels, each 0x00RRGGBB (the layout minifb presents).
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }
}

/// How the mask layer is tinted on screen.
#[derive(Clone, Copy, Debug)]
pub struct Overlay {
    pub color: [u8; 3],
    pub opacity: f32,
}

#[inline]
fn pack(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Largest size with the image's aspect ratio that fits in `max_w` x `max_h`.
/// Images are only shrunk, never enlarged.
pub fn fit_within(image_w: u32, image_h: u32, max_w: usize, max_h: usize) -> (usize, usize) {
    let (iw, ih) = (image_w.max(1) as f64, image_h.max(1) as f64);
    let scale = (max_w as f64 / iw).min(max_h as f64 / ih).min(1.0);
    let w = ((iw * scale).round() as usize).max(1);
    let h = ((ih * scale).round() as usize).max(1);
    (w, h)
}

/// Source column/row for display position `d` out of `display` when the source has `src` pixels.
#[inline]
fn sample_index(d: usize, display: usize, src: u32) -> u32 {
    let i = (d as u64 * u64::from(src)) / display.max(1) as u64;
    (i as u32).min(src.saturating_sub(1))
}

/// Checkerboard shade behind transparent pixels.
#[inline]
fn checker(x: usize, y: usize) -> u8 {
    if ((x / 8) + (y / 8)) % 2 == 0 { 0x66 } else { 0x99 }
}

/// Nearest-neighbour image sample composited over the checkerboard.
#[inline]
fn image_rgb(img: &Image, dx: usize, dy: usize, fb: &FrameBuffer, lut: &GammaLut) -> [u8; 3] {
    let sx = sample_index(dx, fb.width, img.width());
    let sy = sample_index(dy, fb.height, img.height());
    let p = img.get_pixel(sx, sy).0;
    let a = f32::from(p[3]) / 255.0;
    let bg = checker(dx, dy);
    [
        lut.mix(bg, p[0], a),
        lut.mix(bg, p[1], a),
        lut.mix(bg, p[2], a),
    ]
}

/// Draw the editing view: image plus the mask tinted by `overlay`.
pub fn render_editor(fb: &mut FrameBuffer, surface: &RasterSurface, overlay: Overlay, lut: &GammaLut) {
    let img = surface.image();
    let mask = surface.mask();
    if img.width() == 0 || img.height() == 0 {
        fb.pixels.fill(0);
        return;
    }
    for dy in 0..fb.height {
        let sy = sample_index(dy, fb.height, img.height());
        for dx in 0..fb.width {
            let sx = sample_index(dx, fb.width, img.width());
            let [r, g, b] = image_rgb(img, dx, dy, fb, lut);
            let paint = mask.get(sx, sy).unwrap_or(0);
            let t = f32::from(paint) / 255.0 * overlay.opacity;
            let [cr, cg, cb] = overlay.color;
            fb.pixels[dy * fb.width + dx] =
                pack(lut.mix(r, cr, t), lut.mix(g, cg, t), lut.mix(b, cb, t));
        }
    }
}

/// Draw the comparison view. Left of the slider shows `edited`, right shows `original`.
/// `slider_percent` is clamped to 0..=100. Each image is stretched to the frame independently.
pub fn render_compare(
    fb: &mut FrameBuffer,
    original: &Image,
    edited: &Image,
    slider_percent: f32,
    lut: &GammaLut,
) {
    let split = ((slider_percent.clamp(0.0, 100.0) / 100.0) * fb.width as f32).round() as usize;
    for dy in 0..fb.height {
        for dx in 0..fb.width {
            let src = if dx < split { edited } else { original };
            let px = if src.width() == 0 || src.height() == 0 {
                0
            } else {
                let [r, g, b] = image_rgb(src, dx, dy, fb, lut);
                pack(r, g, b)
            };
            fb.pixels[dy * fb.width + dx] = px;
        }
    }

    // Divider: a 2 px light line at the split.
    for dy in 0..fb.height {
        for dx in split.saturating_sub(1)..(split + 1).min(fb.width) {
            fb.pixels[dy * fb.width + dx] = 0x00_EE_EE_EE;
        }
    }
}
