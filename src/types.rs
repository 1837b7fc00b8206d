// Core types shared by the surface, the history and the compositor.

use std::fmt;

/// The picture being edited, at its native resolution.
/// Visual: what you see underneath the pink mask overlay.
pub type Image = image::RgbaImage;

/// Colour the mask is painted with on screen (the mask itself only stores opacity).
pub const STROKE_COLOR: [u8; 3] = [236, 72, 153];

/// Per-pixel paint opacity in [0,255], aligned with the image.
/// Visual: unseen directly; the overlay tints the image by this amount.
#[derive(Clone, PartialEq, Eq)]
pub struct MaskBuffer {
    width: u32,
    height: u32,
    alpha: Vec<u8>, // length = width * height, row-major
}

impl MaskBuffer {
    /// A fully transparent mask (nothing painted).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap raw opacity bytes. Returns `None` when the length does not match `width * height`.
    pub fn from_raw(width: u32, height: u32, alpha: Vec<u8>) -> Option<Self> {
        if alpha.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            alpha,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    pub(crate) fn alpha_mut(&mut self) -> &mut [u8] {
        &mut self.alpha
    }

    /// Opacity at (x,y), or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.alpha[y as usize * self.width as usize + x as usize])
    }

    pub fn is_clear(&self) -> bool {
        self.alpha.iter().all(|&a| a == 0)
    }

    /// Number of pixels with any paint at all.
    pub fn painted_pixels(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0).count()
    }

    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    /// Bytes held by the opacity plane.
    pub fn byte_len(&self) -> usize {
        self.alpha.len()
    }
}

impl fmt::Debug for MaskBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("painted", &self.painted_pixels())
            .finish()
    }
}

/// Strict on/off mask: `true` marks a pixel to be regenerated.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    opaque: Vec<bool>,
}

impl BinaryMask {
    pub(crate) fn from_parts(width: u32, height: u32, opaque: Vec<bool>) -> Self {
        debug_assert_eq!(opaque.len(), width as usize * height as usize);
        Self {
            width,
            height,
            opaque,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.opaque
    }

    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.opaque[y as usize * self.width as usize + x as usize]
    }

    pub fn opaque_count(&self) -> usize {
        self.opaque.iter().filter(|&&o| o).count()
    }

    /// Reinterpret as an opacity mask (0 or 255 per pixel).
    pub fn to_opacity(&self) -> MaskBuffer {
        let alpha = self.opaque.iter().map(|&o| if o { 255 } else { 0 }).collect();
        MaskBuffer {
            width: self.width,
            height: self.height,
            alpha,
        }
    }
}

impl fmt::Debug for BinaryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("opaque", &self.opaque_count())
            .finish()
    }
}
