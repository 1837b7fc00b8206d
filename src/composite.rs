// Punch the binary mask out of the image to build the inpainting payload.
// Visual: the masked area becomes a transparent hole; everything else is untouched.

use std::io::Cursor;

use image::ImageFormat;

use crate::binarize::binarize;
use crate::error::{Error, Result};
use crate::types::{BinaryMask, Image, MaskBuffer};

/// Copy of `image` with every opaque mask pixel set to fully transparent.
/// Pixels outside the mask are byte-identical to the source.
pub fn punch_out(image: &Image, mask: &BinaryMask) -> Result<Image> {
    if image.dimensions() != mask.dimensions() {
        return Err(Error::DimensionMismatch {
            image: image.dimensions(),
            mask: mask.dimensions(),
        });
    }

    let mut out = image.clone();
    for (px, &hole) in out.pixels_mut().zip(mask.as_slice()) {
        if hole {
            // RGB under a zero alpha carries no meaning; zero it like a cleared canvas.
            px.0 = [0, 0, 0, 0];
        }
    }
    Ok(out)
}

/// Binarize the painted mask and punch it out of `image` in one go.
#[tracing::instrument(skip_all, fields(w = image.width(), h = image.height()))]
pub fn payload(image: &Image, mask: &MaskBuffer) -> Result<Image> {
    let binary = binarize(mask);
    tracing::debug!(holes = binary.opaque_count(), "built binary mask");
    punch_out(image, &binary)
}

/// An image serialized in a self-describing format, ready to ship.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl EncodedImage {
    /// PNG keeps per-pixel alpha, which is how the "fill here" signal travels.
    pub fn png(image: &Image) -> Result<Self> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(Error::Encode)?;
        Ok(Self {
            bytes,
            mime_type: "image/png",
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn decode(&self) -> Result<Image> {
        image::load_from_memory(&self.bytes)
            .map(|img| img.to_rgba8())
            .map_err(Error::Decode)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
