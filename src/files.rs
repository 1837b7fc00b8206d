// File collaborators: decode the picked picture, export the final result.

use std::path::Path;

use image::ImageFormat;

use crate::error::{Error, Result};
use crate::types::Image;

/// Suggested file name when saving the edited picture.
pub const DEFAULT_EXPORT_NAME: &str = "edited-image.png";

/// Open a picture from disk at its native resolution.
pub fn load_image(path: &Path) -> Result<Image> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let img = decode_image(&bytes)?;
    tracing::info!(path = %path.display(), w = img.width(), h = img.height(), "decoded image");
    Ok(img)
}

/// Decode any format the `image` crate recognizes from its header.
pub fn decode_image(bytes: &[u8]) -> Result<Image> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(Error::Decode)
}

/// Write `image` as PNG (lossless, alpha preserved).
pub fn save_png(image: &Image, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| match e {
            image::ImageError::IoError(io) => Error::io(path, io),
            other => Error::Encode(other),
        })?;
    tracing::info!(path = %path.display(), "saved image");
    Ok(())
}
