// Painted mask -> strict on/off mask.
// Any paint at all counts, however faint. Purely per-pixel: no smoothing, no dithering.

use crate::types::{BinaryMask, MaskBuffer};

pub fn binarize(mask: &MaskBuffer) -> BinaryMask {
    let opaque = mask.alpha().iter().map(|&a| a > 0).collect();
    BinaryMask::from_parts(mask.width(), mask.height(), opaque)
}
