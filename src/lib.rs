//! Interactive masking engine for image inpainting.
//!
//! Paint a mask over a picture on a [`RasterSurface`], undo/redo strokes through its
//! [`StrokeHistory`], then let an [`EditSession`] turn the mask into a transparent-hole
//! PNG ([`composite::payload`]) and hand it, with an instruction, to an [`Inpainter`].

#![forbid(unsafe_code)]

pub mod binarize;
pub mod composite;
pub mod config;
pub mod error;
pub mod files;
pub mod gamma;
pub mod gemini;
pub mod history;
pub mod session;
pub mod stroke;
pub mod surface;
pub mod types;
pub mod view;

pub use binarize::binarize;
pub use composite::{EncodedImage, punch_out};
pub use config::Config;
pub use error::{Error, InpaintError, Result};
pub use history::StrokeHistory;
pub use session::{EditRequest, EditSession, Inpainter, Ticket};
pub use surface::{DisplayMapping, RasterSurface};
pub use types::{BinaryMask, Image, MaskBuffer};
