// Error types for the masking engine and its collaborators.
// Every variant states *where* things went wrong.

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Image and mask disagree on size. Only a lifecycle bug can cause this.
    #[error("dimension mismatch: image is {image:?}, mask is {mask:?}")]
    DimensionMismatch { image: (u32, u32), mask: (u32, u32) },

    #[error("encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("no image loaded")]
    NoImage,

    #[error("an edit request is already in flight")]
    Busy,

    #[error("nothing to retry: no mask and instruction from a previous attempt")]
    NothingToRetry,

    #[error(transparent)]
    Inpaint(#[from] InpaintError),
}

/// Failures reported by the inference collaborator.
#[derive(thiserror::Error, Debug)]
pub enum InpaintError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("the API key is not valid")]
    InvalidApiKey,

    #[error("the model returned no image")]
    NoImage,

    #[error("request failed: {0}")]
    Http(String),

    #[error("could not decode the returned image: {0}")]
    Decode(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
