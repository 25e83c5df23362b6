//! Error types for atlas build operations.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. External error types (`std::io::Error`, `image::ImageError`)
//! are automatically converted via `From` impls.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while checking or packing atlases.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading sources, writing pages, moving artifacts).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source image could not be decoded, or a page could not be encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A target's source directory vanished after the target was constructed.
    #[error("Source directory not found: {0}")]
    MissingSourceDir(Utf8PathBuf),

    /// [`PackSettings`](crate::PackSettings) failed validation.
    #[error("Invalid pack settings: {0}")]
    InvalidSettings(String),

    /// A source image does not fit on a page of the configured maximum size.
    #[error("Image '{path}' ({width}x{height}) does not fit in a {max_width}x{max_height} page")]
    ImageTooLarge {
        path: Utf8PathBuf,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    /// A [`Packer`](crate::Packer) failed for a stale target.
    #[error("Packing '{target}' failed: {source}")]
    Packing {
        target: String,
        #[source]
        source: Box<Error>,
    },

    /// Catch-all for errors from custom packers and other sources.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
