//! Overlay and composition error kinds.

use core_render::{BufferError, Rect};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ImeError {
    #[error("no active primary surface to anchor an overlay to")]
    NoActiveSurface,

    #[error("out of memory")]
    OutOfMemory,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Nothing to draw; absorbed by the redraw path and never escalated.
    #[error("invalid geometry: {0:?}")]
    InvalidGeometry(Rect),
}

impl From<BufferError> for ImeError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::OutOfMemory => ImeError::OutOfMemory,
            BufferError::InvalidSize(_) => {
                ImeError::InvalidArgument("buffer size must be positive")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ImeError>;
