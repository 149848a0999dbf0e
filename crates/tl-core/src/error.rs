//! Error types for the timeline engine

use thiserror::Error;

use crate::{BlockId, TrackRef};

/// Core error type
#[derive(Error, Debug)]
pub enum TlError {
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Track not found: {0}")]
    TrackNotFound(TrackRef),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid track reference: {0}")]
    InvalidTrackRef(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TlError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias
pub type TlResult<T> = Result<T, TlError>;
