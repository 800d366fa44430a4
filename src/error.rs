//! Error types for the chunk codec

use crate::sample::Encoding;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Chunk codec error types
#[derive(Error, Debug)]
pub enum ChunkError {
    /// Tag byte does not map to a known codec
    #[error("unknown chunk encoding: {0}")]
    UnknownEncoding(u8),

    /// Appended sample variant disagrees with the chunk encoding
    #[error("sample type mismatch: chunk encodes {expected}, got {got}")]
    TypeMismatch { expected: Encoding, got: Encoding },

    /// Bit stream exhausted mid-decode
    #[error("unexpected end of chunk stream")]
    EndOfStream,

    /// Varint continuation overflowed 64 bits
    #[error("malformed varint in chunk payload")]
    MalformedVarint,

    /// Length prefix exceeds the remaining payload
    #[error("block length {needed} exceeds remaining {remaining} bytes")]
    MalformedBlock { needed: usize, remaining: usize },

    /// Simple8b selector or payload inconsistent
    #[error("simple8b: {0}")]
    Simple8bDecode(String),

    /// Snappy frame invalid
    #[error("snappy decode: {0}")]
    SnappyDecode(#[from] snap::Error),
}

impl ChunkError {
    /// Check if the error indicates a truncated or corrupt payload
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            ChunkError::EndOfStream
                | ChunkError::MalformedVarint
                | ChunkError::MalformedBlock { .. }
                | ChunkError::Simple8bDecode(_)
                | ChunkError::SnappyDecode(_)
        )
    }
}
