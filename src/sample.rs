//! Sample and encoding types shared by all chunk kinds

use crate::error::ChunkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a chunk's value codec
///
/// Only `Float64`, `Int64` and `String` are backed by codecs today;
/// `Boolean` and `Uint64` are reserved tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Encoding {
    /// No value codec
    None = 0,
    /// Gorilla XOR float compression
    Float64 = 1,
    /// Zigzag-delta integer compression
    Int64 = 2,
    /// Reserved
    Boolean = 3,
    /// Snappy-framed strings
    String = 4,
    /// Reserved
    Uint64 = 5,
}

impl TryFrom<u8> for Encoding {
    type Error = ChunkError;

    fn try_from(value: u8) -> Result<Self, ChunkError> {
        match value {
            0 => Ok(Encoding::None),
            1 => Ok(Encoding::Float64),
            2 => Ok(Encoding::Int64),
            3 => Ok(Encoding::Boolean),
            4 => Ok(Encoding::String),
            5 => Ok(Encoding::Uint64),
            _ => Err(ChunkError::UnknownEncoding(value)),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::None => write!(f, "none"),
            Encoding::Float64 => write!(f, "float64"),
            Encoding::Int64 => write!(f, "int64"),
            Encoding::Boolean => write!(f, "boolean"),
            Encoding::String => write!(f, "string"),
            Encoding::Uint64 => write!(f, "uint64"),
        }
    }
}

/// A single timestamped value
///
/// Timestamps are nanoseconds since the Unix epoch. A chunk holds samples
/// of exactly one variant; `Empty` is the sentinel for an unknown type and
/// reports `i64::MIN` as its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sample {
    /// 64-bit float value
    Float64 { t: i64, v: f64 },
    /// 64-bit signed integer value
    Int64 { t: i64, v: i64 },
    /// Arbitrary byte-string value
    String { t: i64, v: Vec<u8> },
    /// Unknown-type sentinel
    Empty,
}

impl Sample {
    /// Create a float sample
    pub fn float64(t: i64, v: f64) -> Self {
        Sample::Float64 { t, v }
    }

    /// Create an integer sample
    pub fn int64(t: i64, v: i64) -> Self {
        Sample::Int64 { t, v }
    }

    /// Create a string sample
    pub fn string(t: i64, v: impl Into<Vec<u8>>) -> Self {
        Sample::String { t, v: v.into() }
    }

    /// Timestamp in nanoseconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        match self {
            Sample::Float64 { t, .. } | Sample::Int64 { t, .. } | Sample::String { t, .. } => *t,
            Sample::Empty => i64::MIN,
        }
    }

    /// The encoding a chunk must carry to store this sample
    pub fn encoding(&self) -> Encoding {
        match self {
            Sample::Float64 { .. } => Encoding::Float64,
            Sample::Int64 { .. } => Encoding::Int64,
            Sample::String { .. } => Encoding::String,
            Sample::Empty => Encoding::None,
        }
    }

    /// Approximate in-memory size in bytes, for capacity planning
    pub fn size(&self) -> usize {
        match self {
            Sample::Float64 { .. } | Sample::Int64 { .. } => 16,
            Sample::String { v, .. } => 8 + v.len(),
            Sample::Empty => 0,
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Float64 { t, v } => write!(f, "{} {}", t, v),
            Sample::Int64 { t, v } => write!(f, "{} {}", t, v),
            Sample::String { t, v } => write!(f, "{} {}", t, String::from_utf8_lossy(v)),
            Sample::Empty => Ok(()),
        }
    }
}
