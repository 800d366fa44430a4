//! Chunk containers
//!
//! Every chunk shares a three-byte frame: the encoding tag in the high
//! nibble of byte 0 and a big-endian u16 sample count in bytes 1..3. The
//! payload interleaves timestamp bits with value bits, one pair per
//! sample. A chunk is mutated only through its single appender (an
//! exclusive borrow) and scanned through any number of iterators.

mod float64;
mod int64;
mod string;

pub use float64::{FloatAppender, FloatChunk, FloatIter};
pub use int64::{IntAppender, IntChunk, IntIter};
pub use string::{StringAppender, StringChunk, StringIter};

use crate::error::{ChunkError, Result};
use crate::sample::{Encoding, Sample};
use bytes::{Buf, BufMut};

/// Frame bytes preceding the payload
pub(crate) const HEADER_LEN: usize = 3;

/// Initial buffer capacity for a fresh chunk
pub(crate) const INITIAL_CAPACITY: usize = 1024;

/// Sample count from the frame header
pub(crate) fn read_count(bytes: &[u8]) -> u16 {
    if bytes.len() < HEADER_LEN {
        return 0;
    }
    let mut header = &bytes[1..HEADER_LEN];
    header.get_u16()
}

/// Store the sample count into the frame header
pub(crate) fn write_count(bytes: &mut [u8], count: u16) {
    let mut header = &mut bytes[1..HEADER_LEN];
    header.put_u16(count);
}

/// The codec payload after the frame header
pub(crate) fn payload(bytes: &[u8]) -> &[u8] {
    bytes.get(HEADER_LEN..).unwrap_or(&[])
}

/// Make sure an adopted buffer carries a frame header
///
/// Buffers too short to hold the frame are replaced by an empty framed
/// buffer, so a chunk recycled with fresh bytes is immediately usable.
pub(crate) fn frame_buffer(mut data: Vec<u8>, encoding: Encoding) -> Vec<u8> {
    if data.len() < HEADER_LEN {
        data.clear();
        data.reserve(INITIAL_CAPACITY);
        data.extend_from_slice(&[(encoding as u8) << 4, 0, 0]);
    }
    data
}

/// A chunk of any supported encoding
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Gorilla XOR floats
    Float64(FloatChunk),
    /// Zigzag-delta integers
    Int64(IntChunk),
    /// Snappy-framed strings
    String(StringChunk),
}

impl Chunk {
    /// Create an empty chunk of the given encoding
    pub fn new(encoding: Encoding) -> Result<Self> {
        match encoding {
            Encoding::Float64 => Ok(Chunk::Float64(FloatChunk::new())),
            Encoding::Int64 => Ok(Chunk::Int64(IntChunk::new())),
            Encoding::String => Ok(Chunk::String(StringChunk::new())),
            other => Err(ChunkError::UnknownEncoding(other as u8)),
        }
    }

    /// Reconstitute a chunk from a serialized buffer
    ///
    /// The buffer moves into the chunk. Fails with `UnknownEncoding` for
    /// tags without a codec, including the reserved `Boolean`/`Uint64`.
    pub fn from_data(encoding: Encoding, data: Vec<u8>) -> Result<Self> {
        match encoding {
            Encoding::Float64 => Ok(Chunk::Float64(FloatChunk::from_bytes(data))),
            Encoding::Int64 => Ok(Chunk::Int64(IntChunk::from_bytes(data))),
            Encoding::String => Ok(Chunk::String(StringChunk::from_bytes(data))),
            other => Err(ChunkError::UnknownEncoding(other as u8)),
        }
    }

    /// The whole chunk buffer, header included
    pub fn bytes(&self) -> &[u8] {
        match self {
            Chunk::Float64(c) => c.bytes(),
            Chunk::Int64(c) => c.bytes(),
            Chunk::String(c) => c.bytes(),
        }
    }

    /// This chunk's encoding tag
    pub fn encoding(&self) -> Encoding {
        match self {
            Chunk::Float64(_) => Encoding::Float64,
            Chunk::Int64(_) => Encoding::Int64,
            Chunk::String(_) => Encoding::String,
        }
    }

    /// Number of samples appended so far
    pub fn num_samples(&self) -> usize {
        match self {
            Chunk::Float64(c) => c.num_samples(),
            Chunk::Int64(c) => c.num_samples(),
            Chunk::String(c) => c.num_samples(),
        }
    }

    /// Open the chunk for appending
    pub fn appender(&mut self) -> Result<ChunkAppender<'_>> {
        match self {
            Chunk::Float64(c) => Ok(ChunkAppender::Float64(c.appender()?)),
            Chunk::Int64(c) => Ok(ChunkAppender::Int64(c.appender()?)),
            Chunk::String(c) => Ok(ChunkAppender::String(c.appender()?)),
        }
    }

    /// Iterate the chunk from the beginning
    pub fn iter(&self) -> ChunkIter<'_> {
        match self {
            Chunk::Float64(c) => ChunkIter::Float64(c.iter()),
            Chunk::Int64(c) => ChunkIter::Int64(c.iter()),
            Chunk::String(c) => ChunkIter::String(c.iter()),
        }
    }
}

/// Write cursor over any chunk kind
#[derive(Debug)]
pub enum ChunkAppender<'a> {
    Float64(FloatAppender<'a>),
    Int64(IntAppender<'a>),
    String(StringAppender<'a>),
}

impl ChunkAppender<'_> {
    /// Append one sample; the chunk is untouched on error
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        match self {
            ChunkAppender::Float64(a) => a.append(sample),
            ChunkAppender::Int64(a) => a.append(sample),
            ChunkAppender::String(a) => a.append(sample),
        }
    }
}

/// Single-pass iterator over any chunk kind
#[derive(Debug)]
pub enum ChunkIter<'a> {
    Float64(FloatIter<'a>),
    Int64(IntIter<'a>),
    String(StringIter<'a>),
    /// Holds no data and yields nothing
    Nop,
}

impl ChunkIter<'_> {
    /// An iterator over no data at all
    pub fn nop() -> Self {
        ChunkIter::Nop
    }
}

impl Iterator for ChunkIter<'_> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ChunkIter::Float64(it) => it.next(),
            ChunkIter::Int64(it) => it.next(),
            ChunkIter::String(it) => it.next(),
            ChunkIter::Nop => None,
        }
    }
}
