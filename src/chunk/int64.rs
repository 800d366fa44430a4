//! Int64 chunk backed by streaming zigzag-delta compression
//!
//! Each value is stored as the zigzag of its delta to the previous
//! sample, as a whole-byte varint interleaved with the timestamp bits.
//! For block-at-a-time Simple8b packing see [`crate::encode::IntegerEncoder`].

use super::{payload, read_count, write_count, HEADER_LEN, INITIAL_CAPACITY};
use crate::encode::{unzigzag, zigzag, BReader, BStream, TimestampDecoder, TimestampEncoder};
use crate::error::{ChunkError, Result};
use crate::sample::{Encoding, Sample};
use tracing::trace;

/// Append-only chunk of integer samples
#[derive(Debug, Clone)]
pub struct IntChunk {
    b: BStream,
}

impl IntChunk {
    /// Create an empty chunk with the framing header in place
    pub fn new() -> Self {
        let mut b = BStream::with_header(HEADER_LEN, INITIAL_CAPACITY);
        b.bytes_mut()[0] = (Encoding::Int64 as u8) << 4;
        Self { b }
    }

    /// Adopt a serialized chunk buffer
    pub(crate) fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            b: BStream::from_bytes(super::frame_buffer(data, Encoding::Int64)),
        }
    }

    /// Swap in a new buffer, recycling the chunk shell
    pub(crate) fn reset(&mut self, data: Vec<u8>) {
        self.b = BStream::from_bytes(super::frame_buffer(data, Encoding::Int64));
    }

    /// Drop the buffer entirely
    pub(crate) fn clear(&mut self) {
        self.b = BStream::from_bytes(Vec::new());
    }

    /// The whole chunk buffer, header included
    pub fn bytes(&self) -> &[u8] {
        self.b.bytes()
    }

    /// This chunk's encoding tag
    pub fn encoding(&self) -> Encoding {
        Encoding::Int64
    }

    /// Number of samples appended so far
    pub fn num_samples(&self) -> usize {
        read_count(self.b.bytes()) as usize
    }

    /// Open the chunk for appending, replaying the payload for state
    pub fn appender(&mut self) -> Result<IntAppender<'_>> {
        let total = read_count(self.b.bytes());
        let mut r = BReader::new(payload(self.b.bytes()));
        let mut tdec = TimestampDecoder::new(total);
        let mut last = 0i64;
        while tdec.next(&mut r)?.is_some() {
            last = last.wrapping_add(unzigzag(r.read_uvarint()?));
        }
        trace!(samples = total, "reopening int chunk appender");

        Ok(IntAppender {
            b: &mut self.b,
            tenc: TimestampEncoder::restore(tdec.t(), tdec.t_delta()),
            last,
        })
    }

    /// Iterate the chunk from the beginning
    pub fn iter(&self) -> IntIter<'_> {
        let total = read_count(self.b.bytes());
        IntIter {
            r: BReader::new(payload(self.b.bytes())),
            tdec: TimestampDecoder::new(total),
            cur: 0,
            done: false,
        }
    }
}

impl Default for IntChunk {
    fn default() -> Self {
        Self::new()
    }
}

/// Write cursor for an [`IntChunk`]
#[derive(Debug)]
pub struct IntAppender<'a> {
    b: &'a mut BStream,
    tenc: TimestampEncoder,
    last: i64,
}

impl IntAppender<'_> {
    /// Append one sample; the chunk is untouched on error
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        let (t, v) = match *sample {
            Sample::Int64 { t, v } => (t, v),
            ref other => {
                return Err(ChunkError::TypeMismatch {
                    expected: Encoding::Int64,
                    got: other.encoding(),
                })
            }
        };

        let num = read_count(self.b.bytes());
        self.tenc.encode(self.b, t, num);
        self.b.write_uvarint(zigzag(v.wrapping_sub(self.last)));
        write_count(self.b.bytes_mut(), num.wrapping_add(1));
        self.last = v;
        Ok(())
    }
}

/// Single-pass iterator over an [`IntChunk`]
#[derive(Debug)]
pub struct IntIter<'a> {
    r: BReader<'a>,
    tdec: TimestampDecoder,
    cur: i64,
    done: bool,
}

impl IntIter<'_> {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        let t = match self.tdec.next(&mut self.r)? {
            Some(t) => t,
            None => return Ok(None),
        };
        self.cur = self.cur.wrapping_add(unzigzag(self.r.read_uvarint()?));
        Ok(Some(Sample::Int64 { t, v: self.cur }))
    }
}

impl Iterator for IntIter<'_> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_sample() {
            Ok(Some(sample)) => Some(Ok(sample)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
