//! Float64 chunk backed by Gorilla XOR compression

use super::{payload, read_count, write_count, HEADER_LEN, INITIAL_CAPACITY};
use crate::encode::{
    BReader, BStream, FloatDecoder, FloatEncoder, TimestampDecoder, TimestampEncoder,
};
use crate::error::{ChunkError, Result};
use crate::sample::{Encoding, Sample};
use tracing::trace;

/// Append-only chunk of float samples
#[derive(Debug, Clone)]
pub struct FloatChunk {
    b: BStream,
}

impl FloatChunk {
    /// Create an empty chunk with the framing header in place
    pub fn new() -> Self {
        let mut b = BStream::with_header(HEADER_LEN, INITIAL_CAPACITY);
        b.bytes_mut()[0] = (Encoding::Float64 as u8) << 4;
        Self { b }
    }

    /// Adopt a serialized chunk buffer
    pub(crate) fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            b: BStream::from_bytes(super::frame_buffer(data, Encoding::Float64)),
        }
    }

    /// Swap in a new buffer, recycling the chunk shell
    pub(crate) fn reset(&mut self, data: Vec<u8>) {
        self.b = BStream::from_bytes(super::frame_buffer(data, Encoding::Float64));
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
        Encoding::Float64
    }

    /// Number of samples appended so far
    pub fn num_samples(&self) -> usize {
        read_count(self.b.bytes()) as usize
    }

    /// Open the chunk for appending
    ///
    /// Replays the existing payload to recover the codec state, so a
    /// partially filled chunk can be reopened after the previous appender
    /// was dropped.
    pub fn appender(&mut self) -> Result<FloatAppender<'_>> {
        let total = read_count(self.b.bytes());
        let mut r = BReader::new(payload(self.b.bytes()));
        let mut tdec = TimestampDecoder::new(total);
        let mut vdec = FloatDecoder::new(total);
        while tdec.next(&mut r)?.is_some() {
            vdec.next(&mut r)?;
        }
        trace!(samples = total, "reopening float chunk appender");

        let venc = if total == 0 {
            FloatEncoder::new()
        } else {
            let (leading, trailing) = vdec.window();
            FloatEncoder::restore(vdec.value_bits(), leading, trailing)
        };
        Ok(FloatAppender {
            b: &mut self.b,
            tenc: TimestampEncoder::restore(tdec.t(), tdec.t_delta()),
            venc,
        })
    }

    /// Iterate the chunk from the beginning
    pub fn iter(&self) -> FloatIter<'_> {
        let total = read_count(self.b.bytes());
        FloatIter {
            r: BReader::new(payload(self.b.bytes())),
            tdec: TimestampDecoder::new(total),
            vdec: FloatDecoder::new(total),
            done: false,
        }
    }
}

impl Default for FloatChunk {
    fn default() -> Self {
        Self::new()
    }
}

/// Write cursor for a [`FloatChunk`]
#[derive(Debug)]
pub struct FloatAppender<'a> {
    b: &'a mut BStream,
    tenc: TimestampEncoder,
    venc: FloatEncoder,
}

impl FloatAppender<'_> {
    /// Append one sample; the chunk is untouched on error
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        let (t, v) = match *sample {
            Sample::Float64 { t, v } => (t, v),
            ref other => {
                return Err(ChunkError::TypeMismatch {
                    expected: Encoding::Float64,
                    got: other.encoding(),
                })
            }
        };

        let num = read_count(self.b.bytes());
        self.tenc.encode(self.b, t, num);
        self.venc.encode(self.b, v, num);
        write_count(self.b.bytes_mut(), num.wrapping_add(1));
        Ok(())
    }
}

/// Single-pass iterator over a [`FloatChunk`]
#[derive(Debug)]
pub struct FloatIter<'a> {
    r: BReader<'a>,
    tdec: TimestampDecoder,
    vdec: FloatDecoder,
    done: bool,
}

impl FloatIter<'_> {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        let t = match self.tdec.next(&mut self.r)? {
            Some(t) => t,
            None => return Ok(None),
        };
        let v = self
            .vdec
            .next(&mut self.r)?
            .ok_or(ChunkError::EndOfStream)?;
        Ok(Some(Sample::Float64 { t, v }))
    }
}

impl Iterator for FloatIter<'_> {
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
