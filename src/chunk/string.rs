//! String chunk with Snappy-framed values
//!
//! Values are compressed individually: a whole-byte varint with the
//! frame length, then the raw Snappy frame. Timestamps use the shared
//! delta-of-delta codec; byte writes realign across the bit stream
//! transparently.

use super::{payload, read_count, write_count, HEADER_LEN, INITIAL_CAPACITY};
use crate::encode::{BReader, BStream, TimestampDecoder, TimestampEncoder};
use crate::error::{ChunkError, Result};
use crate::sample::{Encoding, Sample};
use tracing::trace;

/// Append-only chunk of string samples
#[derive(Debug, Clone)]
pub struct StringChunk {
    b: BStream,
}

impl StringChunk {
    /// Create an empty chunk with the framing header in place
    pub fn new() -> Self {
        let mut b = BStream::with_header(HEADER_LEN, INITIAL_CAPACITY);
        b.bytes_mut()[0] = (Encoding::String as u8) << 4;
        Self { b }
    }

    /// Adopt a serialized chunk buffer
    pub(crate) fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            b: BStream::from_bytes(super::frame_buffer(data, Encoding::String)),
        }
    }

    /// Swap in a new buffer, recycling the chunk shell
    pub(crate) fn reset(&mut self, data: Vec<u8>) {
        self.b = BStream::from_bytes(super::frame_buffer(data, Encoding::String));
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
        Encoding::String
    }

    /// Number of samples appended so far
    pub fn num_samples(&self) -> usize {
        read_count(self.b.bytes()) as usize
    }

    /// Open the chunk for appending, replaying the payload for state
    pub fn appender(&mut self) -> Result<StringAppender<'_>> {
        let total = read_count(self.b.bytes());
        let mut r = BReader::new(payload(self.b.bytes()));
        let mut tdec = TimestampDecoder::new(total);
        while tdec.next(&mut r)?.is_some() {
            // Values carry no codec state; skip over the frame.
            let len = r.read_uvarint()? as usize;
            if len > r.remaining_bytes() {
                return Err(ChunkError::MalformedBlock {
                    needed: len,
                    remaining: r.remaining_bytes(),
                });
            }
            for _ in 0..len {
                r.read_byte().ok_or(ChunkError::EndOfStream)?;
            }
        }
        trace!(samples = total, "reopening string chunk appender");

        Ok(StringAppender {
            b: &mut self.b,
            tenc: TimestampEncoder::restore(tdec.t(), tdec.t_delta()),
        })
    }

    /// Iterate the chunk from the beginning
    pub fn iter(&self) -> StringIter<'_> {
        let total = read_count(self.b.bytes());
        StringIter {
            r: BReader::new(payload(self.b.bytes())),
            tdec: TimestampDecoder::new(total),
            done: false,
        }
    }
}

impl Default for StringChunk {
    fn default() -> Self {
        Self::new()
    }
}

/// Write cursor for a [`StringChunk`]
#[derive(Debug)]
pub struct StringAppender<'a> {
    b: &'a mut BStream,
    tenc: TimestampEncoder,
}

impl StringAppender<'_> {
    /// Append one sample; the chunk is untouched on error
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        let (t, v) = match sample {
            Sample::String { t, v } => (*t, v),
            other => {
                return Err(ChunkError::TypeMismatch {
                    expected: Encoding::String,
                    got: other.encoding(),
                })
            }
        };
        let frame = snap::raw::Encoder::new().compress_vec(v)?;

        let num = read_count(self.b.bytes());
        self.tenc.encode(self.b, t, num);
        self.b.write_uvarint(frame.len() as u64);
        for &byte in &frame {
            self.b.write_byte(byte);
        }
        write_count(self.b.bytes_mut(), num.wrapping_add(1));
        Ok(())
    }
}

/// Single-pass iterator over a [`StringChunk`]
#[derive(Debug)]
pub struct StringIter<'a> {
    r: BReader<'a>,
    tdec: TimestampDecoder,
    done: bool,
}

impl StringIter<'_> {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        let t = match self.tdec.next(&mut self.r)? {
            Some(t) => t,
            None => return Ok(None),
        };

        let len = self.r.read_uvarint()? as usize;
        if len > self.r.remaining_bytes() {
            return Err(ChunkError::MalformedBlock {
                needed: len,
                remaining: self.r.remaining_bytes(),
            });
        }
        let mut frame = Vec::with_capacity(len);
        for _ in 0..len {
            frame.push(self.r.read_byte().ok_or(ChunkError::EndOfStream)?);
        }

        let v = snap::raw::Decoder::new().decompress_vec(&frame)?;
        Ok(Some(Sample::String { t, v }))
    }
}

impl Iterator for StringIter<'_> {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(chunk: &StringChunk) -> Vec<Sample> {
        chunk.iter().collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let input = vec![
            Sample::string(1000, "hello world"),
            Sample::string(2000, ""),
            Sample::string(3000, "hello world".repeat(50)),
        ];

        let mut chunk = StringChunk::new();
        let mut app = chunk.appender().unwrap();
        for s in &input {
            app.append(s).unwrap();
        }
        drop(app);

        assert_eq!(chunk.num_samples(), 3);
        assert_eq!(collect(&chunk), input);
    }

    #[test]
    fn test_binary_values() {
        let input = vec![
            Sample::string(1, vec![0u8, 1, 2, 255, 254]),
            Sample::string(2, vec![0u8; 4096]),
        ];
        let mut chunk = StringChunk::new();
        let mut app = chunk.appender().unwrap();
        for s in &input {
            app.append(s).unwrap();
        }
        drop(app);
        assert_eq!(collect(&chunk), input);
    }

    #[test]
    fn test_type_mismatch() {
        let mut chunk = StringChunk::new();
        let mut app = chunk.appender().unwrap();
        let err = app.append(&Sample::Empty).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::TypeMismatch {
                expected: Encoding::String,
                got: Encoding::None,
            }
        ));
    }

    #[test]
    fn test_reopen_appender_mid_stream() {
        let mut chunk = StringChunk::new();
        let mut expected = Vec::new();
        let mut ts = 1234123324i64;

        for block in 0..10 {
            let mut app = chunk.appender().unwrap();
            for i in 0..10 {
                let n = block * 10 + i;
                ts += (n % 71 + 1) as i64;
                let s = Sample::string(ts, "hello world".repeat(n % 100));
                app.append(&s).unwrap();
                expected.push(s);
            }
        }

        assert_eq!(chunk.num_samples(), 100);
        assert_eq!(collect(&chunk), expected);
    }

    #[test]
    fn test_truncated_frame_is_malformed() {
        let mut chunk = StringChunk::new();
        let mut app = chunk.appender().unwrap();
        app.append(&Sample::string(1000, "hello world")).unwrap();
        drop(app);

        // Chop the tail off the frame; the length prefix now overruns.
        let cut = chunk.bytes().len() - 4;
        let truncated = chunk.bytes()[..cut].to_vec();
        let reopened = StringChunk::from_bytes(truncated);
        let err = reopened.iter().next().unwrap().unwrap_err();
        assert!(matches!(err, ChunkError::MalformedBlock { .. }));
    }
}
