//! Block codec for integer sequences
//!
//! Values are delta-encoded and zigzagged as they arrive; on finish the
//! block picks run-length encoding when every delta matches, falls back
//! to raw u64 words when a delta overflows Simple8b's range, and packs
//! with Simple8b otherwise. The first byte's high nibble carries the
//! chosen layout.

use super::bitstream::{unzigzag, zigzag, BReader, BStream};
use super::simple8b;
use crate::error::{ChunkError, Result};

/// Raw u64 per value
const INT_UNCOMPRESSED: u8 = 0;
/// Simple8b-packed deltas
const INT_PACKED_SIMPLE: u8 = 1;
/// Run-length encoded constant delta
const INT_RLE: u8 = 2;

/// One-shot integer block encoder
#[derive(Debug, Clone)]
pub struct IntegerEncoder {
    prev: i64,
    rle: bool,
    values: Vec<u64>,
}

impl IntegerEncoder {
    /// Create an encoder sized for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            prev: 0,
            rle: true,
            values: Vec::with_capacity(capacity),
        }
    }

    /// Create an encoder with default capacity
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    /// Append a value; deltas are taken against the previous append
    pub fn append(&mut self, v: i64) {
        let delta = v.wrapping_sub(self.prev);
        self.prev = v;
        let enc = zigzag(delta);
        if self.values.len() > 1 {
            self.rle = self.rle && self.values[self.values.len() - 1] == enc;
        }
        self.values.push(enc);
    }

    /// Number of values appended so far
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reset to the initial state, keeping the allocation
    pub fn reset(&mut self) {
        self.prev = 0;
        self.rle = true;
        self.values.clear();
    }

    /// Encode the accumulated values into a tagged block
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.rle && self.values.len() > 2 {
            return Ok(self.encode_rle());
        }
        if self.values.iter().any(|&v| v > simple8b::MAX_VALUE) {
            // Too wide for the packed format.
            return Ok(self.encode_uncompressed());
        }
        self.encode_packed()
    }

    fn encode_rle(self) -> Vec<u8> {
        let mut b = BStream::new();
        b.write_byte(INT_RLE << 4);
        // Seed value, the repeated delta, then the repeat count.
        b.write_bits(self.values[0], 64);
        b.write_bits(self.values[1], 64);
        b.write_bits((self.values.len() - 1) as u64, 64);
        b.into_bytes()
    }

    fn encode_packed(self) -> Result<Vec<u8>> {
        if self.values.is_empty() {
            return Ok(Vec::new());
        }
        let mut b = BStream::new();
        b.write_byte(INT_PACKED_SIMPLE << 4);
        // The seed value is stored unpacked.
        b.write_bits(self.values[0], 64);
        for word in simple8b::encode_all(&self.values[1..])? {
            b.write_bits(word, 64);
        }
        Ok(b.into_bytes())
    }

    fn encode_uncompressed(self) -> Vec<u8> {
        let mut b = BStream::new();
        b.write_byte(INT_UNCOMPRESSED << 4);
        for &v in &self.values {
            b.write_bits(v, 64);
        }
        b.into_bytes()
    }
}

impl Default for IntegerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot integer block decoder
#[derive(Debug, Clone)]
pub struct IntegerDecoder<'a> {
    r: BReader<'a>,
    encoding: u8,
    total: u16,
    read: u16,

    values: [u64; simple8b::MAX_COUNT],
    idx: usize,
    n: usize,
    prev: i64,
    first: bool,

    rle_first: u64,
    rle_delta: u64,
}

impl<'a> IntegerDecoder<'a> {
    /// Create a decoder over a tagged block expecting `total` values
    pub fn new(data: &'a [u8], total: u16) -> Self {
        let (encoding, rest): (u8, &[u8]) = if total == 0 || data.is_empty() {
            (INT_UNCOMPRESSED, &[])
        } else {
            (data[0] >> 4, &data[1..])
        };
        Self {
            r: BReader::new(rest),
            encoding,
            total,
            read: 0,
            values: [0; simple8b::MAX_COUNT],
            idx: 0,
            n: 0,
            prev: 0,
            first: true,
            rle_first: 0,
            rle_delta: 0,
        }
    }

    /// Decode the next value; `Ok(None)` once all are read
    pub fn next(&mut self) -> Result<Option<i64>> {
        if self.read >= self.total {
            return Ok(None);
        }

        if self.read > 0 {
            self.idx += 1;
        }
        if self.idx >= self.n {
            match self.encoding {
                INT_RLE => self.decode_rle()?,
                INT_PACKED_SIMPLE => self.decode_packed()?,
                INT_UNCOMPRESSED => self.decode_uncompressed()?,
                e => {
                    return Err(ChunkError::Simple8bDecode(format!(
                        "unknown integer block encoding {}",
                        e
                    )))
                }
            }
        }

        let v = match self.encoding {
            INT_RLE => unzigzag(self.rle_first)
                .wrapping_add((self.idx as i64).wrapping_mul(unzigzag(self.rle_delta))),
            _ => {
                let v = unzigzag(self.values[self.idx]).wrapping_add(self.prev);
                self.prev = v;
                v
            }
        };
        self.read += 1;
        Ok(Some(v))
    }

    fn decode_rle(&mut self) -> Result<()> {
        self.rle_first = self.r.read_bits(64).ok_or(ChunkError::EndOfStream)?;
        self.rle_delta = self.r.read_bits(64).ok_or(ChunkError::EndOfStream)?;
        let repeats = self.r.read_bits(64).ok_or(ChunkError::EndOfStream)?;
        self.n = repeats as usize + 1;
        self.idx = 0;
        Ok(())
    }

    fn decode_packed(&mut self) -> Result<()> {
        let word = self.r.read_bits(64).ok_or(ChunkError::EndOfStream)?;
        if self.first {
            // The seed value is stored unpacked.
            self.first = false;
            self.values[0] = word;
            self.n = 1;
        } else {
            self.n = simple8b::decode(&mut self.values, word);
        }
        self.idx = 0;
        Ok(())
    }

    fn decode_uncompressed(&mut self) -> Result<()> {
        let word = self.r.read_bits(64).ok_or(ChunkError::EndOfStream)?;
        self.values[0] = word;
        self.n = 1;
        self.idx = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(block: &[u8], total: u16) -> Vec<i64> {
        let mut dec = IntegerDecoder::new(block, total);
        let mut out = Vec::new();
        while let Some(v) = dec.next().unwrap() {
            out.push(v);
        }
        out
    }

    #[test]
    fn test_constant_delta_picks_rle() {
        let input: Vec<i64> = (0..100).map(|k| 500 + k * 7).collect();
        let mut enc = IntegerEncoder::new();
        for &v in &input {
            enc.append(v);
        }
        let block = enc.finish().unwrap();
        assert_eq!(block[0] >> 4, INT_RLE);
        assert!(block.len() <= 30, "rle block is {} bytes", block.len());
        assert_eq!(decode_all(&block, 100), input);
    }

    #[test]
    fn test_mixed_deltas_pick_packed() {
        let input = vec![10i64, 20, 15, 15];
        let mut enc = IntegerEncoder::new();
        for &v in &input {
            enc.append(v);
        }
        let block = enc.finish().unwrap();
        assert_eq!(block[0] >> 4, INT_PACKED_SIMPLE);
        assert_eq!(decode_all(&block, 4), input);
    }

    #[test]
    fn test_wide_delta_falls_back_to_uncompressed() {
        let input = vec![i64::MIN, i64::MAX, 0];
        let mut enc = IntegerEncoder::new();
        for &v in &input {
            enc.append(v);
        }
        let block = enc.finish().unwrap();
        assert_eq!(block[0] >> 4, INT_UNCOMPRESSED);
        assert_eq!(decode_all(&block, 3), input);
    }

    #[test]
    fn test_two_values_never_rle() {
        let input = vec![5i64, 10];
        let mut enc = IntegerEncoder::new();
        for &v in &input {
            enc.append(v);
        }
        let block = enc.finish().unwrap();
        assert_ne!(block[0] >> 4, INT_RLE);
        assert_eq!(decode_all(&block, 2), input);
    }

    #[test]
    fn test_random_walk_roundtrip() {
        let mut input = Vec::new();
        let mut v = 1243535i64;
        for i in 0..3000i64 {
            v += if i % 2 == 0 { 991 * i } else { -773 * i };
            input.push(v);
        }
        let mut enc = IntegerEncoder::with_capacity(input.len());
        for &v in &input {
            enc.append(v);
        }
        let block = enc.finish().unwrap();
        assert_eq!(decode_all(&block, input.len() as u16), input);
    }

    #[test]
    fn test_empty_block() {
        let enc = IntegerEncoder::new();
        let block = enc.finish().unwrap();
        assert!(block.is_empty());
        assert_eq!(decode_all(&block, 0), Vec::<i64>::new());
    }

    #[test]
    fn test_negative_deltas() {
        let input: Vec<i64> = (0..50).map(|k| 1000 - k * 13).collect();
        let mut enc = IntegerEncoder::new();
        for &v in &input {
            enc.append(v);
        }
        let block = enc.finish().unwrap();
        assert_eq!(block[0] >> 4, INT_RLE);
        assert_eq!(decode_all(&block, 50), input);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut enc = IntegerEncoder::new();
        enc.append(1);
        enc.append(2);
        enc.reset();
        assert!(enc.is_empty());
        enc.append(7);
        let block = enc.finish().unwrap();
        assert_eq!(decode_all(&block, 1), vec![7]);
    }
}
