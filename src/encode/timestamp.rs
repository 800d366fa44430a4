//! Delta-of-delta timestamp codec
//!
//! The first timestamp is a signed varint, the second stores the initial
//! delta as an unsigned varint, and every later sample stores the second
//! difference behind a variable-length prefix code. Regularly spaced
//! series collapse to one bit per timestamp.

use super::bitstream::{BReader, BStream};
use crate::error::{ChunkError, Result};

/// Streaming timestamp encoder
///
/// The container passes the sample ordinal with every call; state carries
/// only the last timestamp and delta so an encoder can be restored from a
/// decoder when a partially filled chunk is reopened.
#[derive(Debug, Clone, Default)]
pub struct TimestampEncoder {
    t: i64,
    t_delta: u64,
}

impl TimestampEncoder {
    /// Create an encoder for an empty chunk
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore an encoder from replayed decoder state
    pub fn restore(t: i64, t_delta: u64) -> Self {
        Self { t, t_delta }
    }

    /// Encode `t` as the sample at position `ordinal`
    pub fn encode(&mut self, b: &mut BStream, t: i64, ordinal: u16) {
        let mut t_delta = 0u64;

        if ordinal == 0 {
            b.write_varint(t);
        } else if ordinal == 1 {
            t_delta = t.wrapping_sub(self.t) as u64;
            b.write_uvarint(t_delta);
        } else {
            t_delta = t.wrapping_sub(self.t) as u64;
            let dod = t_delta.wrapping_sub(self.t_delta) as i64;

            if dod == 0 {
                b.write_bit(false);
            } else if bit_range(dod, 14) {
                b.write_bits(0b10, 2);
                b.write_bits(dod as u64, 14);
            } else if bit_range(dod, 17) {
                b.write_bits(0b110, 3);
                b.write_bits(dod as u64, 17);
            } else if bit_range(dod, 20) {
                b.write_bits(0b1110, 4);
                b.write_bits(dod as u64, 20);
            } else {
                b.write_bits(0b1111, 4);
                b.write_bits(dod as u64, 64);
            }
        }

        self.t = t;
        self.t_delta = t_delta;
    }
}

/// True if `x` fits the asymmetric `nbits`-wide two's-complement window
fn bit_range(x: i64, nbits: u8) -> bool {
    -((1i64 << (nbits - 1)) - 1) <= x && x <= 1i64 << (nbits - 1)
}

/// Streaming timestamp decoder
#[derive(Debug, Clone)]
pub struct TimestampDecoder {
    t: i64,
    t_delta: u64,
    read: u16,
    total: u16,
}

impl TimestampDecoder {
    /// Create a decoder expecting `total` timestamps
    pub fn new(total: u16) -> Self {
        Self {
            t: 0,
            t_delta: 0,
            read: 0,
            total,
        }
    }

    /// Last decoded timestamp
    pub fn t(&self) -> i64 {
        self.t
    }

    /// Last decoded delta
    pub fn t_delta(&self) -> u64 {
        self.t_delta
    }

    /// Decode the next timestamp; `Ok(None)` once all are read
    pub fn next(&mut self, r: &mut BReader<'_>) -> Result<Option<i64>> {
        if self.read >= self.total {
            return Ok(None);
        }

        if self.read == 0 {
            self.t = r.read_varint()?;
            self.read = 1;
            return Ok(Some(self.t));
        }
        if self.read == 1 {
            self.t_delta = r.read_uvarint()?;
            self.t = self.t.wrapping_add(self.t_delta as i64);
            self.read = 2;
            return Ok(Some(self.t));
        }

        // Scan up to four leading ones to pick the dod bucket.
        let mut d = 0u8;
        for _ in 0..4 {
            d <<= 1;
            if !r.read_bit().ok_or(ChunkError::EndOfStream)? {
                break;
            }
            d |= 1;
        }

        let mut size = 0u8;
        let mut dod = 0i64;
        match d {
            0x00 => {}
            0x02 => size = 14,
            0x06 => size = 17,
            0x0e => size = 20,
            _ => {
                dod = r.read_bits(64).ok_or(ChunkError::EndOfStream)? as i64;
            }
        }

        if size != 0 {
            let bits = r.read_bits(size as usize).ok_or(ChunkError::EndOfStream)?;
            dod = bits as i64;
            // Strictly greater: the window's upper bound 1 << (size-1) is a
            // positive value, not a sign bit.
            if bits > 1 << (size - 1) {
                dod -= 1i64 << size;
            }
        }

        self.t_delta = self.t_delta.wrapping_add(dod as u64);
        self.t = self.t.wrapping_add(self.t_delta as i64);
        self.read += 1;
        Ok(Some(self.t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(timestamps: &[i64]) -> Vec<i64> {
        let mut b = BStream::new();
        let mut enc = TimestampEncoder::new();
        for (i, &t) in timestamps.iter().enumerate() {
            enc.encode(&mut b, t, i as u16);
        }

        let mut r = BReader::new(b.bytes());
        let mut dec = TimestampDecoder::new(timestamps.len() as u16);
        let mut out = Vec::new();
        while let Some(t) = dec.next(&mut r).unwrap() {
            out.push(t);
        }
        out
    }

    #[test]
    fn test_regular_intervals() {
        let input: Vec<i64> = (0..100).map(|i| 1234123324 + i * 1000).collect();
        assert_eq!(roundtrip(&input), input);
    }

    #[test]
    fn test_irregular_intervals() {
        let input = vec![100, 160, 225, 400, 401, 10_000, 10_060];
        assert_eq!(roundtrip(&input), input);
    }

    #[test]
    fn test_single_and_pair() {
        assert_eq!(roundtrip(&[1234123324]), vec![1234123324]);
        assert_eq!(roundtrip(&[1234123324, 1234123325]), vec![1234123324, 1234123325]);
    }

    #[test]
    fn test_negative_and_backwards() {
        // Timestamps may regress; deltas wrap through u64.
        let input = vec![-5000, -4000, -4500, 0, 100];
        assert_eq!(roundtrip(&input), input);
    }

    #[test]
    fn test_dod_bucket_boundaries() {
        // Each window is [-(2^(n-1)-1), 2^(n-1)]; exercise both edges of
        // the 14, 17 and 20 bit buckets plus the 64-bit fallback.
        for &dod in &[
            0i64,
            1,
            -1,
            (1 << 13) - 1,
            1 << 13,
            -((1 << 13) - 1),
            1 << 16,
            -((1 << 16) - 1),
            1 << 19,
            -((1 << 19) - 1),
            1 << 20,
            i64::MAX / 4,
        ] {
            let base_delta = 1 << 21;
            let input = vec![0, base_delta, 2 * base_delta + dod];
            assert_eq!(roundtrip(&input), input, "dod {}", dod);
        }
    }

    #[test]
    fn test_constant_delta_is_one_bit() {
        let mut b = BStream::new();
        let mut enc = TimestampEncoder::new();
        enc.encode(&mut b, 1000, 0);
        enc.encode(&mut b, 2000, 1);
        let before = b.len_bits();
        enc.encode(&mut b, 3000, 2);
        assert_eq!(b.len_bits(), before + 1);
    }

    #[test]
    fn test_truncated_stream_errors() {
        let mut b = BStream::new();
        let mut enc = TimestampEncoder::new();
        for (i, t) in [10, 2000, 3500].into_iter().enumerate() {
            enc.encode(&mut b, t, i as u16);
        }

        // The first timestamp fits one varint byte; cut everything after it.
        let bytes = b.bytes();
        let mut r = BReader::new(&bytes[..1]);
        let mut dec = TimestampDecoder::new(3);
        assert_eq!(dec.next(&mut r).unwrap(), Some(10));
        assert!(dec.next(&mut r).is_err());
    }
}
