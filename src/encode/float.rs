//! Gorilla XOR float codec
//!
//! Values are stored as the XOR against the previous sample's bit
//! pattern. Identical values cost one bit; otherwise only the significant
//! window is written, reusing the previous leading/trailing-zero window
//! when it still fits.

use super::bitstream::{BReader, BStream};
use crate::error::{ChunkError, Result};

/// Sentinel for "no significant-bit window written yet"
const NO_WINDOW: u8 = 0xff;

/// Streaming float encoder
#[derive(Debug, Clone)]
pub struct FloatEncoder {
    v_bits: u64,
    leading: u8,
    trailing: u8,
}

impl FloatEncoder {
    /// Create an encoder for an empty chunk
    pub fn new() -> Self {
        Self {
            v_bits: 0,
            leading: NO_WINDOW,
            trailing: 0,
        }
    }

    /// Restore an encoder from replayed decoder state
    pub fn restore(v_bits: u64, leading: u8, trailing: u8) -> Self {
        Self {
            v_bits,
            leading,
            trailing,
        }
    }

    /// Encode `v` as the sample at position `ordinal`
    pub fn encode(&mut self, b: &mut BStream, v: f64, ordinal: u16) {
        let bits = v.to_bits();
        if ordinal == 0 {
            b.write_bits(bits, 64);
            self.v_bits = bits;
            return;
        }

        let xor = bits ^ self.v_bits;
        if xor == 0 {
            b.write_bit(false);
        } else {
            b.write_bit(true);

            let mut leading = xor.leading_zeros() as u8;
            let trailing = xor.trailing_zeros() as u8;
            // Clamp so leading always fits the 5-bit window field.
            if leading >= 32 {
                leading = 31;
            }

            if self.leading != NO_WINDOW && leading >= self.leading && trailing >= self.trailing
            {
                b.write_bit(false);
                b.write_bits(
                    xor >> self.trailing,
                    (64 - self.leading - self.trailing) as usize,
                );
            } else {
                self.leading = leading;
                self.trailing = trailing;

                b.write_bit(true);
                b.write_bits(leading as u64, 5);
                // sigbits can never be 64 here (xor != 0), so the stored 0
                // is free to mean 64 on the decode side.
                let sigbits = 64 - leading - trailing;
                b.write_bits(sigbits as u64, 6);
                b.write_bits(xor >> trailing, sigbits as usize);
            }
        }

        self.v_bits = bits;
    }
}

impl Default for FloatEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming float decoder
#[derive(Debug, Clone)]
pub struct FloatDecoder {
    val: u64,
    leading: u8,
    trailing: u8,
    read: u16,
    total: u16,
}

impl FloatDecoder {
    /// Create a decoder expecting `total` values
    pub fn new(total: u16) -> Self {
        Self {
            val: 0,
            leading: 0,
            trailing: 0,
            read: 0,
            total,
        }
    }

    /// Bit pattern of the last decoded value
    pub fn value_bits(&self) -> u64 {
        self.val
    }

    /// Current significant-bit window as (leading, trailing)
    pub fn window(&self) -> (u8, u8) {
        (self.leading, self.trailing)
    }

    /// Decode the next value; `Ok(None)` once all are read
    pub fn next(&mut self, r: &mut BReader<'_>) -> Result<Option<f64>> {
        if self.read >= self.total {
            return Ok(None);
        }

        if self.read == 0 {
            self.val = r.read_bits(64).ok_or(ChunkError::EndOfStream)?;
            self.read = 1;
            return Ok(Some(f64::from_bits(self.val)));
        }

        if r.read_bit().ok_or(ChunkError::EndOfStream)? {
            if r.read_bit().ok_or(ChunkError::EndOfStream)? {
                // New window.
                let leading = r.read_bits(5).ok_or(ChunkError::EndOfStream)? as u8;
                let mut sigbits = r.read_bits(6).ok_or(ChunkError::EndOfStream)? as u8;
                // A stored 0 means all 64 bits are significant.
                if sigbits == 0 {
                    sigbits = 64;
                }
                if leading as u16 + sigbits as u16 > 64 {
                    return Err(ChunkError::EndOfStream);
                }
                self.leading = leading;
                self.trailing = 64 - leading - sigbits;
            }

            let sigbits = 64 - self.leading - self.trailing;
            let bits = r.read_bits(sigbits as usize).ok_or(ChunkError::EndOfStream)?;
            self.val ^= bits << self.trailing;
        }

        self.read += 1;
        Ok(Some(f64::from_bits(self.val)))
    }
}
