//! Simple8b integer packing
//!
//! Packs up to 240 unsigned integers into a single 64-bit word. The top
//! four bits select an entry from the canonical (count, width) table; the
//! two zero-width selectors encode runs of the value 1.

use crate::error::{ChunkError, Result};

/// Largest value representable in a packed word (60 payload bits)
pub const MAX_VALUE: u64 = (1 << 60) - 1;

/// Maximum number of integers one word can carry
pub const MAX_COUNT: usize = 240;

/// Canonical selector table: (integers per word, bits per integer)
const SELECTORS: [(usize, usize); 16] = [
    (240, 0),
    (120, 0),
    (60, 1),
    (30, 2),
    (20, 3),
    (15, 4),
    (12, 5),
    (10, 6),
    (8, 7),
    (7, 8),
    (6, 10),
    (5, 12),
    (4, 15),
    (3, 20),
    (2, 30),
    (1, 60),
];

fn can_pack(src: &[u64], count: usize, bits: usize) -> bool {
    if src.len() < count {
        return false;
    }
    if bits == 0 {
        return src[..count].iter().all(|&v| v == 1);
    }
    let max = (1u64 << bits) - 1;
    src[..count].iter().all(|&v| v <= max)
}

fn pack(selector: usize, src: &[u64], bits: usize) -> u64 {
    let mut word = (selector as u64) << 60;
    if bits > 0 {
        for (i, &v) in src.iter().enumerate() {
            word |= v << (i * bits);
        }
    }
    word
}

/// Pack all of `src` into 64-bit words
///
/// Greedy: each word takes the densest selector whose window fits the
/// next run of values. Fails if any value exceeds [`MAX_VALUE`].
pub fn encode_all(src: &[u64]) -> Result<Vec<u64>> {
    let mut dst = Vec::with_capacity(src.len() / 2 + 1);
    let mut i = 0;
    while i < src.len() {
        let remaining = &src[i..];
        let packed = SELECTORS
            .iter()
            .enumerate()
            .find(|&(_, &(count, bits))| can_pack(remaining, count, bits))
            .map(|(selector, &(count, bits))| {
                (pack(selector, &remaining[..count], bits), count)
            });
        match packed {
            Some((word, count)) => {
                dst.push(word);
                i += count;
            }
            None => {
                // Only a head value beyond the 60-bit ceiling defeats
                // every selector.
                return Err(ChunkError::Simple8bDecode(format!(
                    "value {} exceeds max packable value",
                    remaining[0]
                )));
            }
        }
    }
    Ok(dst)
}

/// Unpack one word into `dst`, returning the number of integers written
pub fn decode(dst: &mut [u64; MAX_COUNT], word: u64) -> usize {
    let (count, bits) = SELECTORS[(word >> 60) as usize];
    if bits == 0 {
        dst[..count].fill(1);
        return count;
    }
    let mask = (1u64 << bits) - 1;
    for (i, slot) in dst[..count].iter_mut().enumerate() {
        *slot = (word >> (i * bits)) & mask;
    }
    count
}
