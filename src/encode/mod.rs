//! Streaming codecs for timestamps and values
//!
//! Everything here writes into a shared [`BStream`] owned by the chunk
//! container; the container decides the interleaving. The integer block
//! codec additionally works as a standalone one-shot compressor.

mod bitstream;
mod float;
mod integer;
pub mod simple8b;
mod timestamp;

pub use bitstream::{unzigzag, zigzag, BReader, BStream};
pub use float::{FloatDecoder, FloatEncoder};
pub use integer::{IntegerDecoder, IntegerEncoder};
pub use timestamp::{TimestampDecoder, TimestampEncoder};
