//! chunkcodec - Compressed chunk containers for time-series samples
//!
//! A chunk is a small, append-only, self-describing byte buffer holding
//! the samples of one series over a short window:
//!
//! - **Timestamps**: Gorilla delta-of-delta, one bit per sample on
//!   regular intervals
//! - **Floats**: Gorilla XOR with leading/trailing-zero window reuse
//! - **Integers**: zigzag deltas, streamed as varints per sample or
//!   packed block-at-a-time with Simple8b/RLE
//! - **Strings**: per-sample Snappy frames
//!
//! # Example
//!
//! ```
//! use chunkcodec::{Chunk, Encoding, Sample};
//!
//! # fn main() -> chunkcodec::Result<()> {
//! let mut chunk = Chunk::new(Encoding::Float64)?;
//! let mut app = chunk.appender()?;
//! app.append(&Sample::float64(1234123324, 1.0))?;
//! app.append(&Sample::float64(1234123325, 1.0))?;
//! app.append(&Sample::float64(1234123326, 2.0))?;
//! drop(app);
//!
//! assert_eq!(chunk.num_samples(), 3);
//! for sample in chunk.iter() {
//!     let sample = sample?;
//!     println!("{}", sample);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A chunk is single-writer: the appender holds an exclusive borrow, and
//! any number of iterators may scan concurrently once it is dropped.
//! Serialized chunks round-trip through [`Chunk::from_data`] and recycle
//! through [`ChunkPool`].

pub mod chunk;
pub mod encode;
pub mod pool;

mod error;
mod sample;

pub use chunk::{Chunk, ChunkAppender, ChunkIter, FloatChunk, IntChunk, StringChunk};
pub use error::{ChunkError, Result};
pub use pool::ChunkPool;
pub use sample::{Encoding, Sample};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
