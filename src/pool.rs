//! Chunk memory pool
//!
//! A free-list per encoding so the embedding system can recycle chunk
//! shells instead of reallocating them on every block load. `get` moves
//! the caller's buffer into the returned chunk; `put` drops the buffer
//! and keeps the shell.

use crate::chunk::{Chunk, FloatChunk, IntChunk, StringChunk};
use crate::error::{ChunkError, Result};
use crate::sample::Encoding;
use parking_lot::Mutex;
use tracing::trace;

/// Free-list pool of chunk shells, indexed by encoding
#[derive(Debug, Default)]
pub struct ChunkPool {
    float64: Mutex<Vec<FloatChunk>>,
    int64: Mutex<Vec<IntChunk>>,
    string: Mutex<Vec<StringChunk>>,
}

impl ChunkPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a chunk of the given encoding backed by `data`
    ///
    /// The buffer moves in; its header governs the sample count. Falls
    /// back to a fresh shell when the free-list is empty.
    pub fn get(&self, encoding: Encoding, data: Vec<u8>) -> Result<Chunk> {
        trace!(encoding = %encoding, "chunk pool get");
        match encoding {
            Encoding::Float64 => {
                let mut chunk = self.float64.lock().pop().unwrap_or_else(FloatChunk::new);
                chunk.reset(data);
                Ok(Chunk::Float64(chunk))
            }
            Encoding::Int64 => {
                let mut chunk = self.int64.lock().pop().unwrap_or_else(IntChunk::new);
                chunk.reset(data);
                Ok(Chunk::Int64(chunk))
            }
            Encoding::String => {
                let mut chunk = self.string.lock().pop().unwrap_or_else(StringChunk::new);
                chunk.reset(data);
                Ok(Chunk::String(chunk))
            }
            other => Err(ChunkError::UnknownEncoding(other as u8)),
        }
    }

    /// Return a chunk's shell to the pool, dropping its buffer
    pub fn put(&self, chunk: Chunk) {
        trace!(encoding = %chunk.encoding(), "chunk pool put");
        match chunk {
            Chunk::Float64(mut c) => {
                c.clear();
                self.float64.lock().push(c);
            }
            Chunk::Int64(mut c) => {
                c.clear();
                self.int64.lock().push(c);
            }
            Chunk::String(mut c) => {
                c.clear();
                self.string.lock().push(c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;
    use crate::Result;
    use std::sync::Arc;

    #[test]
    fn test_put_then_get_yields_original_sequence() {
        let pool = ChunkPool::new();
        let input: Vec<Sample> = (0..30)
            .map(|i| Sample::float64(5000 + i * 17, i as f64 * 1.5))
            .collect();

        let mut chunk = pool.get(Encoding::Float64, Vec::new()).unwrap();
        {
            let mut app = chunk.appender().unwrap();
            for s in &input {
                app.append(s).unwrap();
            }
        }
        let data = chunk.bytes().to_vec();
        pool.put(chunk);

        let recycled = pool.get(Encoding::Float64, data).unwrap();
        assert_eq!(recycled.num_samples(), 30);
        let got: Vec<Sample> = recycled.iter().collect::<Result<_>>().unwrap();
        assert_eq!(got, input);
    }

    #[test]
    fn test_get_unknown_encoding() {
        let pool = ChunkPool::new();
        assert!(pool.get(Encoding::Boolean, Vec::new()).is_err());
        assert!(pool.get(Encoding::None, Vec::new()).is_err());
    }

    #[test]
    fn test_concurrent_get_put() {
        let pool = Arc::new(ChunkPool::new());
        let mut handles = Vec::new();
        for worker in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(std::thread::spawn(move || {
                for round in 0..100i64 {
                    let mut chunk = pool.get(Encoding::Int64, Vec::new()).unwrap();
                    {
                        let mut app = chunk.appender().unwrap();
                        app.append(&Sample::int64(round, worker)).unwrap();
                    }
                    assert_eq!(chunk.num_samples(), 1);
                    pool.put(chunk);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }
}
