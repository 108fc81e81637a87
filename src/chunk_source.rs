//! Byte-chunk sources.
//!
//! The streams consume any `Iterator<Item = io::Result<Bytes>>`: `None` is
//! end of data, `Some(Err(_))` aborts the stream. These adapters cover the
//! common cases; decompression and file handling stay with the caller.

use bytes::Bytes;
use std::io::{self, Read};

/// Pulls chunks of at most `chunk_size` bytes from a reader.
#[derive(Debug)]
pub struct ReadChunks<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut buffer) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buffer.truncate(n);
                    return Some(Ok(Bytes::from(buffer)));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Splits an in-memory buffer into fixed-size chunks without copying.
#[derive(Debug, Clone)]
pub struct ChunksOf {
    data: Bytes,
    chunk_size: usize,
}

impl ChunksOf {
    pub fn new(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            chunk_size: chunk_size.max(1),
        }
    }
}

impl Iterator for ChunksOf {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let take = self.chunk_size.min(self.data.len());
        Some(Ok(self.data.split_to(take)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.data.len().div_ceil(self.chunk_size);
        (n, Some(n))
    }
}
