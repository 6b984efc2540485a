// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use std::io::Read;

/// Yields consecutive chunks of exactly `chunk_size` bytes; the final chunk
/// may be shorter (`§4.2`). Reads lazily from `reader` one chunk at a time,
/// so input of any size can be streamed without buffering it all in memory.
pub struct FixedSizeChunker<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

pub const DEFAULT_CHUNK_SIZE: usize = 262_144;

impl<R: Read> FixedSizeChunker<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Self {
            reader,
            chunk_size,
            done: false,
        }
    }
}

impl<R: Read> Iterator for FixedSizeChunker<R> {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
        if filled == 0 {
            self.done = true;
            return None;
        }
        buf.truncate(filled);
        if filled < self.chunk_size {
            self.done = true;
        }
        Some(Ok(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_exact_chunks_with_a_short_tail() {
        let input = vec![7u8; 2500];
        let chunker = FixedSizeChunker::with_chunk_size(&input[..], 1000);
        let chunks: Vec<Vec<u8>> = chunker.map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[1].len(), 1000);
        assert_eq!(chunks[2].len(), 500);
    }

    #[test]
    fn concatenation_equals_the_input() {
        let input: Vec<u8> = (0..10_000u32).map(|i| i as u8).collect();
        let chunker = FixedSizeChunker::with_chunk_size(&input[..], 777);
        let reassembled: Vec<u8> = chunker.flat_map(|c| c.unwrap()).collect();
        assert_eq!(reassembled, input);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let input: Vec<u8> = Vec::new();
        let mut chunker = FixedSizeChunker::new(&input[..]);
        assert!(chunker.next().is_none());
    }

    #[quickcheck_macros::quickcheck]
    fn concatenation_always_equals_the_input(input: Vec<u8>, chunk_size: u8) -> bool {
        let chunk_size = chunk_size as usize + 1;
        let chunker = FixedSizeChunker::with_chunk_size(&input[..], chunk_size);
        let reassembled: Vec<u8> = chunker.map(|c| c.unwrap()).flatten().collect();
        reassembled == input
    }

    #[quickcheck_macros::quickcheck]
    fn no_chunk_but_the_last_is_short(input: Vec<u8>, chunk_size: u8) -> bool {
        let chunk_size = chunk_size as usize + 1;
        let chunks: Vec<Vec<u8>> = FixedSizeChunker::with_chunk_size(&input[..], chunk_size)
            .map(|c| c.unwrap())
            .collect();
        let last = chunks.len().saturating_sub(1);
        chunks
            .iter()
            .enumerate()
            .all(|(i, c)| i == last || c.len() == chunk_size)
    }
}
