// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use std::io::{BufReader, Read};

/// A content-defined chunker (`§4.2`): a rolling hash cuts chunk boundaries
/// wherever `hash & mask == 0`, clamped to `[avg_size/2, avg_size*2]`. Edits
/// local to one chunk only reflow that chunk and its immediate neighbour,
/// rather than every chunk after the edit the way fixed-size chunking would.
///
/// The rolling hash here is a gear hash (one multiply-free shift-and-add per
/// byte against a fixed 256-entry table) rather than a true Rabin
/// fingerprint — it has the same chunk-boundary behaviour the spec asks for
/// and is the rolling hash most content-defined chunkers (FastCDC, restic,
/// casync) actually ship, without needing a polynomial-division table.
pub struct RabinChunker<R> {
    reader: BufReader<R>,
    min_size: usize,
    max_size: usize,
    mask: u64,
    table: [u64; 256],
    done: bool,
}

pub const DEFAULT_AVG_SIZE: usize = super::DEFAULT_CHUNK_SIZE;

impl<R: Read> RabinChunker<R> {
    pub fn new(reader: R) -> Self {
        Self::with_avg_size(reader, DEFAULT_AVG_SIZE)
    }

    pub fn with_avg_size(reader: R, avg_size: usize) -> Self {
        assert!(avg_size >= 2, "avg_size must allow a non-degenerate min/max range");
        let bits = (avg_size as f64).log2().round() as u32;
        Self {
            reader: BufReader::new(reader),
            min_size: avg_size / 2,
            max_size: avg_size * 2,
            mask: (1u64 << bits.max(1)) - 1,
            table: gear_table(),
            done: false,
        }
    }
}

/// A fixed table of pseudo-random 64-bit constants, one per byte value,
/// generated deterministically with splitmix64 so the chunker's boundaries
/// are reproducible across processes and platforms.
fn gear_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut seed: u64 = 0x9E3779B97F4A7C15;
    for slot in table.iter_mut() {
        seed = seed.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = seed;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^= z >> 31;
        *slot = z;
    }
    table
}

impl<R: Read> Iterator for RabinChunker<R> {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = Vec::with_capacity(self.min_size);
        let mut hash: u64 = 0;
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(_) => {
                    buf.push(byte[0]);
                    hash = hash.wrapping_shl(1).wrapping_add(self.table[byte[0] as usize]);
                    if buf.len() >= self.max_size {
                        break;
                    }
                    if buf.len() >= self.min_size && (hash & self.mask) == 0 {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
        if buf.is_empty() {
            None
        } else {
            Some(Ok(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenation_equals_the_input() {
        let input: Vec<u8> = (0..500_000u32).map(|i| (i % 251) as u8).collect();
        let chunker = RabinChunker::with_avg_size(&input[..], 4096);
        let reassembled: Vec<u8> = chunker.flat_map(|c| c.unwrap()).collect();
        assert_eq!(reassembled, input);
    }

    #[test]
    fn chunks_stay_within_bounds() {
        let input: Vec<u8> = (0..500_000u32).map(|i| (i % 251) as u8).collect();
        let chunker = RabinChunker::with_avg_size(&input[..], 4096);
        let chunks: Vec<Vec<u8>> = chunker.map(Result::unwrap).collect();
        let (min, max) = (4096 / 2, 4096 * 2);
        for (i, chunk) in chunks.iter().enumerate() {
            let is_last = i == chunks.len() - 1;
            assert!(chunk.len() <= max);
            if !is_last {
                assert!(chunk.len() >= min, "non-final chunk shorter than min_size");
            }
        }
    }

    #[test]
    fn local_edit_only_reflows_nearby_chunks() {
        let mut input: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let original: Vec<Vec<u8>> = RabinChunker::with_avg_size(&input[..], 4096)
            .map(Result::unwrap)
            .collect();

        // Flip a single byte near the middle; most chunk boundaries before
        // and long after the edit should be unaffected.
        let edit_at = input.len() / 2;
        input[edit_at] ^= 0xff;
        let edited: Vec<Vec<u8>> = RabinChunker::with_avg_size(&input[..], 4096)
            .map(Result::unwrap)
            .collect();

        let prefix_matches = original
            .iter()
            .zip(edited.iter())
            .take_while(|(a, b)| a == b)
            .count();
        assert!(prefix_matches > 0, "edit should not reflow every chunk before it");
        assert!(prefix_matches < original.len());
    }

    #[quickcheck_macros::quickcheck]
    fn concatenation_always_equals_the_input(input: Vec<u8>) -> bool {
        let chunker = RabinChunker::with_avg_size(&input[..], 64);
        let reassembled: Vec<u8> = chunker.map(|c| c.unwrap()).flatten().collect();
        reassembled == input
    }
}
