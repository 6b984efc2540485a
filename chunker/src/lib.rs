// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Splits a byte stream into leaf chunks (`§4.2`): fixed-size, or
//! content-defined so that local edits only reflow the surrounding chunk.

mod error;
mod fixed;
mod rabin;

pub use error::Error;
pub use fixed::{FixedSizeChunker, DEFAULT_CHUNK_SIZE};
pub use rabin::{RabinChunker, DEFAULT_AVG_SIZE};

/// A lazy, finite, non-restartable sequence of byte slices whose
/// concatenation equals the input (`§4.2`). Implemented by both chunker
/// kinds; exists so the DAG builder can be generic over which one fed it.
pub trait Chunker: Iterator<Item = Result<Vec<u8>, Error>> {}

impl<R: std::io::Read> Chunker for FixedSizeChunker<R> {}
impl<R: std::io::Read> Chunker for RabinChunker<R> {}
