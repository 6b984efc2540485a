// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use multihash_codetable::{Code, MultihashDigest};

/// Hash functions the store knows how to compute and verify.
///
/// Kept as a small closed enumeration (per the "Polymorphism" design note)
/// rather than exposing the full `multihash_codetable::Code` surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// The default hash function (`§6`).
    Blake3,
    /// Kept for interop with systems that hash with SHA-256.
    Sha256,
}

impl HashAlgorithm {
    pub const BLAKE3: u64 = 0x1e;
    pub const SHA2_256: u64 = 0x12;

    pub fn code(self) -> u64 {
        match self {
            HashAlgorithm::Blake3 => Self::BLAKE3,
            HashAlgorithm::Sha256 => Self::SHA2_256,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, Error> {
        match code {
            Self::BLAKE3 => Ok(HashAlgorithm::Blake3),
            Self::SHA2_256 => Ok(HashAlgorithm::Sha256),
            other => Err(Error::UnsupportedHash(other)),
        }
    }

    /// Hashes `bytes`, truncating the digest to `length` bytes when given
    /// (the "natural" length is used when `length` is `None`).
    pub fn digest(self, bytes: &[u8], length: Option<usize>) -> multihash_codetable::Multihash {
        let code = match self {
            HashAlgorithm::Blake3 => Code::Blake3_256,
            HashAlgorithm::Sha256 => Code::Sha2_256,
        };
        let full = code.digest(bytes);
        match length {
            None => full,
            Some(len) => {
                let digest = &full.digest()[..len.min(full.digest().len())];
                multihash_codetable::Multihash::wrap(full.code(), digest)
                    .expect("truncated digest fits in multihash buffer")
            }
        }
    }
}
