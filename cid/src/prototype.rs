// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Codec, Error, HashAlgorithm};
use cid::{Cid, Version};

/// The fixed `(version, codec, hash_function, hash_length)` used when hashing
/// a freshly encoded node (`§3`). `hash_length = None` means "natural",
/// i.e. the hash function's own digest length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPrototype {
    pub version: Version,
    pub codec: Codec,
    pub hash: HashAlgorithm,
    pub hash_length: Option<usize>,
}

impl LinkPrototype {
    /// `(v1, dag-cbor, BLAKE3, natural)` — the default used throughout the
    /// store unless a caller asks for something else.
    pub const fn default_dag_cbor() -> Self {
        LinkPrototype {
            version: Version::V1,
            codec: Codec::DagCbor,
            hash: HashAlgorithm::Blake3,
            hash_length: None,
        }
    }

    /// Raw leaves hash under the same default hash function but with the
    /// identity (raw) codec.
    pub const fn raw_leaf() -> Self {
        LinkPrototype {
            version: Version::V1,
            codec: Codec::Raw,
            hash: HashAlgorithm::Blake3,
            hash_length: None,
        }
    }

    /// Interior UnixFS nodes hash under dag-pb, for interop with the
    /// UnixFS File DAG shape (`§4.4`).
    pub const fn dag_pb() -> Self {
        LinkPrototype {
            version: Version::V1,
            codec: Codec::DagPb,
            hash: HashAlgorithm::Blake3,
            hash_length: None,
        }
    }

    /// Computes the CID that `bytes` would have under this prototype.
    pub fn cid_for(&self, bytes: &[u8]) -> Cid {
        let digest = self.hash.digest(bytes, self.hash_length);
        Cid::new(self.version, self.codec.code(), digest)
            .expect("multihash digest is within the size this cid version allows")
    }
}

impl Default for LinkPrototype {
    fn default() -> Self {
        Self::default_dag_cbor()
    }
}

/// Recomputes the CID for `bytes` under the given codec and hash function and
/// compares it with `cid`. Used by the block store to enforce the identity
/// invariant of `§3`/`§4.1` and by CAR import to verify each entry (`§4.7`).
pub fn recompute_cid(bytes: &[u8], codec: Codec, hash: HashAlgorithm) -> Cid {
    let digest = hash.digest(bytes, None);
    Cid::new_v1(codec.code(), digest)
}

/// Parses the `(version, codec, hash)` triple out of an existing [`Cid`],
/// for callers that need to recompute under "whatever this CID already
/// declares".
pub fn codec_and_hash_of(cid: &Cid) -> Result<(Codec, HashAlgorithm), Error> {
    let codec = Codec::from_code(cid.codec())?;
    let hash = HashAlgorithm::from_code(cid.hash().code())?;
    Ok((codec, hash))
}
