// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Maps CIDs to raw block bytes over a generic [`KvStore`], enforcing content
//! identity on every write (`§4.1`).

mod buffered;
mod error;
mod filestore;
mod tracking;

pub use buffered::{BufferedBlockStore, DagCborLinkScanner, LinkScanner};
pub use error::Error;
pub use filestore::{FilePosition, Filestore};
pub use tracking::{BlockStoreStats, TrackingBlockStore};

use dagcid::{codec_and_hash_of, recompute_cid, Cid};
use kvstore::KvStore;
use std::sync::Arc;

/// A single immutable `(cid, bytes)` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub cid: Cid,
    pub bytes: Vec<u8>,
}

impl Block {
    pub fn new(cid: Cid, bytes: Vec<u8>) -> Self {
        Self { cid, bytes }
    }
}

const KEY_NAMESPACE: &[u8] = b"/blocks/";

fn block_key(cid: &Cid) -> Vec<u8> {
    let mut key = Vec::with_capacity(KEY_NAMESPACE.len() + 64);
    key.extend_from_slice(KEY_NAMESPACE);
    key.extend_from_slice(&cid.to_bytes());
    key
}

fn cid_from_key(key: &[u8]) -> Result<Cid, Error> {
    let bytes = key
        .strip_prefix(KEY_NAMESPACE)
        .ok_or_else(|| Error::Codec("block key missing namespace prefix".into()))?;
    Cid::try_from(bytes).map_err(Error::from)
}

/// CID-keyed block storage. Callers never see the `/blocks/` key encoding;
/// the only public key is the CID itself.
pub struct BlockStore<K: KvStore> {
    kv: Arc<K>,
}

impl<K: KvStore> BlockStore<K> {
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    /// Verifies identity, then stores the block. Re-putting an existing CID
    /// with matching bytes is a no-op success; `has` short-circuits the
    /// recompute for that common case.
    pub fn put(&self, block: &Block) -> Result<(), Error> {
        if self.has(&block.cid)? {
            return Ok(());
        }
        let (codec, hash) = codec_and_hash_of(&block.cid)?;
        let recomputed = recompute_cid(&block.bytes, codec, hash);
        if recomputed != block.cid {
            return Err(Error::IdentityMismatch {
                declared: block.cid,
            });
        }
        self.kv.put(&block_key(&block.cid), block.bytes.clone())?;
        Ok(())
    }

    pub fn has(&self, cid: &Cid) -> Result<bool, Error> {
        Ok(self.kv.has(&block_key(cid))?)
    }

    pub fn get(&self, cid: &Cid) -> Result<Vec<u8>, Error> {
        self.kv
            .get(&block_key(cid))?
            .ok_or_else(|| Error::NotFound(*cid))
    }

    /// Invokes `f` with a borrowed slice of the block's bytes, avoiding a
    /// copy when the backing `KvStore` supports it.
    pub fn view<R>(&self, cid: &Cid, f: impl FnOnce(&[u8]) -> R) -> Result<R, Error> {
        self.kv
            .view(&block_key(cid), f)?
            .ok_or_else(|| Error::NotFound(*cid))
    }

    /// Optional; not used by higher layers (`§4.1`).
    pub fn delete(&self, cid: &Cid) -> Result<(), Error> {
        Ok(self.kv.delete(&block_key(cid))?)
    }

    /// All blocks currently stored, as `(cid, bytes)` pairs. Used for
    /// enumeration and statistics, not the retrieval hot path.
    pub fn iterate(&self) -> Result<Vec<(Cid, Vec<u8>)>, Error> {
        self.kv
            .iterate_prefix(KEY_NAMESPACE)?
            .into_iter()
            .map(|(key, bytes)| Ok((cid_from_key(&key)?, bytes)))
            .collect()
    }
}

impl<K: KvStore> Clone for BlockStore<K> {
    fn clone(&self) -> Self {
        Self {
            kv: self.kv.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagcid::{Codec, HashAlgorithm};
    use kvstore::MemoryKvStore;

    fn store() -> BlockStore<MemoryKvStore> {
        BlockStore::new(Arc::new(MemoryKvStore::new()))
    }

    fn raw_block(bytes: &[u8]) -> Block {
        let cid = recompute_cid(bytes, Codec::Raw, HashAlgorithm::Blake3);
        Block::new(cid, bytes.to_vec())
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = store();
        let block = raw_block(b"hello world");
        store.put(&block).unwrap();
        assert!(store.has(&block.cid).unwrap());
        assert_eq!(store.get(&block.cid).unwrap(), block.bytes);
    }

    #[test]
    fn put_rejects_tampered_cid() {
        let store = store();
        let mut block = raw_block(b"hello world");
        block.bytes = b"goodbye world".to_vec();
        assert!(matches!(
            store.put(&block),
            Err(Error::IdentityMismatch { .. })
        ));
    }

    #[test]
    fn put_is_idempotent() {
        let store = store();
        let block = raw_block(b"hello world");
        store.put(&block).unwrap();
        store.put(&block).unwrap();
        assert_eq!(store.iterate().unwrap().len(), 1);
    }

    #[test]
    fn get_missing_block_is_not_found() {
        let store = store();
        let cid = recompute_cid(b"never stored", Codec::Raw, HashAlgorithm::Blake3);
        assert!(matches!(store.get(&cid), Err(Error::NotFound(_))));
    }

    #[test]
    fn view_avoids_copy_and_matches_get() {
        let store = store();
        let block = raw_block(b"hello world");
        store.put(&block).unwrap();
        let len = store.view(&block.cid, |bytes| bytes.len()).unwrap();
        assert_eq!(len, block.bytes.len());
    }
}
