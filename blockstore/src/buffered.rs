// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! An in-memory staging area in front of a [`BlockStore`], adapted from the
//! teacher's `BufferedBlockStore`. Blocks written during DAG construction
//! accumulate here; `flush(root)` walks the dag-cbor link graph from `root`
//! and commits only the blocks still reachable from it to the underlying
//! store, discarding anything built speculatively and abandoned.

use crate::{Block, BlockStore, Error};
use dagcid::{Cid, Codec};
use dagipld::{dagcbor, Ipld};
use kvstore::KvStore;
use std::collections::HashMap;
use std::sync::Mutex;

/// Extracts the outgoing links from an encoded block, given its codec.
/// Supplied so that codec-specific crates (dag-pb for UnixFS, say) can
/// plug in their own link extraction without this crate depending on them.
pub trait LinkScanner: Send + Sync {
    fn scan(&self, codec: Codec, bytes: &[u8]) -> Result<Vec<Cid>, Error>;
}

/// Scans dag-cbor blocks for `Ipld::Link` values; every other codec is
/// treated as link-free. Good enough for the selector/car paths, which only
/// ever encode interior nodes as dag-cbor; a UnixFS dag-pb scanner can be
/// layered in by implementing [`LinkScanner`] directly.
#[derive(Default)]
pub struct DagCborLinkScanner;

impl LinkScanner for DagCborLinkScanner {
    fn scan(&self, codec: Codec, bytes: &[u8]) -> Result<Vec<Cid>, Error> {
        if codec != Codec::DagCbor {
            return Ok(Vec::new());
        }
        let ipld = dagcbor::decode(bytes)?;
        let mut links = Vec::new();
        collect_links(&ipld, &mut links);
        Ok(links)
    }
}

fn collect_links(ipld: &Ipld, out: &mut Vec<Cid>) {
    match ipld {
        Ipld::Link(cid) => out.push(*cid),
        Ipld::List(items) => items.iter().for_each(|item| collect_links(item, out)),
        Ipld::Map(map) => map.values().for_each(|value| collect_links(value, out)),
        _ => {}
    }
}

pub struct BufferedBlockStore<K: KvStore> {
    inner: BlockStore<K>,
    scanner: Box<dyn LinkScanner>,
    buffer: Mutex<HashMap<Cid, Vec<u8>>>,
}

impl<K: KvStore> BufferedBlockStore<K> {
    pub fn new(inner: BlockStore<K>) -> Self {
        Self::with_scanner(inner, Box::new(DagCborLinkScanner))
    }

    pub fn with_scanner(inner: BlockStore<K>, scanner: Box<dyn LinkScanner>) -> Self {
        Self {
            inner,
            scanner,
            buffer: Mutex::new(HashMap::new()),
        }
    }

    /// Stages a block without writing it to the underlying store yet.
    pub fn put(&self, block: Block) -> Result<(), Error> {
        self.buffer.lock().unwrap().insert(block.cid, block.bytes);
        Ok(())
    }

    pub fn get(&self, cid: &Cid) -> Result<Vec<u8>, Error> {
        if let Some(bytes) = self.buffer.lock().unwrap().get(cid) {
            return Ok(bytes.clone());
        }
        self.inner.get(cid)
    }

    /// Commits every block reachable from `root` to the underlying store
    /// and drops everything else still sitting in the buffer.
    pub fn flush(&self, root: Cid) -> Result<usize, Error> {
        let mut reachable = Vec::new();
        let mut stack = vec![root];
        let mut seen = std::collections::HashSet::new();

        while let Some(cid) = stack.pop() {
            if !seen.insert(cid) {
                continue;
            }
            let bytes = match self.buffer.lock().unwrap().get(&cid) {
                Some(bytes) => bytes.clone(),
                None => continue, // already committed, or not ours to flush
            };
            let codec = dagcid::codec_and_hash_of(&cid)?.0;
            for link in self.scanner.scan(codec, &bytes)? {
                stack.push(link);
            }
            reachable.push(Block::new(cid, bytes));
        }

        let count = reachable.len();
        for block in &reachable {
            self.inner.put(block)?;
        }
        let mut buffer = self.buffer.lock().unwrap();
        for block in reachable {
            buffer.remove(&block.cid);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagcid::{recompute_cid, HashAlgorithm};
    use dagipld::dagcbor;
    use kvstore::MemoryKvStore;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[test]
    fn flush_commits_only_blocks_reachable_from_root() {
        let buffered = BufferedBlockStore::new(BlockStore::new(Arc::new(MemoryKvStore::new())));

        let leaf_cid = recompute_cid(b"leaf", Codec::Raw, HashAlgorithm::Blake3);
        buffered
            .put(Block::new(leaf_cid, b"leaf".to_vec()))
            .unwrap();

        let mut fields = BTreeMap::new();
        fields.insert("Links".to_string(), Ipld::List(vec![Ipld::Link(leaf_cid)]));
        let root_bytes = dagcbor::encode(&Ipld::Map(fields)).unwrap();
        let root_cid = recompute_cid(&root_bytes, Codec::DagCbor, HashAlgorithm::Blake3);
        buffered.put(Block::new(root_cid, root_bytes)).unwrap();

        let orphan_cid = recompute_cid(b"orphan", Codec::Raw, HashAlgorithm::Blake3);
        buffered
            .put(Block::new(orphan_cid, b"orphan".to_vec()))
            .unwrap();

        let committed = buffered.flush(root_cid).unwrap();
        assert_eq!(committed, 2);
        assert!(buffered.inner.has(&leaf_cid).unwrap());
        assert!(buffered.inner.has(&root_cid).unwrap());
        assert!(!buffered.inner.has(&orphan_cid).unwrap());
    }
}
