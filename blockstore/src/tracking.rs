// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! A read/write-counting wrapper around [`BlockStore`](crate::BlockStore),
//! adapted from the teacher's `TrackingBlockStore`/`BSStats`. Useful in
//! tests that want to assert on block-store traffic without instrumenting
//! the key-value store itself.

use crate::{Block, BlockStore, Error};
use dagcid::Cid;
use kvstore::KvStore;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct BlockStoreStats {
    pub reads: AtomicU64,
    pub writes: AtomicU64,
    pub read_bytes: AtomicU64,
    pub write_bytes: AtomicU64,
}

impl BlockStoreStats {
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

pub struct TrackingBlockStore<K: KvStore> {
    inner: BlockStore<K>,
    pub stats: BlockStoreStats,
}

impl<K: KvStore> TrackingBlockStore<K> {
    pub fn new(inner: BlockStore<K>) -> Self {
        Self {
            inner,
            stats: BlockStoreStats::default(),
        }
    }

    pub fn put(&self, block: &Block) -> Result<(), Error> {
        self.inner.put(block)?;
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        self.stats
            .write_bytes
            .fetch_add(block.bytes.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    pub fn get(&self, cid: &Cid) -> Result<Vec<u8>, Error> {
        let bytes = self.inner.get(cid)?;
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        self.stats
            .read_bytes
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(bytes)
    }

    pub fn has(&self, cid: &Cid) -> Result<bool, Error> {
        self.inner.has(cid)
    }
}
