// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Store configuration (`§1.3`): every knob that would otherwise live in a
//! process-wide global, gathered into one explicit object constructed by
//! the caller. Mirrors the teacher's `forest/shared` config structs.

use std::path::PathBuf;
use unixfs::Layout;

/// Which `KvStore` backend to open. Only `Memory` is wired up today; a
/// persistent backend is a matter of adding a crate that implements
/// `kvstore::KvStore`, not of changing this enum's callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KvBackend {
    #[default]
    Memory,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub kv_backend: KvBackend,
    /// `Some(root)` enables no-copy ingestion (`add_file` backs blocks by
    /// `(path, offset, length)` records instead of copying bytes).
    pub filestore_root: Option<PathBuf>,
    pub max_links: usize,
    pub chunk_size: usize,
    pub layout: Layout,
    pub prefetch_workers: usize,
    /// `Some(root)` loads schema definitions recursively from that
    /// directory at construction time.
    pub schema_root: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kv_backend: KvBackend::default(),
            filestore_root: None,
            max_links: unixfs::DEFAULT_MAX_LINKS,
            chunk_size: chunker::DEFAULT_CHUNK_SIZE,
            layout: Layout::Balanced,
            prefetch_workers: prefetch::DEFAULT_WORKERS,
            schema_root: None,
        }
    }
}
