// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The no-copy "positional block" variant (`§4.1`): instead of copying leaf
//! bytes into the key-value store, only a `(path, offset, length)` record is
//! kept, and the slice is re-read (and re-verified) from disk on every get.

use crate::Error;
use dagcid::{codec_and_hash_of, recompute_cid, Cid};
use kvstore::KvStore;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a positional block's bytes live within a file under the filestore
/// root. `path` is always relative to that root — filestore state is
/// portable across machines as long as the tree beneath the root moves too.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilePosition {
    pub path: PathBuf,
    pub offset: u64,
    pub length: u64,
}

const KEY_NAMESPACE: &[u8] = b"/filestore/";

fn position_key(cid: &Cid) -> Vec<u8> {
    let mut key = Vec::with_capacity(KEY_NAMESPACE.len() + 64);
    key.extend_from_slice(KEY_NAMESPACE);
    key.extend_from_slice(&cid.to_bytes());
    key
}

/// No-copy ingestion on top of any [`KvStore`]: the store only ever holds
/// position records, never block bytes. All paths are resolved under a
/// single root fixed at construction (`§4.1`).
pub struct Filestore<K: KvStore> {
    root: PathBuf,
    kv: Arc<K>,
}

impl<K: KvStore> Filestore<K> {
    pub fn new(root: impl Into<PathBuf>, kv: Arc<K>) -> Self {
        Self {
            root: root.into(),
            kv,
        }
    }

    /// Records that `cid` is backed by `relative_path[offset..offset+length]`.
    /// The bytes are not read back here; the caller already computed `cid`
    /// from exactly that slice while chunking, so re-hashing on every
    /// ingest would defeat the point of a no-copy store. Staleness is
    /// instead caught lazily, on the next `get`.
    pub fn put_positional(
        &self,
        cid: Cid,
        relative_path: impl AsRef<Path>,
        offset: u64,
        length: u64,
    ) -> Result<(), Error> {
        let relative_path = relative_path.as_ref();
        if relative_path.is_absolute() || relative_path.components().any(|c| c.as_os_str() == "..")
        {
            return Err(Error::FilestorePathEscape(
                relative_path.display().to_string(),
            ));
        }
        let position = FilePosition {
            path: relative_path.to_path_buf(),
            offset,
            length,
        };
        let bytes = serde_cbor::to_vec(&position).map_err(|e| Error::Codec(e.to_string()))?;
        self.kv.put(&position_key(&cid), bytes)?;
        Ok(())
    }

    pub fn has(&self, cid: &Cid) -> Result<bool, Error> {
        Ok(self.kv.has(&position_key(cid))?)
    }

    /// Reads the slice back from disk and verifies it still hashes to
    /// `cid`. Returns [`Error::FilestoreStale`] if the backing file moved
    /// or was edited in place.
    pub fn get(&self, cid: &Cid) -> Result<Vec<u8>, Error> {
        let position = self.position(cid)?;
        let full_path = self.root.join(&position.path);
        let mut file = std::fs::File::open(&full_path)?;
        file.seek(SeekFrom::Start(position.offset))?;
        let mut bytes = vec![0u8; position.length as usize];
        file.read_exact(&mut bytes)?;

        let (codec, hash) = codec_and_hash_of(cid)?;
        if recompute_cid(&bytes, codec, hash) != *cid {
            return Err(Error::FilestoreStale(*cid));
        }
        Ok(bytes)
    }

    fn position(&self, cid: &Cid) -> Result<FilePosition, Error> {
        let bytes = self
            .kv
            .get(&position_key(cid))?
            .ok_or(Error::NotFound(*cid))?;
        serde_cbor::from_slice(&bytes).map_err(|e| Error::Codec(e.to_string()))
    }
}
