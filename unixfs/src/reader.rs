// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Inverts the DAG builder: given a root CID, reassembles the file's bytes
//! by walking the UnixFS tree depth-first in link order (`§4.3`, `§6`).

use crate::codec::register_dag_pb;
use crate::Error;
use blockstore::Filestore;
use dagcid::{Cid, Codec};
use kvstore::KvStore;
use linksystem::LinkSystem;
use std::io::{Cursor, Read, Seek, SeekFrom};

fn read_leaf_bytes<K: KvStore>(
    link_system: &LinkSystem<K>,
    filestore: Option<&Filestore<K>>,
    cid: &Cid,
) -> Result<Vec<u8>, Error> {
    match link_system.blockstore().get(cid) {
        Ok(bytes) => Ok(bytes),
        Err(blockstore::Error::NotFound(_)) => match filestore {
            Some(fs) => Ok(fs.get(cid)?),
            None => Err(blockstore::Error::NotFound(*cid).into()),
        },
        Err(e) => Err(e.into()),
    }
}

fn collect_bytes<K: KvStore>(
    link_system: &LinkSystem<K>,
    filestore: Option<&Filestore<K>>,
    cid: &Cid,
    out: &mut Vec<u8>,
) -> Result<(), Error> {
    let (codec, _hash) = dagcid::codec_and_hash_of(cid)?;
    match codec {
        Codec::Raw => out.extend_from_slice(&read_leaf_bytes(link_system, filestore, cid)?),
        Codec::DagPb => {
            let ipld = link_system.load(cid)?;
            let node = crate::pb::node_from_ipld(&ipld)?;
            if node.links.is_empty() {
                if let Some(data) = &node.data {
                    out.extend_from_slice(data);
                }
            } else {
                for link in &node.links {
                    collect_bytes(link_system, filestore, &link.hash, out)?;
                }
            }
        }
        Codec::DagCbor => return Err(Error::UnsupportedDataType(Codec::DAG_CBOR)),
    }
    Ok(())
}

/// A seekable reader over a reassembled UnixFS file. Reassembly happens
/// eagerly at construction time rather than block-by-block on demand — a
/// deliberate simplification over the original's lazy, range-aware reader,
/// traded for an implementation that is trivially correct and seekable.
pub struct FileReader {
    cursor: Cursor<Vec<u8>>,
}

impl FileReader {
    pub fn open<K: KvStore>(
        link_system: &LinkSystem<K>,
        filestore: Option<&Filestore<K>>,
        root: &Cid,
    ) -> Result<Self, Error> {
        register_dag_pb(link_system);
        let mut bytes = Vec::new();
        collect_bytes(link_system, filestore, root, &mut bytes)?;
        tracing::debug!(%root, len = bytes.len(), "reassembled unixfs file");
        Ok(Self { cursor: Cursor::new(bytes) })
    }

    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for FileReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}
