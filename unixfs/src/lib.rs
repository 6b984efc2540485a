// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The UnixFS file-DAG shape (`§3`), dag-pb interop codec (`§4.4`), the
//! balanced/trickle `DagBuilder` (`§4.3`), and the streaming reader that
//! inverts it (`§6`).

mod codec;
mod dagbuilder;
mod error;
pub mod pb;
mod reader;

pub use codec::register_dag_pb;
pub use dagbuilder::{DagBuilder, DagBuilderConfig, Layout, DEFAULT_MAX_LINKS};
pub use error::Error;
pub use reader::FileReader;

use blockstore::Filestore;
use dagcid::{Cid, LinkPrototype};
use dagipld::Ipld;
use kvstore::KvStore;
use linksystem::LinkSystem;
use std::path::Path;

/// Hashes `bytes` as a raw leaf and writes it straight into the block
/// store. Used by the normal (copying) ingestion path.
pub fn store_leaf<K: KvStore>(link_system: &LinkSystem<K>, bytes: &[u8]) -> Result<(Cid, u64), Error> {
    let cid = link_system.store(&LinkPrototype::raw_leaf(), &Ipld::Bytes(bytes.to_vec()))?;
    tracing::trace!(%cid, len = bytes.len(), "stored raw leaf");
    Ok((cid, bytes.len() as u64))
}

/// Hashes `bytes` as a raw leaf but records only a `(path, offset, length)`
/// positional pointer in `filestore`, per the no-copy ingestion path
/// (`§4.1`). `bytes` must be exactly the slice `[offset, offset+len)` of
/// `relative_path`, already read by the caller while chunking.
pub fn store_leaf_no_copy<K: KvStore>(
    filestore: &Filestore<K>,
    bytes: &[u8],
    relative_path: &Path,
    offset: u64,
) -> Result<(Cid, u64), Error> {
    let cid = LinkPrototype::raw_leaf().cid_for(bytes);
    filestore.put_positional(cid, relative_path, offset, bytes.len() as u64)?;
    Ok((cid, bytes.len() as u64))
}
