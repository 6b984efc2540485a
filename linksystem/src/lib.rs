// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The Link System (`§4.4`): `store` encodes and hashes a node and puts the
//! resulting block; `load` gets a block and decodes it back into a node.
//! Sits between the Block Store and everything that navigates the DAG
//! (the selector walker, UnixFS readers, CAR export).

mod error;

pub use error::Error;

use async_trait::async_trait;
use blockstore::{Block, BlockStore};
use dagcid::{Cid, Codec, LinkPrototype};
use dagipld::selector::LinkResolver;
use dagipld::{dagcbor, Ipld};
use kvstore::KvStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// Encodes and decodes a node under one specific codec. Built-in for `raw`
/// and `dag-cbor`; `dag-pb` is supplied by the UnixFS crate and registered
/// by callers that need file-DAG interop, so this crate does not need to
/// depend on it.
pub trait NodeCodec: Send + Sync {
    fn encode(&self, node: &Ipld) -> Result<Vec<u8>, Error>;
    fn decode(&self, bytes: &[u8]) -> Result<Ipld, Error>;
}

struct RawCodec;

impl NodeCodec for RawCodec {
    fn encode(&self, node: &Ipld) -> Result<Vec<u8>, Error> {
        match node {
            Ipld::Bytes(bytes) => Ok(bytes.clone()),
            other => Err(Error::EncodeError(format!(
                "raw codec only encodes Ipld::Bytes, got {other:?}"
            ))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld, Error> {
        Ok(Ipld::Bytes(bytes.to_vec()))
    }
}

struct DagCborCodec;

impl NodeCodec for DagCborCodec {
    fn encode(&self, node: &Ipld) -> Result<Vec<u8>, Error> {
        dagcbor::encode(node).map_err(|e| Error::EncodeError(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld, Error> {
        dagcbor::decode(bytes).map_err(|e| Error::DecodeError(e.to_string()))
    }
}

/// Stores and loads nodes through a [`BlockStore`], keeping a small registry
/// of codec implementations keyed by [`Codec`].
pub struct LinkSystem<K: KvStore> {
    blockstore: BlockStore<K>,
    codecs: RwLock<HashMap<Codec, Box<dyn NodeCodec>>>,
}

impl<K: KvStore> LinkSystem<K> {
    pub fn new(blockstore: BlockStore<K>) -> Self {
        let mut codecs: HashMap<Codec, Box<dyn NodeCodec>> = HashMap::new();
        codecs.insert(Codec::Raw, Box::new(RawCodec));
        codecs.insert(Codec::DagCbor, Box::new(DagCborCodec));
        Self {
            blockstore,
            codecs: RwLock::new(codecs),
        }
    }

    /// Registers (or replaces) the codec implementation for `codec`. Used
    /// by the UnixFS crate to plug in dag-pb interop.
    pub fn register_codec(&self, codec: Codec, implementation: Box<dyn NodeCodec>) {
        self.codecs.write().unwrap().insert(codec, implementation);
    }

    pub fn blockstore(&self) -> &BlockStore<K> {
        &self.blockstore
    }

    /// Encodes `node` under `prototype.codec`, hashes under `prototype.hash`,
    /// puts the resulting block, and returns the CID-link.
    pub fn store(&self, prototype: &LinkPrototype, node: &Ipld) -> Result<Cid, Error> {
        let bytes = {
            let codecs = self.codecs.read().unwrap();
            let codec_impl = codecs
                .get(&prototype.codec)
                .ok_or(Error::UnsupportedCodec(prototype.codec))?;
            codec_impl.encode(node)?
        };
        let cid = prototype.cid_for(&bytes);
        self.blockstore.put(&Block::new(cid, bytes))?;
        Ok(cid)
    }

    /// Gets the block for `link` and decodes it per the codec named in the
    /// CID itself.
    pub fn load(&self, link: &Cid) -> Result<Ipld, Error> {
        let bytes = self.blockstore.get(link)?;
        let (codec, _hash) = dagcid::codec_and_hash_of(link)?;
        let codecs = self.codecs.read().unwrap();
        let codec_impl = codecs.get(&codec).ok_or(Error::UnsupportedCodec(codec))?;
        codec_impl.decode(&bytes)
    }
}

#[async_trait]
impl<K: KvStore> LinkResolver for LinkSystem<K> {
    async fn load_link(&self, cid: &Cid) -> Result<Ipld, dagipld::Error> {
        self.load(cid).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvstore::MemoryKvStore;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn system() -> LinkSystem<MemoryKvStore> {
        LinkSystem::new(BlockStore::new(Arc::new(MemoryKvStore::new())))
    }

    #[test]
    fn store_then_load_dag_cbor_round_trips() {
        let ls = system();
        let mut map = BTreeMap::new();
        map.insert("hello".to_string(), Ipld::String("world".into()));
        let node = Ipld::Map(map);

        let cid = ls.store(&LinkPrototype::default_dag_cbor(), &node).unwrap();
        assert_eq!(cid.codec(), Codec::DAG_CBOR);
        assert_eq!(ls.load(&cid).unwrap(), node);
    }

    #[test]
    fn store_then_load_raw_round_trips() {
        let ls = system();
        let node = Ipld::Bytes(b"leaf bytes".to_vec());
        let cid = ls.store(&LinkPrototype::raw_leaf(), &node).unwrap();
        assert_eq!(cid.codec(), Codec::RAW);
        assert_eq!(ls.load(&cid).unwrap(), node);
    }

    #[test]
    fn load_missing_cid_is_not_found() {
        let ls = system();
        let cid = dagcid::recompute_cid(b"never stored", Codec::Raw, dagcid::HashAlgorithm::Blake3);
        assert!(matches!(ls.load(&cid), Err(Error::BlockStore(blockstore::Error::NotFound(_)))));
    }
}
