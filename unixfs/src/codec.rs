// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Registers the dag-pb `NodeCodec` with a [`LinkSystem`], so that
//! `LinkSystem::store`/`load` can round-trip UnixFS nodes through the same
//! interface dag-cbor and raw use (`§4.4`).

use crate::pb::{decode_pb_node, encode_pb_node, node_from_ipld, node_to_ipld};
use dagipld::Ipld;
use kvstore::KvStore;
use linksystem::{Error as LinkSystemError, LinkSystem, NodeCodec};

struct DagPbCodec;

impl NodeCodec for DagPbCodec {
    fn encode(&self, node: &Ipld) -> Result<Vec<u8>, LinkSystemError> {
        let pb_node = node_from_ipld(node).map_err(|e| LinkSystemError::EncodeError(e.to_string()))?;
        Ok(encode_pb_node(&pb_node))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld, LinkSystemError> {
        let pb_node = decode_pb_node(bytes).map_err(|e| LinkSystemError::DecodeError(e.to_string()))?;
        Ok(node_to_ipld(&pb_node))
    }
}

/// Registers the dag-pb codec on `link_system`. Idempotent — safe to call
/// once per `DagBuilder`/`FileReader` construction.
pub fn register_dag_pb(link_system: &LinkSystem<impl KvStore>) {
    link_system.register_codec(dagcid::Codec::DagPb, Box::new(DagPbCodec));
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockstore::BlockStore;
    use dagcid::LinkPrototype;
    use kvstore::MemoryKvStore;
    use std::sync::Arc;

    #[test]
    fn registered_dag_pb_round_trips_through_link_system() {
        let ls = LinkSystem::new(BlockStore::new(Arc::new(MemoryKvStore::new())));
        register_dag_pb(&ls);

        let node = crate::pb::PbNode {
            data: Some(b"meta".to_vec()),
            links: vec![],
        };
        let ipld = node_to_ipld(&node);
        let cid = ls.store(&LinkPrototype::dag_pb(), &ipld).unwrap();
        assert_eq!(ls.load(&cid).unwrap(), ipld);
    }
}
