// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Combines leaf CIDs into a balanced or trickle link tree (`§4.3`).
//!
//! Leaf storage (raw bytes vs. filestore positional record) happens before
//! this builder ever runs — it only knows `(Cid, size)` pairs. That keeps
//! the tree-construction algorithm, which is the part the spec actually
//! cares about being deterministic, independent from how a leaf's bytes got
//! persisted.

use crate::codec::register_dag_pb;
use crate::pb::{PbLink, PbNode, UnixfsData};
use crate::Error;
use dagcid::{Cid, LinkPrototype};
use dagipld::Ipld;
use kvstore::KvStore;
use linksystem::LinkSystem;

/// Fan-out used by the balanced layout and the per-layer limit of the
/// trickle layout (`§4.3`).
pub const DEFAULT_MAX_LINKS: usize = 174;

/// How interior nodes of the file DAG are shaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Gather up to `max_links` leaves per parent, repeat one level up
    /// until a single root remains.
    Balanced,
    /// Depth-biased: each parent holds up to `max_links` direct leaves plus
    /// (if more remain) exactly one subtree continuing the same pattern,
    /// so the tree grows along a single right-leaning spine. Better suited
    /// to streaming prepends than the balanced layout.
    Trickle,
}

#[derive(Clone, Copy, Debug)]
pub struct DagBuilderConfig {
    pub max_links: usize,
    pub layout: Layout,
}

impl Default for DagBuilderConfig {
    fn default() -> Self {
        Self { max_links: DEFAULT_MAX_LINKS, layout: Layout::Balanced }
    }
}

/// Builds a UnixFS file DAG from an ordered sequence of already-stored leaf
/// CIDs (`§4.3`).
pub struct DagBuilder<'a, K: KvStore> {
    link_system: &'a LinkSystem<K>,
    config: DagBuilderConfig,
}

impl<'a, K: KvStore> DagBuilder<'a, K> {
    pub fn new(link_system: &'a LinkSystem<K>, config: DagBuilderConfig) -> Self {
        register_dag_pb(link_system);
        Self { link_system, config }
    }

    /// Builds the root of a file DAG from `leaves`. A single leaf collapses
    /// to that leaf's own CID with no wrapping parent (scenario 1 of `§8`);
    /// an empty input produces the CID of an empty raw leaf.
    pub fn build_tree(&self, leaves: Vec<(Cid, u64)>) -> Result<Cid, Error> {
        if leaves.is_empty() {
            let cid = self.link_system.store(&LinkPrototype::raw_leaf(), &Ipld::Bytes(Vec::new()))?;
            return Ok(cid);
        }
        if leaves.len() == 1 {
            return Ok(leaves[0].0);
        }
        let (root, _size) = match self.config.layout {
            Layout::Balanced => self.build_balanced(leaves)?,
            Layout::Trickle => self.build_trickle(leaves)?,
        };
        Ok(root)
    }

    fn build_balanced(&self, mut level: Vec<(Cid, u64)>) -> Result<(Cid, u64), Error> {
        loop {
            let mut next_level = Vec::with_capacity(level.len() / self.config.max_links + 1);
            for group in level.chunks(self.config.max_links) {
                next_level.push(self.store_interior(group)?);
            }
            if next_level.len() == 1 {
                return Ok(next_level.into_iter().next().unwrap());
            }
            level = next_level;
        }
    }

    fn build_trickle(&self, leaves: Vec<(Cid, u64)>) -> Result<(Cid, u64), Error> {
        let mut iter = leaves.into_iter().peekable();
        self.trickle_layer(&mut iter)
    }

    fn trickle_layer(
        &self,
        iter: &mut std::iter::Peekable<std::vec::IntoIter<(Cid, u64)>>,
    ) -> Result<(Cid, u64), Error> {
        let mut children = Vec::with_capacity(self.config.max_links + 1);
        for _ in 0..self.config.max_links {
            match iter.next() {
                Some(leaf) => children.push(leaf),
                None => break,
            }
        }
        if iter.peek().is_some() {
            children.push(self.trickle_layer(iter)?);
        }
        self.store_interior(&children)
    }

    /// Encodes one interior node carrying `children` as dag-pb links, and
    /// returns its CID along with the cumulative byte size of the subtree
    /// it roots (the sum of every child's size, used by the parent above
    /// it for its own accounting and reported as `Tsize`/`filesize`).
    fn store_interior(&self, children: &[(Cid, u64)]) -> Result<(Cid, u64), Error> {
        let total: u64 = children.iter().map(|(_, size)| size).sum();
        let node = PbNode {
            data: Some(
                UnixfsData {
                    filesize: total,
                    blocksizes: children.iter().map(|(_, size)| *size).collect(),
                }
                .encode(),
            ),
            links: children
                .iter()
                .map(|(cid, size)| PbLink { hash: *cid, name: None, tsize: Some(*size) })
                .collect(),
        };
        let ipld = crate::pb::node_to_ipld(&node);
        let cid = self.link_system.store(&LinkPrototype::dag_pb(), &ipld)?;
        tracing::debug!(%cid, links = children.len(), total, "stored interior unixfs node");
        Ok((cid, total))
    }
}
