// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The depth-first walker that drives a compiled [`Selector`](super::Selector)
//! over a DAG, following links through a [`LinkResolver`].

use super::Selector;
use crate::{Error, Ipld, Path, PathSegment};
use async_recursion::async_recursion;
use async_trait::async_trait;
use dagcid::Cid;

/// Resolves a link to the node it points at. Implemented by the Link System
/// for real traversal, and by in-memory maps in tests.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn load_link(&self, cid: &Cid) -> Result<Ipld, Error>;
}

/// The CID that produced the node currently being visited, and the path
/// travelled since it was loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LastBlockInfo {
    pub link: Option<Cid>,
    pub path: Path,
}

/// Traversal state threaded through the walk: the path from the traversal
/// root, and which block the current node came from.
#[derive(Clone, Debug, Default)]
pub struct Progress {
    pub path: Path,
    pub last_block: LastBlockInfo,
}

/// Why the visitor is being called for this node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitReason {
    /// The selector's `Matcher` fired on this node.
    Matched,
    /// The walker followed a link and is about to explore the loaded node;
    /// not all resolvers need this, but it lets callers count blocks loaded
    /// even when nothing inside them matches.
    EnteredLink,
}

/// Runs `selector` over `node`, calling `visit` for every node that a
/// `Matcher` selects. `visit` returning `Err` aborts the walk and that error
/// becomes this function's return value.
pub async fn walk_matching<R, V>(
    resolver: &R,
    node: &Ipld,
    selector: &Selector,
    mut visit: V,
) -> Result<(), Error>
where
    R: LinkResolver,
    V: FnMut(&Progress, &Ipld, VisitReason) -> Result<(), Error> + Send,
{
    let mut progress = Progress::default();
    walk_node(resolver, node, selector, &mut progress, &mut visit).await
}

/// Like [`walk_matching`] but collects every visited node's CID-producing
/// link into an ordered list (used by `subgraph` and CAR export). The root
/// is included first even when it has no producing link.
pub async fn walk_all<R>(
    resolver: &R,
    root_cid: Option<Cid>,
    node: &Ipld,
    selector: &Selector,
) -> Result<Vec<Cid>, Error>
where
    R: LinkResolver,
{
    let mut cids = Vec::new();
    if let Some(cid) = root_cid {
        cids.push(cid);
    }
    walk_matching(resolver, node, selector, |progress, _node, reason| {
        if reason == VisitReason::EnteredLink {
            if let Some(cid) = &progress.last_block.link {
                cids.push(*cid);
            }
        }
        Ok(())
    })
    .await?;
    Ok(cids)
}

#[async_recursion]
async fn walk_node<R, V>(
    resolver: &R,
    node: &Ipld,
    selector: &Selector,
    progress: &mut Progress,
    visit: &mut V,
) -> Result<(), Error>
where
    R: LinkResolver + 'async_recursion,
    V: FnMut(&Progress, &Ipld, VisitReason) -> Result<(), Error> + Send,
{
    if matches!(selector, Selector::Matcher) {
        return visit(progress, node, VisitReason::Matched);
    }

    if let Selector::ExploreUnion(branches) = selector {
        for branch in branches {
            walk_node(resolver, node, branch, progress, visit).await?;
        }
        return Ok(());
    }

    if let Selector::ExploreRecursive { sequence, limit } = selector {
        if limit.is_exhausted() {
            return Ok(());
        }
        let expanded = Selector::expand_recursive(sequence, limit);
        return walk_node(resolver, node, &expanded, progress, visit).await;
    }

    if !selector.interests() {
        return Ok(());
    }

    for segment in children_of(node) {
        let Some(next) = selector.explore(node, &segment) else {
            continue;
        };
        let Some(child) = node.lookup_segment(&segment) else {
            continue;
        };

        progress.path.push(segment);
        let result = visit_child(resolver, child, &next, progress, visit).await;
        progress.path.pop();
        result?;
    }
    Ok(())
}

#[async_recursion]
async fn visit_child<R, V>(
    resolver: &R,
    child: &Ipld,
    next: &Selector,
    progress: &mut Progress,
    visit: &mut V,
) -> Result<(), Error>
where
    R: LinkResolver + 'async_recursion,
    V: FnMut(&Progress, &Ipld, VisitReason) -> Result<(), Error> + Send,
{
    match child {
        Ipld::Link(cid) => {
            let loaded = resolver.load_link(cid).await?;
            let previous_block = progress.last_block.clone();
            progress.last_block = LastBlockInfo {
                link: Some(*cid),
                path: progress.path.clone(),
            };
            visit(progress, &loaded, VisitReason::EnteredLink)?;
            let result = walk_node(resolver, &loaded, next, progress, visit).await;
            progress.last_block = previous_block;
            result
        }
        other => walk_node(resolver, other, next, progress, visit).await,
    }
}

/// Every path segment a node can be indexed by: map keys in lexical order,
/// or list indices in order. Lexical order on `BTreeMap` keys is what makes
/// traversal (and therefore CAR export) deterministic across runs (`§4.5`).
fn children_of(node: &Ipld) -> Vec<PathSegment> {
    match node {
        Ipld::Map(map) => map.keys().cloned().map(PathSegment::String).collect(),
        Ipld::List(list) => (0..list.len()).map(PathSegment::Int).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::RecursionLimit;
    use dagcid::{recompute_cid, Codec, HashAlgorithm};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct MapResolver(std::collections::HashMap<Cid, Ipld>);

    #[async_trait]
    impl LinkResolver for MapResolver {
        async fn load_link(&self, cid: &Cid) -> Result<Ipld, Error> {
            self.0
                .get(cid)
                .cloned()
                .ok_or_else(|| Error::Link(format!("no block for {cid}")))
        }
    }

    fn leaf(data: &[u8]) -> (Cid, Ipld) {
        let cid = recompute_cid(data, Codec::Raw, HashAlgorithm::Blake3);
        (cid, Ipld::Bytes(data.to_vec()))
    }

    #[async_std::test]
    async fn matcher_only_selector_visits_root_once() {
        let (cid_a, leaf_a) = leaf(b"a");
        let mut resolver_map = std::collections::HashMap::new();
        resolver_map.insert(cid_a, leaf_a);
        let resolver = MapResolver(resolver_map);

        let mut links = Vec::new();
        links.push({
            let mut m = BTreeMap::new();
            m.insert("Hash".to_string(), Ipld::Link(cid_a));
            Ipld::Map(m)
        });
        let mut root = BTreeMap::new();
        root.insert("Links".to_string(), Ipld::List(links));
        root.insert("Data".to_string(), Ipld::String("x".into()));
        let root = Ipld::Map(root);

        let visits = Mutex::new(0usize);
        walk_matching(&resolver, &root, &Selector::Matcher, |_progress, _node, reason| {
            assert_eq!(reason, VisitReason::Matched);
            *visits.lock().unwrap() += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(*visits.lock().unwrap(), 1);
    }

    #[async_std::test]
    async fn unixfs_selector_visits_root_and_every_leaf() {
        let (cid_a, leaf_a) = leaf(b"a");
        let (cid_b, leaf_b) = leaf(b"b");
        let mut resolver_map = std::collections::HashMap::new();
        resolver_map.insert(cid_a, leaf_a);
        resolver_map.insert(cid_b, leaf_b);
        let resolver = MapResolver(resolver_map);

        let links = vec![
            {
                let mut m = BTreeMap::new();
                m.insert("Hash".to_string(), Ipld::Link(cid_a));
                Ipld::Map(m)
            },
            {
                let mut m = BTreeMap::new();
                m.insert("Hash".to_string(), Ipld::Link(cid_b));
                Ipld::Map(m)
            },
        ];
        let mut root = BTreeMap::new();
        root.insert("Links".to_string(), Ipld::List(links));
        root.insert("Data".to_string(), Ipld::String("x".into()));
        let root = Ipld::Map(root);

        let matches = Mutex::new(0usize);
        let selector = Selector::unixfs_default();
        walk_matching(&resolver, &root, &selector, |_progress, _node, reason| {
            if reason == VisitReason::Matched {
                *matches.lock().unwrap() += 1;
            }
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(*matches.lock().unwrap(), 3);
    }

    /// `Depth(N)` bounds the number of times an `ExploreRecursive` frame's
    /// `sequence` is applied, not how many edges may be followed once
    /// applied — so `Depth(0)` means "apply the sequence zero times",
    /// matching nothing at all, not "apply it once but recurse no
    /// further". This is the deliberate reading of `RecursionLimit::Depth`'s
    /// own doc comment ("stop once `depth` further recursions have been
    /// taken"): a frame reached with an already-exhausted limit stops
    /// before visiting anything, including the node it was entered on.
    #[async_std::test]
    async fn depth_zero_recursion_matches_nothing() {
        let resolver = MapResolver(std::collections::HashMap::new());
        let mut root = BTreeMap::new();
        root.insert("Data".to_string(), Ipld::String("x".into()));
        let root = Ipld::Map(root);

        let selector = Selector::recursive(Selector::Matcher, RecursionLimit::Depth(0));
        let matches = Mutex::new(0usize);
        walk_matching(&resolver, &root, &selector, |_progress, _node, reason| {
            if reason == VisitReason::Matched {
                *matches.lock().unwrap() += 1;
            }
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(*matches.lock().unwrap(), 0);
    }
}
