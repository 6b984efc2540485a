// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Selective CAR v2 export (`§4.7`): drive the selector over the root,
//! serialising every visited block as a length-delimited entry. The header
//! is written twice — a zeroed placeholder up front, then patched once the
//! data section's true size is known — which is why the writer requires
//! `Seek` rather than a pure append-only stream.

use crate::header::{CarV2Header, HEADER_LEN};
use crate::index::{Index, IndexEntry};
use crate::pragma::write_pragma;
use crate::{entry, v1header, Error};
use dagcid::Cid;
use dagipld::selector::{walk_all, Selector};
use kvstore::KvStore;
use linksystem::LinkSystem;
use std::io::{Seek, SeekFrom, Write};

/// Writes a CAR v2 container for the blocks the selector visits from
/// `root`, in visitation order (including duplicates — `§4.5`'s ordering
/// guarantee). When `with_index` is set, a sorted `(Cid, offset)` index is
/// appended after the data section.
pub fn export_car_v2<K: KvStore, W: Write + Seek>(
    link_system: &LinkSystem<K>,
    root: Cid,
    selector: &Selector,
    writer: &mut W,
    with_index: bool,
) -> Result<(), Error> {
    let root_node = link_system.load(&root)?;
    let cids = async_std::task::block_on(walk_all(link_system, Some(root), &root_node, selector))?;
    tracing::debug!(%root, block_count = cids.len(), "exporting car v2");

    write_pragma(writer)?;
    let header_pos = writer.stream_position()?;
    CarV2Header::default().write(writer)?;

    let data_start = writer.stream_position()?;
    v1header::write_v1_header(writer, &[root])?;
    let entries_start = writer.stream_position()?;

    let mut index_entries = Vec::with_capacity(cids.len());
    let mut offset = 0u64;
    for cid in &cids {
        let bytes = link_system.blockstore().get(cid)?;
        index_entries.push(IndexEntry { cid: *cid, offset });
        offset += entry::write_entry(writer, cid, &bytes)? as u64;
        tracing::trace!(%cid, "wrote car entry");
    }
    let data_end = entries_start + offset;
    let data_size = data_end - data_start;

    let index_offset = if with_index {
        let index = Index::build(index_entries);
        index.write(writer)?;
        data_end
    } else {
        0
    };

    writer.seek(SeekFrom::Start(header_pos))?;
    CarV2Header {
        characteristics: 0,
        data_offset: data_start,
        data_size,
        index_offset,
    }
    .write(writer)?;
    writer.seek(SeekFrom::Start(header_pos + HEADER_LEN as u64 + data_size))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockstore::BlockStore;
    use dagcid::LinkPrototype;
    use dagipld::selector::RecursionLimit;
    use dagipld::Ipld;
    use kvstore::MemoryKvStore;
    use std::collections::BTreeMap;
    use std::io::Cursor;
    use std::sync::Arc;

    fn system() -> LinkSystem<MemoryKvStore> {
        LinkSystem::new(BlockStore::new(Arc::new(MemoryKvStore::new())))
    }

    fn leaf_node(data: &str) -> Ipld {
        Ipld::Bytes(data.as_bytes().to_vec())
    }

    #[test]
    fn export_round_trips_through_import() {
        let ls = system();
        let leaf_a = ls.store(&LinkPrototype::raw_leaf(), &leaf_node("a")).unwrap();
        let leaf_b = ls.store(&LinkPrototype::raw_leaf(), &leaf_node("b")).unwrap();

        let mut links = BTreeMap::new();
        links.insert("a".to_string(), Ipld::Link(leaf_a));
        links.insert("b".to_string(), Ipld::Link(leaf_b));
        let root = ls.store(&LinkPrototype::default_dag_cbor(), &Ipld::Map(links)).unwrap();

        let selector = Selector::recursive(
            Selector::ExploreUnion(vec![
                Selector::Matcher,
                Selector::ExploreAll { next: Box::new(Selector::ExploreRecursiveEdge) },
            ]),
            RecursionLimit::None,
        );

        let mut buf = Cursor::new(Vec::new());
        export_car_v2(&ls, root, &selector, &mut buf, true).unwrap();

        let bytes = buf.into_inner();
        assert!(!bytes.is_empty());

        let fresh = system();
        let mut import_cursor = Cursor::new(bytes);
        let roots = crate::reader::import_car_v2(&fresh, &mut import_cursor).unwrap();
        assert_eq!(roots, vec![root]);
        assert_eq!(fresh.blockstore().get(&leaf_a).unwrap(), b"a");
        assert_eq!(fresh.blockstore().get(&leaf_b).unwrap(), b"b");
        assert_eq!(fresh.load(&root).unwrap(), ls.load(&root).unwrap());
    }

    #[test]
    fn export_is_deterministic_across_runs() {
        let ls = system();
        let leaf = ls.store(&LinkPrototype::raw_leaf(), &leaf_node("x")).unwrap();
        let mut links = BTreeMap::new();
        links.insert("only".to_string(), Ipld::Link(leaf));
        let root = ls.store(&LinkPrototype::default_dag_cbor(), &Ipld::Map(links)).unwrap();

        let selector = Selector::ExploreFields {
            fields: {
                let mut f = BTreeMap::new();
                f.insert("only".to_string(), Selector::Matcher);
                f
            },
        };

        let mut first = Cursor::new(Vec::new());
        export_car_v2(&ls, root, &selector, &mut first, false).unwrap();
        let mut second = Cursor::new(Vec::new());
        export_car_v2(&ls, root, &selector, &mut second, false).unwrap();
        assert_eq!(first.into_inner(), second.into_inner());
    }

    fn explore_all_selector() -> Selector {
        Selector::recursive(
            Selector::ExploreUnion(vec![
                Selector::Matcher,
                Selector::ExploreAll { next: Box::new(Selector::ExploreRecursiveEdge) },
            ]),
            RecursionLimit::None,
        )
    }

    /// Builds a root list-of-leaves DAG from arbitrary byte strings, and
    /// checks properties 5 and 6 of the testable-properties list: export is
    /// byte-identical across runs, and importing the export recovers every
    /// block `subgraph` enumerated, each passing its own identity check.
    #[quickcheck_macros::quickcheck]
    fn export_import_round_trips_for_arbitrary_leaves(leaves: Vec<Vec<u8>>) -> bool {
        let ls = system();
        let leaf_cids: Vec<_> = leaves
            .iter()
            .map(|bytes| ls.store(&LinkPrototype::raw_leaf(), &Ipld::Bytes(bytes.clone())).unwrap())
            .collect();
        let root = ls
            .store(
                &LinkPrototype::default_dag_cbor(),
                &Ipld::List(leaf_cids.iter().map(|c| Ipld::Link(*c)).collect()),
            )
            .unwrap();

        let selector = explore_all_selector();

        let mut first = Cursor::new(Vec::new());
        export_car_v2(&ls, root, &selector, &mut first, false).unwrap();
        let mut second = Cursor::new(Vec::new());
        export_car_v2(&ls, root, &selector, &mut second, false).unwrap();
        let first_bytes = first.into_inner();
        if first_bytes != second.into_inner() {
            return false;
        }

        let fresh = system();
        let mut cursor = Cursor::new(first_bytes);
        let Ok(roots) = crate::reader::import_car_v2(&fresh, &mut cursor) else {
            return false;
        };
        if roots != vec![root] {
            return false;
        }
        leaf_cids
            .iter()
            .zip(leaves.iter())
            .all(|(cid, bytes)| fresh.blockstore().get(cid).ok().as_deref() == Some(bytes.as_slice()))
    }
}
