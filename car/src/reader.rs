// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! CAR v2 import (`§4.7`): parse the header, stream entries from the data
//! section, and put each block back through the Block Store's identity
//! check. There is no partial-success semantics — on error the store is
//! left with whatever subset of blocks had already been verified and put.

use crate::header::CarV2Header;
use crate::pragma::read_pragma;
use crate::{entry, v1header, Error};
use blockstore::Block;
use dagcid::Cid;
use kvstore::KvStore;
use linksystem::LinkSystem;
use std::io::{Read, Seek, SeekFrom};

/// Imports every block in the data section into `link_system`'s block
/// store, verifying each by recomputing its CID, and returns the declared
/// roots list.
pub fn import_car_v2<K: KvStore, R: Read + Seek>(
    link_system: &LinkSystem<K>,
    reader: &mut R,
) -> Result<Vec<Cid>, Error> {
    read_pragma(reader)?;
    let header = CarV2Header::read(reader)?;

    reader.seek(SeekFrom::Start(header.data_offset))?;
    let roots = v1header::read_v1_header(reader)?;

    let data_end = header.data_offset + header.data_size;
    let mut imported = 0usize;
    loop {
        let position = reader.stream_position()?;
        if position >= data_end {
            break;
        }
        let Some((cid, bytes)) = entry::read_entry(reader)? else {
            break;
        };
        match link_system.blockstore().put(&Block::new(cid, bytes)) {
            Ok(()) => {}
            Err(blockstore::Error::IdentityMismatch { declared }) => {
                return Err(Error::IdentityMismatch(declared))
            }
            Err(e) => return Err(e.into()),
        }
        imported += 1;
        tracing::trace!(%cid, "imported car entry");
    }
    tracing::debug!(block_count = imported, roots = roots.len(), "imported car v2");

    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::export_car_v2;
    use blockstore::BlockStore;
    use dagcid::LinkPrototype;
    use dagipld::selector::{RecursionLimit, Selector};
    use dagipld::Ipld;
    use kvstore::MemoryKvStore;
    use std::io::Cursor;
    use std::sync::Arc;

    fn system() -> LinkSystem<MemoryKvStore> {
        LinkSystem::new(BlockStore::new(Arc::new(MemoryKvStore::new())))
    }

    #[test]
    fn import_rejects_tampered_entry() {
        let ls = system();
        let root = ls.store(&LinkPrototype::raw_leaf(), &Ipld::Bytes(b"hi".to_vec())).unwrap();

        let mut buf = Cursor::new(Vec::new());
        export_car_v2(&ls, root, &Selector::Matcher, &mut buf, false).unwrap();
        let mut bytes = buf.into_inner();

        let tamper_at = bytes.len() - 1;
        bytes[tamper_at] ^= 0xff;

        let fresh = system();
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(
            import_car_v2(&fresh, &mut cursor),
            Err(Error::IdentityMismatch(_))
        ));
    }

    #[test]
    fn import_rejects_bad_pragma() {
        let fresh = system();
        let mut cursor = Cursor::new(vec![0u8; 64]);
        assert!(matches!(import_car_v2(&fresh, &mut cursor), Err(Error::BadPragma)));
    }

    #[test]
    fn import_preserves_duplicate_visitation_order() {
        let ls = system();
        let leaf = ls.store(&LinkPrototype::raw_leaf(), &Ipld::Bytes(b"dup".to_vec())).unwrap();

        let mut list = Vec::new();
        list.push(Ipld::Link(leaf));
        list.push(Ipld::Link(leaf));
        let root = ls.store(&LinkPrototype::default_dag_cbor(), &Ipld::List(list)).unwrap();

        let selector = Selector::recursive(
            Selector::ExploreUnion(vec![
                Selector::Matcher,
                Selector::ExploreAll { next: Box::new(Selector::ExploreRecursiveEdge) },
            ]),
            RecursionLimit::None,
        );

        let mut buf = Cursor::new(Vec::new());
        export_car_v2(&ls, root, &selector, &mut buf, false).unwrap();
        let bytes = buf.into_inner();

        let occurrences = bytes.windows(3).filter(|w| *w == b"dup").count();
        assert_eq!(occurrences, 2);

        let fresh = system();
        let mut cursor = Cursor::new(bytes);
        import_car_v2(&fresh, &mut cursor).unwrap();
        assert_eq!(fresh.blockstore().get(&leaf).unwrap(), b"dup");
    }
}
