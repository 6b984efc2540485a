// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The optional index section (`§4.7`, `§6`): a sorted `(Cid, offset)` table
//! giving random access into the data section without a full scan.
//! Shape grounded on the "IndexSorted" index family described by the CARv2
//! spec and exercised by `blocklessnetwork-car-utils`'s archival tooling and
//! `cyberfly-io-rust-helia`'s `helia-car`, simplified to a single flat,
//! CID-sorted bucket since this implementation never shards by digest.

use crate::Error;
use dagcid::Cid;
use integer_encoding::{VarIntReader, VarIntWriter};
use std::io::{Read, Write};

/// One index row: the block's CID and its byte offset from the start of the
/// data section's first entry (not the start of the file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexEntry {
    pub cid: Cid,
    pub offset: u64,
}

/// A sorted, flat index. Sorting is by CID bytes, which is what makes
/// lookups a binary search rather than a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn build(mut entries: Vec<IndexEntry>) -> Self {
        entries.sort_by(|a, b| a.cid.to_bytes().cmp(&b.cid.to_bytes()));
        Self { entries }
    }

    pub fn lookup(&self, cid: &Cid) -> Option<u64> {
        let target = cid.to_bytes();
        self.entries
            .binary_search_by(|entry| entry.cid.to_bytes().cmp(&target))
            .ok()
            .map(|i| self.entries[i].offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_varint(self.entries.len() as u64)?;
        for entry in &self.entries {
            let cid_bytes = entry.cid.to_bytes();
            writer.write_varint(cid_bytes.len() as u64)?;
            writer.write_all(&cid_bytes)?;
            writer.write_all(&entry.offset.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self, Error> {
        let count: u64 = reader.read_varint()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let cid_len: u64 = reader.read_varint()?;
            let mut cid_bytes = vec![0u8; cid_len as usize];
            reader.read_exact(&mut cid_bytes)?;
            let cid = Cid::try_from(cid_bytes.as_slice())
                .map_err(|e| Error::MalformedEntry(format!("bad index CID: {e}")))?;
            let mut offset_bytes = [0u8; 8];
            reader.read_exact(&mut offset_bytes)?;
            entries.push(IndexEntry {
                cid,
                offset: u64::from_le_bytes(offset_bytes),
            });
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagcid::{recompute_cid, Codec, HashAlgorithm};
    use std::io::Cursor;

    #[test]
    fn lookup_finds_stored_offsets() {
        let a = recompute_cid(b"a", Codec::Raw, HashAlgorithm::Blake3);
        let b = recompute_cid(b"b", Codec::Raw, HashAlgorithm::Blake3);
        let index = Index::build(vec![
            IndexEntry { cid: a, offset: 0 },
            IndexEntry { cid: b, offset: 42 },
        ]);
        assert_eq!(index.lookup(&a), Some(0));
        assert_eq!(index.lookup(&b), Some(42));
    }

    #[test]
    fn lookup_of_unknown_cid_is_none() {
        let a = recompute_cid(b"a", Codec::Raw, HashAlgorithm::Blake3);
        let missing = recompute_cid(b"missing", Codec::Raw, HashAlgorithm::Blake3);
        let index = Index::build(vec![IndexEntry { cid: a, offset: 0 }]);
        assert_eq!(index.lookup(&missing), None);
    }

    #[test]
    fn round_trips_through_bytes() {
        let a = recompute_cid(b"a", Codec::Raw, HashAlgorithm::Blake3);
        let b = recompute_cid(b"b", Codec::Raw, HashAlgorithm::Blake3);
        let index = Index::build(vec![
            IndexEntry { cid: b, offset: 42 },
            IndexEntry { cid: a, offset: 0 },
        ]);

        let mut buf = Vec::new();
        index.write(&mut buf).unwrap();
        let read_back = Index::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, index);
    }
}
