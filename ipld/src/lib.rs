// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The `Ipld` data model, its canonical dag-cbor codec, and the selector
//! algebra used to walk a DAG of linked blocks.

mod cbor;
pub mod dagcbor;
mod error;
mod path;
mod path_segment;
pub mod selector;

pub use cbor::Cbor;
pub use dagcid::Cid;
pub use error::Error;
pub use path::Path;
pub use path_segment::PathSegment;

use std::collections::BTreeMap;

/// The IPLD data model: the universal, codec-independent value type that
/// every block decodes into (and every node encodes from). Maps are kept in
/// a `BTreeMap` rather than a `HashMap` so that iteration order is always
/// the sorted key order dag-cbor's canonical form requires.
#[derive(Clone, Debug, PartialEq)]
pub enum Ipld {
    /// The null value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// An integer value, wide enough to cover both `i64` and `u64` inputs.
    Integer(i128),
    /// A floating point value.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A byte string.
    Bytes(Vec<u8>),
    /// A list of `Ipld` values.
    List(Vec<Ipld>),
    /// A map of `Ipld` values, keyed by string.
    Map(BTreeMap<String, Ipld>),
    /// A link to another block, addressed by its `Cid`.
    Link(Cid),
}

impl Ipld {
    /// Looks up a single path segment against this value: a map key or a
    /// list index. Returns `None` when the segment does not apply (wrong
    /// shape, missing key, out-of-range index).
    pub fn lookup_segment(&self, segment: &PathSegment) -> Option<&Ipld> {
        match (self, segment) {
            (Ipld::Map(map), PathSegment::String(key)) => map.get(key),
            (Ipld::Map(map), PathSegment::Int(i)) => map.get(&i.to_string()),
            (Ipld::List(list), seg) => seg.to_index().and_then(|i| list.get(i)),
            _ => None,
        }
    }

    /// Walks a full [`Path`], following segments one at a time.
    pub fn lookup_path(&self, path: &Path) -> Option<&Ipld> {
        let mut current = self;
        for segment in path.segments() {
            current = current.lookup_segment(segment)?;
        }
        Some(current)
    }

    /// `true` if this value is a link.
    pub fn is_link(&self) -> bool {
        matches!(self, Ipld::Link(_))
    }

    /// The link's `Cid`, if this value is a link.
    pub fn as_link(&self) -> Option<&Cid> {
        match self {
            Ipld::Link(cid) => Some(cid),
            _ => None,
        }
    }
}

impl From<bool> for Ipld {
    fn from(b: bool) -> Self {
        Ipld::Bool(b)
    }
}

impl From<String> for Ipld {
    fn from(s: String) -> Self {
        Ipld::String(s)
    }
}

impl From<&str> for Ipld {
    fn from(s: &str) -> Self {
        Ipld::String(s.to_owned())
    }
}

impl From<Vec<u8>> for Ipld {
    fn from(b: Vec<u8>) -> Self {
        Ipld::Bytes(b)
    }
}

impl From<Cid> for Ipld {
    fn from(cid: Cid) -> Self {
        Ipld::Link(cid)
    }
}

macro_rules! ipld_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Ipld {
            fn from(i: $ty) -> Self {
                Ipld::Integer(i as i128)
            }
        })*
    };
}
ipld_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);
