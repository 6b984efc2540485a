// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The CAR v1 header that opens the v2 data section: `{roots, version: 1}`,
//! length-delimited like any other entry. Represented as an [`Ipld`] map and
//! pushed through the existing dag-cbor codec rather than teaching `Cid`
//! serde, since this crate otherwise never needs `Cid` to round-trip through
//! serde directly.

use crate::Error;
use dagcid::Cid;
use dagipld::{dagcbor, Ipld};
use integer_encoding::{VarIntReader, VarIntWriter};
use std::collections::BTreeMap;
use std::io::{Read, Write};

const EMBEDDED_VERSION: i128 = 1;

pub fn write_v1_header<W: Write>(writer: &mut W, roots: &[Cid]) -> Result<usize, Error> {
    let mut map = BTreeMap::new();
    map.insert(
        "roots".to_string(),
        Ipld::List(roots.iter().map(|cid| Ipld::Link(*cid)).collect()),
    );
    map.insert("version".to_string(), Ipld::Integer(EMBEDDED_VERSION));
    let bytes = dagcbor::encode(&Ipld::Map(map))?;

    let prefix_len = writer.write_varint(bytes.len() as u64)?;
    writer.write_all(&bytes)?;
    Ok(prefix_len + bytes.len())
}

pub fn read_v1_header<R: Read>(reader: &mut R) -> Result<Vec<Cid>, Error> {
    let len: u64 = reader.read_varint()?;
    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;
    let ipld = dagcbor::decode(&bytes)?;

    let Ipld::Map(map) = ipld else {
        return Err(Error::MalformedV1Header("not a map".into()));
    };
    let version = match map.get("version") {
        Some(Ipld::Integer(v)) => *v,
        _ => return Err(Error::MalformedV1Header("missing version".into())),
    };
    if version != EMBEDDED_VERSION {
        return Err(Error::WrongEmbeddedVersion(version as u64));
    }
    let roots = match map.get("roots") {
        Some(Ipld::List(list)) => list
            .iter()
            .map(|entry| match entry {
                Ipld::Link(cid) => Ok(*cid),
                other => Err(Error::MalformedV1Header(format!(
                    "root is not a link: {other:?}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(Error::MalformedV1Header("missing roots".into())),
    };
    Ok(roots)
}
