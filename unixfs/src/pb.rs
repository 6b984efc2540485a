// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Minimal dag-pb wire codec for the UnixFS file-DAG shape (`§4.4`): just
//! enough protobuf to encode/decode `PBNode { Data, Links: [PBLink { Hash,
//! Name, Tsize }] }`. Arbitrary dag-pb is out of scope, same as the
//! original's UnixFS-only interop use — grounded on the field numbers used
//! by `koivunej-rust-ipfs`'s `unixfs::pb` and go-ipfs's `unixfs.proto`
//! (`PBNode`: `Data` = 1, `Links` = 2; `PBLink`: `Hash` = 1, `Name` = 2,
//! `Tsize` = 3).

use crate::Error;
use dagcid::Cid;
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// A single outgoing link in a dag-pb node.
#[derive(Clone, Debug, PartialEq)]
pub struct PbLink {
    pub hash: Cid,
    pub name: Option<String>,
    pub tsize: Option<u64>,
}

/// The UnixFS file-DAG node shape: inline data (or, for interior nodes, a
/// small size-accounting payload) plus an ordered list of links.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PbNode {
    pub data: Option<Vec<u8>>,
    pub links: Vec<PbLink>,
}

fn write_varint(buf: &mut Vec<u8>, mut v: u64) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64, Error> {
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| Error::MalformedPb("truncated varint".into()))?;
        *pos += 1;
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 63 {
            return Err(Error::MalformedPb("varint too long".into()));
        }
    }
    Ok(result)
}

fn write_tag(buf: &mut Vec<u8>, field: u64, wire_type: u64) {
    write_varint(buf, (field << 3) | wire_type);
}

fn write_length_delimited(buf: &mut Vec<u8>, field: u64, bytes: &[u8]) {
    write_tag(buf, field, 2);
    write_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn write_varint_field(buf: &mut Vec<u8>, field: u64, value: u64) {
    write_tag(buf, field, 0);
    write_varint(buf, value);
}

fn encode_link(link: &PbLink) -> Vec<u8> {
    let mut buf = Vec::new();
    write_length_delimited(&mut buf, 1, &link.hash.to_bytes());
    if let Some(name) = &link.name {
        write_length_delimited(&mut buf, 2, name.as_bytes());
    }
    if let Some(tsize) = link.tsize {
        write_varint_field(&mut buf, 3, tsize);
    }
    buf
}

/// Encodes a [`PbNode`] into its dag-pb wire bytes.
pub fn encode_pb_node(node: &PbNode) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(data) = &node.data {
        write_length_delimited(&mut buf, 1, data);
    }
    for link in &node.links {
        write_length_delimited(&mut buf, 2, &encode_link(&link));
    }
    buf
}

fn decode_link(bytes: &[u8]) -> Result<PbLink, Error> {
    let mut pos = 0;
    let mut hash = None;
    let mut name = None;
    let mut tsize = None;
    while pos < bytes.len() {
        let tag = read_varint(bytes, &mut pos)?;
        let field = tag >> 3;
        let wire_type = tag & 0x7;
        match (field, wire_type) {
            (1, 2) => {
                let len = read_varint(bytes, &mut pos)? as usize;
                let slice = take(bytes, &mut pos, len)?;
                hash = Some(Cid::try_from(slice).map_err(|e| Error::MalformedPb(e.to_string()))?);
            }
            (2, 2) => {
                let len = read_varint(bytes, &mut pos)? as usize;
                let slice = take(bytes, &mut pos, len)?;
                name = Some(
                    std::str::from_utf8(slice)
                        .map_err(|e| Error::MalformedPb(e.to_string()))?
                        .to_owned(),
                );
            }
            (3, 0) => tsize = Some(read_varint(bytes, &mut pos)?),
            _ => return Err(Error::MalformedPb(format!("unexpected PBLink field {field}"))),
        }
    }
    Ok(PbLink {
        hash: hash.ok_or_else(|| Error::MalformedPb("PBLink missing Hash".into()))?,
        name,
        tsize,
    })
}

fn take<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8], Error> {
    let end = pos
        .checked_add(len)
        .ok_or_else(|| Error::MalformedPb("length overflow".into()))?;
    let slice = bytes
        .get(*pos..end)
        .ok_or_else(|| Error::MalformedPb("truncated field".into()))?;
    *pos = end;
    Ok(slice)
}

/// Decodes dag-pb wire bytes into a [`PbNode`].
pub fn decode_pb_node(bytes: &[u8]) -> Result<PbNode, Error> {
    let mut pos = 0;
    let mut data = None;
    let mut links = Vec::new();
    while pos < bytes.len() {
        let tag = read_varint(bytes, &mut pos)?;
        let field = tag >> 3;
        let wire_type = tag & 0x7;
        match (field, wire_type) {
            (1, 2) => {
                let len = read_varint(bytes, &mut pos)? as usize;
                data = Some(take(bytes, &mut pos, len)?.to_vec());
            }
            (2, 2) => {
                let len = read_varint(bytes, &mut pos)? as usize;
                let slice = take(bytes, &mut pos, len)?;
                links.push(decode_link(slice)?);
            }
            _ => return Err(Error::MalformedPb(format!("unexpected PBNode field {field}"))),
        }
    }
    Ok(PbNode { data, links })
}

/// The small size-accounting payload carried in an interior node's `Data`
/// field: total byte length of the subtree, and each direct child's byte
/// length (mirrors go-ipfs's `unixfs.pb` `filesize`/`blocksizes`, without
/// carrying the full `Type` enum since this store only ever builds `File`
/// shaped trees).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnixfsData {
    pub filesize: u64,
    pub blocksizes: Vec<u64>,
}

impl UnixfsData {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint_field(&mut buf, 1, self.filesize);
        for size in &self.blocksizes {
            write_varint_field(&mut buf, 2, *size);
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut pos = 0;
        let mut filesize = 0;
        let mut blocksizes = Vec::new();
        while pos < bytes.len() {
            let tag = read_varint(bytes, &mut pos)?;
            let field = tag >> 3;
            let wire_type = tag & 0x7;
            match (field, wire_type) {
                (1, 0) => filesize = read_varint(bytes, &mut pos)?,
                (2, 0) => blocksizes.push(read_varint(bytes, &mut pos)?),
                _ => return Err(Error::MalformedPb(format!("unexpected UnixfsData field {field}"))),
            }
        }
        Ok(UnixfsData { filesize, blocksizes })
    }
}

use dagipld::Ipld;

/// Converts a [`PbNode`] into the canonical `Ipld` shape the selector engine
/// and CAR export operate on: a map with `Links` (each a map of `Hash`,
/// optionally `Name`/`Tsize`) and `Data` (`§3`'s UnixFS File DAG shape).
pub fn node_to_ipld(node: &PbNode) -> Ipld {
    let mut fields = BTreeMap::new();
    let links = node
        .links
        .iter()
        .map(|link| {
            let mut m = BTreeMap::new();
            m.insert("Hash".to_string(), Ipld::Link(link.hash));
            if let Some(name) = &link.name {
                m.insert("Name".to_string(), Ipld::String(name.clone()));
            }
            if let Some(tsize) = link.tsize {
                m.insert("Tsize".to_string(), Ipld::Integer(tsize as i128));
            }
            Ipld::Map(m)
        })
        .collect();
    fields.insert("Links".to_string(), Ipld::List(links));
    if let Some(data) = &node.data {
        fields.insert("Data".to_string(), Ipld::Bytes(data.clone()));
    }
    Ipld::Map(fields)
}

/// The inverse of [`node_to_ipld`]; fails if `ipld` is not shaped like a
/// UnixFS node.
pub fn node_from_ipld(ipld: &Ipld) -> Result<PbNode, Error> {
    let Ipld::Map(fields) = ipld else {
        return Err(Error::MalformedPb("unixfs node must be a map".into()));
    };
    let data = match fields.get("Data") {
        Some(Ipld::Bytes(b)) => Some(b.clone()),
        Some(other) => {
            return Err(Error::MalformedPb(format!("Data field must be bytes, got {other:?}")))
        }
        None => None,
    };
    let links = match fields.get("Links") {
        Some(Ipld::List(items)) => items
            .iter()
            .map(|item| {
                let Ipld::Map(m) = item else {
                    return Err(Error::MalformedPb("link entry must be a map".into()));
                };
                let hash = match m.get("Hash") {
                    Some(Ipld::Link(cid)) => *cid,
                    _ => return Err(Error::MalformedPb("link entry missing Hash".into())),
                };
                let name = match m.get("Name") {
                    Some(Ipld::String(s)) => Some(s.clone()),
                    _ => None,
                };
                let tsize = match m.get("Tsize") {
                    Some(Ipld::Integer(i)) => Some(*i as u64),
                    _ => None,
                };
                Ok(PbLink { hash, name, tsize })
            })
            .collect::<Result<Vec<_>, Error>>()?,
        Some(other) => {
            return Err(Error::MalformedPb(format!("Links field must be a list, got {other:?}")))
        }
        None => Vec::new(),
    };
    Ok(PbNode { data, links })
}
