// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Canonical dag-cbor codec for [`Ipld`](crate::Ipld).
//!
//! `serde_cbor` has no notion of the dag-cbor CID convention (tag 42 wrapping
//! a multibase-prefixed byte string), and the teacher's own fork of
//! `serde_cbor` exists only to paper over that gap. Rather than depend on a
//! fork, `Ipld` gets a small hand-written encoder/decoder that walks the enum
//! directly. Canonical ordering of map keys falls out of `BTreeMap`'s own
//! iteration order, so there is nothing else to sort.

use crate::{Error, Ipld};
use dagcid::Cid;
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// A dag-cbor CID is tag 42 wrapping a byte string whose first byte is the
/// identity multibase prefix (`0x00`), followed by the binary CID.
const CID_TAG: u64 = 42;
const MULTIBASE_IDENTITY: u8 = 0x00;

pub fn encode(ipld: &Ipld) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    write_ipld(&mut buf, ipld)?;
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<Ipld, Error> {
    let mut cursor = Cursor { bytes, pos: 0 };
    let ipld = read_ipld(&mut cursor)?;
    if cursor.pos != cursor.bytes.len() {
        return Err(Error::Decode("trailing bytes after dag-cbor value".into()));
    }
    Ok(ipld)
}

fn write_head(buf: &mut Vec<u8>, major: u8, len: u64) {
    let major = major << 5;
    if len < 24 {
        buf.push(major | len as u8);
    } else if len <= u8::MAX as u64 {
        buf.push(major | 24);
        buf.push(len as u8);
    } else if len <= u16::MAX as u64 {
        buf.push(major | 25);
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as u64 {
        buf.push(major | 26);
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        buf.push(major | 27);
        buf.extend_from_slice(&len.to_be_bytes());
    }
}

fn write_ipld(buf: &mut Vec<u8>, ipld: &Ipld) -> Result<(), Error> {
    match ipld {
        Ipld::Null => buf.push(0xf6),
        Ipld::Bool(false) => buf.push(0xf4),
        Ipld::Bool(true) => buf.push(0xf5),
        Ipld::Integer(i) => {
            if *i >= 0 {
                let v = u64::try_from(*i)
                    .map_err(|_| Error::Encode("integer out of range".into()))?;
                write_head(buf, 0, v);
            } else {
                let v = u64::try_from(-1 - *i)
                    .map_err(|_| Error::Encode("integer out of range".into()))?;
                write_head(buf, 1, v);
            }
        }
        Ipld::Float(f) => {
            if f.is_nan() {
                return Err(Error::Encode("dag-cbor forbids NaN floats".into()));
            }
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_bits().to_be_bytes());
        }
        Ipld::String(s) => {
            write_head(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Ipld::Bytes(b) => {
            write_head(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Ipld::List(items) => {
            write_head(buf, 4, items.len() as u64);
            for item in items {
                write_ipld(buf, item)?;
            }
        }
        Ipld::Map(map) => {
            write_head(buf, 5, map.len() as u64);
            for (k, v) in map {
                write_head(buf, 3, k.len() as u64);
                buf.extend_from_slice(k.as_bytes());
                write_ipld(buf, v)?;
            }
        }
        Ipld::Link(cid) => {
            write_head(buf, 6, CID_TAG);
            let cid_bytes = cid.to_bytes();
            write_head(buf, 2, (cid_bytes.len() + 1) as u64);
            buf.push(MULTIBASE_IDENTITY);
            buf.extend_from_slice(&cid_bytes);
        }
    }
    Ok(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Result<u8, Error> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| Error::Decode("unexpected end of dag-cbor input".into()))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| Error::Decode("length overflow".into()))?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| Error::Decode("unexpected end of dag-cbor input".into()))?;
        self.pos = end;
        Ok(slice)
    }

    fn read_len(&mut self, additional: u8) -> Result<u64, Error> {
        match additional {
            0..=23 => Ok(additional as u64),
            24 => Ok(self.next()? as u64),
            25 => Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()) as u64),
            26 => Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()) as u64),
            27 => Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap())),
            _ => Err(Error::Decode(format!("unsupported length encoding {additional}"))),
        }
    }
}

fn read_ipld(cursor: &mut Cursor) -> Result<Ipld, Error> {
    let initial = cursor.next()?;
    let major = initial >> 5;
    let additional = initial & 0x1f;
    match major {
        0 => Ok(Ipld::Integer(cursor.read_len(additional)? as i128)),
        1 => Ok(Ipld::Integer(-1 - cursor.read_len(additional)? as i128)),
        2 => {
            let len = cursor.read_len(additional)? as usize;
            Ok(Ipld::Bytes(cursor.take(len)?.to_vec()))
        }
        3 => {
            let len = cursor.read_len(additional)? as usize;
            let s = std::str::from_utf8(cursor.take(len)?)
                .map_err(|e| Error::Decode(e.to_string()))?;
            Ok(Ipld::String(s.to_owned()))
        }
        4 => {
            let len = cursor.read_len(additional)? as usize;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(read_ipld(cursor)?);
            }
            Ok(Ipld::List(items))
        }
        5 => {
            let len = cursor.read_len(additional)? as usize;
            let mut map = BTreeMap::new();
            for _ in 0..len {
                let key = match read_ipld(cursor)? {
                    Ipld::String(s) => s,
                    other => {
                        return Err(Error::Decode(format!(
                            "dag-cbor map keys must be text strings, got {other:?}"
                        )))
                    }
                };
                let value = read_ipld(cursor)?;
                map.insert(key, value);
            }
            Ok(Ipld::Map(map))
        }
        6 => {
            let tag = cursor.read_len(additional)?;
            if tag != CID_TAG {
                return Err(Error::Decode(format!("unsupported cbor tag {tag}")));
            }
            let inner = cursor.next()?;
            if inner >> 5 != 2 {
                return Err(Error::Decode("cid tag must wrap a byte string".into()));
            }
            let len = cursor.read_len(inner & 0x1f)? as usize;
            let bytes = cursor.take(len)?;
            let (prefix, cid_bytes) = bytes
                .split_first()
                .ok_or_else(|| Error::Decode("empty cid byte string".into()))?;
            if *prefix != MULTIBASE_IDENTITY {
                return Err(Error::Decode("cid must use identity multibase prefix".into()));
            }
            let cid = Cid::try_from(cid_bytes).map_err(|e| Error::Decode(e.to_string()))?;
            Ok(Ipld::Link(cid))
        }
        7 => match additional {
            20 => Ok(Ipld::Bool(false)),
            21 => Ok(Ipld::Bool(true)),
            22 => Ok(Ipld::Null),
            27 => {
                let bits = u64::from_be_bytes(cursor.take(8)?.try_into().unwrap());
                Ok(Ipld::Float(f64::from_bits(bits)))
            }
            _ => Err(Error::Decode(format!(
                "unsupported simple/float encoding {additional}"
            ))),
        },
        _ => unreachable!("major type is a 3-bit field"),
    }
}
