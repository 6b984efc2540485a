// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Length-delimited `(Cid, bytes)` entries (`§6`): a varint byte count
//! covering the CID and the block bytes together, then the CID, then the
//! bytes. Grounded on the teacher's `ipld/car/src/util.rs` `ld_read`/
//! `ld_write`, ported from its async `futures` I/O to this crate's
//! synchronous `std::io`.

use crate::Error;
use dagcid::Cid;
use integer_encoding::{VarIntReader, VarIntWriter};
use std::io::{Read, Write};

/// Writes one length-delimited entry. Returns the number of bytes written,
/// used by callers that build an index alongside the data section.
pub fn write_entry<W: Write>(writer: &mut W, cid: &Cid, bytes: &[u8]) -> Result<usize, Error> {
    let cid_bytes = cid.to_bytes();
    let body_len = cid_bytes.len() + bytes.len();
    let prefix_len = writer.write_varint(body_len as u64)?;
    writer.write_all(&cid_bytes)?;
    writer.write_all(bytes)?;
    Ok(prefix_len + body_len)
}

/// Reads one length-delimited entry, or `None` at a clean end of stream.
pub fn read_entry<R: Read>(reader: &mut R) -> Result<Option<(Cid, Vec<u8>)>, Error> {
    let len: u64 = match reader.read_varint() {
        Ok(len) => len,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body)?;
    let mut cursor = std::io::Cursor::new(&body);
    let cid = Cid::read_bytes(&mut cursor)
        .map_err(|e| Error::MalformedEntry(format!("bad CID: {e}")))?;
    let data = body[cursor.position() as usize..].to_vec();
    Ok(Some((cid, data)))
}
