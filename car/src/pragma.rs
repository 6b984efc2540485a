// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The 11-byte CAR v2 pragma (`§6`): a self-describing CBOR map
//! `{"version": 2}`, fixed for every CAR v2 file regardless of payload.
//! Grounded on the real CARv2 pragma bytes, which decode as CBOR major
//! type 5 (map, 1 entry) -> text key `"version"` -> unsigned value `2`.

use crate::Error;
use std::io::{Read, Write};

pub const PRAGMA_LEN: usize = 11;

pub const V2_PRAGMA: [u8; PRAGMA_LEN] =
    [0x0a, 0xa1, 0x67, 0x76, 0x65, 0x72, 0x73, 0x69, 0x6f, 0x6e, 0x02];

pub fn write_pragma<W: Write>(writer: &mut W) -> Result<(), Error> {
    writer.write_all(&V2_PRAGMA)?;
    Ok(())
}

pub fn read_pragma<R: Read>(reader: &mut R) -> Result<(), Error> {
    let mut buf = [0u8; PRAGMA_LEN];
    reader.read_exact(&mut buf)?;
    if buf != V2_PRAGMA {
        return Err(Error::BadPragma);
    }
    Ok(())
}
