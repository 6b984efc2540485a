// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The fixed 40-byte CAR v2 header (`§6`): a characteristics bitfield,
//! then three little-endian `u64` offsets. Field layout grounded on the
//! real CARv2 header shape.

use crate::Error;
use std::io::{Read, Write};

pub const HEADER_LEN: usize = 40;

/// `PRAGMA_LEN + HEADER_LEN` — every CAR v2 file's data section starts here
/// unless padding was inserted, which this implementation never does.
pub const DATA_SECTION_START: u64 = (crate::pragma::PRAGMA_LEN + HEADER_LEN) as u64;

/// Characteristics bit set when the data section is known to need no
/// further index to support random access (unused here — exporting always
/// declares "index may be present, check `index_offset`").
pub const CHARACTERISTIC_FULLY_INDEXED: u128 = 1 << 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarV2Header {
    pub characteristics: u128,
    pub data_offset: u64,
    pub data_size: u64,
    pub index_offset: u64,
}

impl CarV2Header {
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..16].copy_from_slice(&self.characteristics.to_le_bytes());
        buf[16..24].copy_from_slice(&self.data_offset.to_le_bytes());
        buf[24..32].copy_from_slice(&self.data_size.to_le_bytes());
        buf[32..40].copy_from_slice(&self.index_offset.to_le_bytes());
        writer.write_all(&buf)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self, Error> {
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf)?;
        Ok(CarV2Header {
            characteristics: u128::from_le_bytes(buf[0..16].try_into().unwrap()),
            data_offset: u64::from_le_bytes(buf[16..24].try_into().unwrap()),
            data_size: u64::from_le_bytes(buf[24..32].try_into().unwrap()),
            index_offset: u64::from_le_bytes(buf[32..40].try_into().unwrap()),
        })
    }
}
