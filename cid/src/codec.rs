// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;

/// Multicodec codes used by the store. Values match the multicodec table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Identity / raw bytes, no structure.
    Raw,
    /// Canonical dag-cbor encoding of an [`crate::Ipld`]-shaped node.
    DagCbor,
    /// dag-pb, kept only for UnixFS interop (`§4.4`).
    DagPb,
}

impl Codec {
    pub const RAW: u64 = 0x55;
    pub const DAG_CBOR: u64 = 0x71;
    pub const DAG_PB: u64 = 0x70;

    pub fn code(self) -> u64 {
        match self {
            Codec::Raw => Self::RAW,
            Codec::DagCbor => Self::DAG_CBOR,
            Codec::DagPb => Self::DAG_PB,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, Error> {
        match code {
            Self::RAW => Ok(Codec::Raw),
            Self::DAG_CBOR => Ok(Codec::DagCbor),
            Self::DAG_PB => Ok(Codec::DagPb),
            other => Err(Error::UnsupportedCodec(other)),
        }
    }
}

impl From<Codec> for u64 {
    fn from(c: Codec) -> u64 {
        c.code()
    }
}
