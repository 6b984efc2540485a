// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Cbor utility functions for plain serializable objects (selector and
/// schema definitions, mostly), mirroring the teacher's `forest_encoding::Cbor`
/// trait. These do not carry `Ipld::Link`, so plain `serde_cbor` is enough;
/// `Ipld` values themselves go through [`crate::dagcbor`] instead, which knows
/// how to tag links per the dag-cbor CID convention.
pub trait Cbor: Serialize + DeserializeOwned {
    fn marshal_cbor(&self) -> Result<Vec<u8>, Error> {
        serde_cbor::to_vec(self).map_err(|e| Error::Encode(e.to_string()))
    }

    fn unmarshal_cbor(bz: &[u8]) -> Result<Self, Error> {
        serde_cbor::from_slice(bz).map_err(|e| Error::Decode(e.to_string()))
    }
}

impl<T> Cbor for Vec<T> where T: Cbor {}
impl<T> Cbor for Option<T> where T: Cbor {}

pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    serde_cbor::to_vec(value).map_err(|e| Error::Encode(e.to_string()))
}

pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    serde_cbor::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))
}
