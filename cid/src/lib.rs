// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Content identifiers, multihash codes and link prototypes.
//!
//! This crate is deliberately thin: it re-exports the real `cid` crate's
//! [`Cid`] type and layers the store's closed set of supported codecs and
//! hash functions on top, per the "Global codec/hash registries" design
//! note — callers pass an explicit [`LinkPrototype`] rather than relying on
//! a process-wide table.

mod codec;
mod error;
mod hash;
mod prototype;

pub use cid::Cid;
pub use codec::Codec;
pub use error::Error;
pub use hash::HashAlgorithm;
pub use prototype::{codec_and_hash_of, recompute_cid, LinkPrototype};
