// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use dagcid::Codec;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no node codec registered for {0:?}")]
    UnsupportedCodec(Codec),
    #[error("failed to decode node: {0}")]
    DecodeError(String),
    #[error("failed to encode node: {0}")]
    EncodeError(String),
    #[error(transparent)]
    BlockStore(#[from] blockstore::Error),
    #[error(transparent)]
    Cid(#[from] dagcid::Error),
    #[error(transparent)]
    Ipld(#[from] dagipld::Error),
}

impl From<Error> for dagipld::Error {
    fn from(e: Error) -> Self {
        dagipld::Error::Link(e.to_string())
    }
}
