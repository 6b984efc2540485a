// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed dag-pb node: {0}")]
    MalformedPb(String),
    #[error("unsupported unixfs data type: {0}")]
    UnsupportedDataType(u64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    LinkSystem(#[from] linksystem::Error),
    #[error(transparent)]
    BlockStore(#[from] blockstore::Error),
    #[error(transparent)]
    Chunker(#[from] chunker::Error),
    #[error(transparent)]
    Cid(#[from] dagcid::Error),
}
