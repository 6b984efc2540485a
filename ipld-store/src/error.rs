// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use dagcid::Cid;
use thiserror::Error;

/// The facade's error type: every sub-crate's error wrapped by `#[from]`,
/// plus the `§7` taxonomy kinds that don't already belong to one
/// (`TraversalAborted`, `SchemaValidationFailed` restated at this layer for
/// callers that only ever see `ipld_store::Error`).
#[derive(Debug, Error)]
pub enum Error {
    #[error("traversal aborted: {0}")]
    TraversalAborted(String),
    #[error("schema validation failed at {path}: {message}")]
    SchemaValidationFailed { path: String, message: String },
    #[error("{0} is a directory, not a file")]
    NotADirectory(Cid),
    #[error(transparent)]
    Ipld(#[from] dagipld::Error),
    #[error(transparent)]
    Cid(#[from] dagcid::Error),
    #[error(transparent)]
    BlockStore(#[from] blockstore::Error),
    #[error(transparent)]
    LinkSystem(#[from] linksystem::Error),
    #[error(transparent)]
    Chunker(#[from] chunker::Error),
    #[error(transparent)]
    Unixfs(#[from] unixfs::Error),
    #[error(transparent)]
    Car(#[from] car::Error),
    #[error(transparent)]
    Prefetch(#[from] prefetch::Error),
    #[error(transparent)]
    Schema(#[from] schema::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
