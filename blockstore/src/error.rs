// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use dagcid::Cid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no block for {0}")]
    NotFound(Cid),
    #[error("recomputed cid for put block does not match the declared cid {declared}")]
    IdentityMismatch { declared: Cid },
    #[error("filestore slice for {0} no longer hashes to the recorded cid")]
    FilestoreStale(Cid),
    #[error("filestore path escapes its root: {0}")]
    FilestorePathEscape(String),
    #[error(transparent)]
    Cid(#[from] dagcid::Error),
    #[error(transparent)]
    KvStore(#[from] kvstore::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ipld(#[from] dagipld::Error),
    #[error("{0}")]
    Codec(String),
}
