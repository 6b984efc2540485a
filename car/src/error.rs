// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use dagcid::Cid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not a CAR v2 file: bad pragma")]
    BadPragma,
    #[error("unsupported CAR version (only v2 is supported)")]
    UnsupportedVersion,
    #[error("malformed CAR v2 header: {0}")]
    MalformedHeader(String),
    #[error("malformed CAR v1 data-section header: {0}")]
    MalformedV1Header(String),
    #[error("CAR v1 data section must declare version 1, got {0}")]
    WrongEmbeddedVersion(u64),
    #[error("malformed CAR entry: {0}")]
    MalformedEntry(String),
    #[error("block {0} failed identity verification on import")]
    IdentityMismatch(Cid),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ipld(#[from] dagipld::Error),
    #[error(transparent)]
    Cid(#[from] dagcid::Error),
    #[error(transparent)]
    LinkSystem(#[from] linksystem::Error),
    #[error(transparent)]
    BlockStore(#[from] blockstore::Error),
}
