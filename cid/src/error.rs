// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported codec: 0x{0:x}")]
    UnsupportedCodec(u64),
    #[error("unsupported hash function: 0x{0:x}")]
    UnsupportedHash(u64),
    #[error("invalid cid bytes: {0}")]
    InvalidCid(#[from] cid::Error),
}
