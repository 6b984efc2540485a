// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Ipld error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode: {0}")]
    Decode(String),
    #[error("failed to encode: {0}")]
    Encode(String),
    #[error("failed to traverse link: {0}")]
    Link(String),
    #[error("{0}")]
    Custom(String),
    #[error("selector compile error: {0}")]
    SelectorCompile(String),
}

impl From<serde_cbor::Error> for Error {
    fn from(e: serde_cbor::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
