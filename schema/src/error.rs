// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("schema {0} not found in registry")]
    NotFound(String),
    #[error("malformed schema body for {id}: {message}")]
    MalformedBody { id: String, message: String },
    #[error("validation failed at {path}: {message}")]
    Validation { path: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
