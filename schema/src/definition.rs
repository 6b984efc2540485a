// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The on-disk shape of one schema file (`§4.8`, `§6`): top-level
//! `id, version, name, description, status, schema`. `schema` is kept as
//! raw YAML until something actually validates against it — compilation
//! into a [`Kind`](crate::kind::Kind) tree happens lazily in the registry.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconDefinition {
    pub id: String,
    pub version: u64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub schema: serde_yaml::Value,
}
