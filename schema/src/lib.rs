// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The schema registry: optional structural validation layered on top of
//! raw nodes (`§4.8`). Schemas are loaded from YAML files, compiled lazily
//! into an executable type system, and cached.

mod definition;
mod error;
mod kind;
mod registry;

pub use definition::LexiconDefinition;
pub use error::Error;
pub use kind::{Kind, FieldKind};
pub use registry::Registry;
