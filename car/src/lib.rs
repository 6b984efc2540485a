// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The CAR v2 container codec (`§4.7`, `§6`): pragma, fixed header, an
//! embedded CAR v1 data section, and an optional sorted index. Export drives
//! the selector walker over a live [`LinkSystem`](linksystem::LinkSystem)
//! and streams entries out in visitation order; import streams them back in,
//! verifying each block's identity before it is put.

mod entry;
mod error;
pub mod header;
pub mod index;
pub mod pragma;
mod reader;
mod v1header;
mod writer;

pub use error::Error;
pub use header::CarV2Header;
pub use index::{Index, IndexEntry};
pub use reader::import_car_v2;
pub use writer::export_car_v2;
