// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The only error `prefetch` ever returns (`§4.6`): every individual
    /// `get` failure is swallowed, so this is purely the cancellation cause.
    #[error("prefetch cancelled")]
    Cancelled,
    #[error(transparent)]
    Ipld(#[from] dagipld::Error),
    #[error(transparent)]
    LinkSystem(#[from] linksystem::Error),
}
