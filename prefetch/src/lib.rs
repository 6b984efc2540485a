// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Subgraph enumeration and prefetch (`§4.6`): compute the ordered CID list
//! a selector would visit from a root, then warm the block store for that
//! set across a bounded pool of worker tasks. Grounded on the teacher's
//! worker-pool shape in `forest/src/paramfetch/mod.rs` (spawn one task per
//! worker, join all of them at the end), adapted from a parameter-download
//! pool into a producer/consumer queue feeding `BlockStore::get`.

mod error;
mod token;

pub use error::Error;
pub use token::CancellationToken;

use dagcid::Cid;
use dagipld::selector::{walk_all, Selector};
use kvstore::KvStore;
use linksystem::LinkSystem;
use std::sync::Arc;

pub const DEFAULT_WORKERS: usize = 8;

/// Runs `selector` from `root` and returns every block it visits, in
/// visitation order, root first. Duplicates are preserved (`§4.5`).
pub fn subgraph<K: KvStore>(
    link_system: &LinkSystem<K>,
    root: Cid,
    selector: &Selector,
) -> Result<Vec<Cid>, Error> {
    let root_node = link_system.load(&root)?;
    let cids =
        async_std::task::block_on(walk_all(link_system, Some(root), &root_node, selector))?;
    Ok(cids)
}

/// Warms the block store for every block `selector` visits from `root`,
/// across `workers` worker tasks reading from a queue of capacity
/// `2 * workers`. Individual `get` failures are swallowed — only
/// cancellation is ever reported back to the caller.
pub fn prefetch<K: KvStore + 'static>(
    link_system: Arc<LinkSystem<K>>,
    root: Cid,
    selector: &Selector,
    workers: usize,
    token: &CancellationToken,
) -> Result<(), Error> {
    let cids = subgraph(&link_system, root, selector)?;
    tracing::debug!(block_count = cids.len(), workers, "starting prefetch");
    async_std::task::block_on(run_workers(link_system, cids, workers, token))
}

async fn run_workers<K: KvStore + 'static>(
    link_system: Arc<LinkSystem<K>>,
    cids: Vec<Cid>,
    workers: usize,
    token: &CancellationToken,
) -> Result<(), Error> {
    let workers = workers.max(1);
    let (tx, rx) = async_std::channel::bounded::<Cid>(2 * workers);

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let rx = rx.clone();
        let ls = link_system.clone();
        let token = token.clone();
        handles.push(async_std::task::spawn(async move {
            while let Ok(cid) = rx.recv().await {
                if token.is_cancelled() {
                    continue;
                }
                if ls.blockstore().get(&cid).is_err() {
                    tracing::trace!(%cid, "prefetch get failed, ignoring");
                } else {
                    tracing::trace!(%cid, "prefetched block");
                }
            }
        }));
    }
    drop(rx);

    for cid in cids {
        if token.is_cancelled() {
            break;
        }
        if tx.send(cid).await.is_err() {
            break;
        }
    }
    drop(tx);

    for handle in handles {
        handle.await;
    }

    if token.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
