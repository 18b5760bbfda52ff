use std::collections::BTreeSet;

use banyan_core_types::BlockId;
use tracing::debug;

use crate::output::Output;
use crate::store::BlockStore;

/// Tracks the committed-prefix pointer and the set of finalized blocks
/// whose parent chain has not yet materialized.
#[derive(Clone, Debug)]
pub(crate) struct Shipper {
    last_shipped: BlockId,
    queue: BTreeSet<BlockId>,
}

impl Shipper {
    pub(crate) fn new() -> Self {
        Self {
            last_shipped: BlockId::genesis(),
            queue: BTreeSet::new(),
        }
    }

    pub(crate) fn is_queued(&self, id: &BlockId) -> bool {
        self.queue.contains(id)
    }

    /// Try to advance the committed prefix to the finalized block `id`.
    ///
    /// A block whose body or parent chain is missing is parked in the ship
    /// queue; every successful commit re-examines the queue. The retry is
    /// an explicit worklist loop: each pass either removes a queue entry
    /// (commit) or shrinks the worklist (park), so it terminates.
    pub(crate) fn try_ship(&mut self, store: &mut BlockStore, id: BlockId, out: &mut Vec<Output>) {
        let mut work = vec![id];

        while let Some(id) = work.pop() {
            let Some((prev_id, height)) = store.get(&id).map(|b| (b.prev_id, b.height)) else {
                self.queue.insert(id);
                continue;
            };

            if prev_id != self.last_shipped {
                self.queue.insert(id);
                continue;
            }

            let (committed, forked) = store.commit(&id, height);
            debug!(%height, committed = committed.len(), forked = forked.len(), "shipping");

            out.extend(committed.into_iter().map(Output::Committed));
            out.extend(forked.into_iter().map(Output::Forked));

            self.last_shipped = id;
            self.queue.remove(&id);
            work.extend(self.queue.iter().copied());
        }
    }
}
