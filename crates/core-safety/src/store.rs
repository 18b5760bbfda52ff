use std::collections::{BTreeMap, BTreeSet};

use banyan_core_types::{Block, BlockId, Height};

/// The parent-linked block graph of a replica.
///
/// The graph grows monotonically: inserted blocks are never removed. A
/// secondary per-height index tracks the live tips, ie. blocks that have
/// not yet been committed past; committing sweeps that index and surfaces
/// the bypassed blocks as forked.
#[derive(Clone, Debug, Default)]
pub struct BlockStore {
    blocks: BTreeMap<BlockId, Block>,
    live: BTreeMap<Height, Vec<BlockId>>,
    committed_height: Height,
}

impl BlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given block is known.
    pub fn exists(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Look up a block by id.
    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// The height of the last committed block (0 before the first commit).
    pub fn committed_height(&self) -> Height {
        self.committed_height
    }

    /// Insert a block. Idempotent: re-inserting a known block is a no-op.
    pub fn insert(&mut self, block: Block) {
        if self.blocks.contains_key(&block.id) {
            return;
        }

        if block.height > self.committed_height {
            self.live.entry(block.height).or_default().push(block.id);
        }

        self.blocks.insert(block.id, block);
    }

    /// Commit the chain ending at `id`, which must extend the committed
    /// prefix.
    ///
    /// Returns the blocks that transition to committed, in ascending height
    /// order, and the live blocks at the swept heights that were bypassed
    /// and are now forked.
    pub fn commit(&mut self, id: &BlockId, height: Height) -> (Vec<Block>, Vec<Block>) {
        let mut chain = Vec::new();
        let mut cursor = *id;

        while let Some(block) = self.blocks.get(&cursor) {
            if block.height <= self.committed_height {
                break;
            }
            cursor = block.prev_id;
            chain.push(block.clone());
        }
        chain.reverse();

        let committed_ids: BTreeSet<BlockId> = chain.iter().map(|b| b.id).collect();

        let mut forked = Vec::new();
        let swept: Vec<Height> = self
            .live
            .range(..=height)
            .map(|(h, _)| *h)
            .collect();

        for h in swept {
            if let Some(ids) = self.live.remove(&h) {
                for bypassed in ids {
                    if committed_ids.contains(&bypassed) {
                        continue;
                    }
                    if let Some(block) = self.blocks.get(&bypassed) {
                        forked.push(block.clone());
                    }
                }
            }
        }

        self.committed_height = self.committed_height.max(height);

        (chain, forked)
    }
}
