use banyan_core_types::{BlockId, Rank};

/// Per-height voting scratch of a replica.
///
/// Entries are created on first encounter of a height and kept for the
/// lifetime of the engine (bounded experiment duration).
#[derive(Clone, Debug, Default)]
pub(crate) struct HeightScratch {
    /// How many notarization shares have been emitted at this height.
    pub shares_sent: u32,

    /// The minimum block rank a notarization share was emitted for.
    pub min_rank_sent: Option<Rank>,

    /// The block some notarization share was emitted for at this height.
    pub last_share_id: Option<BlockId>,

    /// Whether a finalization share has been emitted at this height.
    pub finalization_sent: bool,
}
