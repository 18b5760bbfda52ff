use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::{Duration, SystemTime};

use tracing::info;

use banyan_core_types::{Block, NodeId};

/// Measurement bookkeeping for one replica.
///
/// The measurement window opens when the block at height 3 commits and
/// closes after the configured experiment duration; commits outside the
/// window are not recorded. None of this is part of safety.
pub(crate) struct Stats {
    id: NodeId,
    payload_size: usize,
    experiment_duration: Duration,
    experiment_start: Option<SystemTime>,

    committed_blocks: usize,
    all_latency: BTreeMap<u64, Duration>,
    proposer_latency: BTreeMap<u64, Duration>,
    block_times: BTreeMap<u64, Duration>,
    last_propose_time: Option<SystemTime>,
}

impl Stats {
    pub fn new(id: NodeId, payload_size: usize, experiment_duration: Duration) -> Self {
        Self {
            id,
            payload_size,
            experiment_duration,
            experiment_start: None,
            committed_blocks: 0,
            all_latency: BTreeMap::new(),
            proposer_latency: BTreeMap::new(),
            block_times: BTreeMap::new(),
            last_propose_time: None,
        }
    }

    fn experiment_over(&self) -> bool {
        self.experiment_start
            .is_some_and(|start| start + self.experiment_duration < SystemTime::now())
    }

    pub fn record_committed(&mut self, block: &Block) {
        let height = block.height.as_u64();

        if height == 3 {
            self.experiment_start = Some(SystemTime::now());
        }

        if self.experiment_over() && height > 3 {
            return;
        }

        let propose_time = block.timestamp;

        if height > 1 {
            if let Some(last) = self.last_propose_time {
                if let Ok(block_time) = propose_time.duration_since(last) {
                    self.block_times.insert(height, block_time);
                }
            }
        }

        let latency = propose_time.elapsed().unwrap_or_default();
        self.all_latency.insert(height, latency);
        if block.proposer == self.id {
            self.proposer_latency.insert(height, latency);
        }

        self.committed_blocks += 1;
        self.last_propose_time = Some(propose_time);

        info!(height = %block.height, id = %block.id, "block committed");
    }

    pub fn record_forked(&mut self, block: &Block) {
        info!(
            height = %block.height,
            id = %block.id,
            payload_bytes = block.payload.len(),
            "block forked"
        );
    }

    /// The textual status reply: just the commit count while the
    /// measurement window is open, the full per-height tallies once it
    /// has closed.
    pub fn report(&self) -> String {
        if !self.experiment_over() {
            return format!("Committed blocks: {}.\n", self.committed_blocks);
        }

        let mut response = String::new();

        response.push_str("blockPayloadSize\n");
        let _ = writeln!(response, "{}", self.payload_size);

        response.push_str("committedBlocks\n");
        let _ = writeln!(response, "{}", self.committed_blocks);

        response.push_str("allBlockLatency\n");
        for latency in self.all_latency.range(3..).map(|(_, l)| l) {
            let _ = write!(response, "{},", latency.as_millis());
        }

        response.push_str("\nproposerLatency\n");
        for latency in self.proposer_latency.range(3..).map(|(_, l)| l) {
            let _ = write!(response, "{},", latency.as_millis());
        }

        response.push_str("\nblockTime\n");
        for block_time in self.block_times.range(3..).map(|(_, t)| t) {
            let _ = write!(response, "{},", block_time.as_millis());
        }
        response.push('\n');

        response
    }
}
