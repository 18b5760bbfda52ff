use crate::{Height, NodeId, Rank};

/// Deterministic leader election over `(height, rank)` slots.
pub trait Election: Send + Sync {
    /// Whether `id` is the leader for the given slot.
    fn is_leader(&self, id: NodeId, height: Height, rank: Rank) -> bool;

    /// The leader for the given slot.
    fn leader_for(&self, height: Height, rank: Rank) -> NodeId;
}

/// The canonical rotation: `leader = ((height + rank - 1) mod n) + 1`.
#[derive(Copy, Clone, Debug)]
pub struct RoundRobin {
    peers: u64,
}

impl RoundRobin {
    /// Create a rotation over `peers` replicas.
    ///
    /// # Panics
    /// If `peers` is zero.
    pub fn new(peers: usize) -> Self {
        assert!(peers > 0);
        Self {
            peers: peers as u64,
        }
    }
}

impl Election for RoundRobin {
    fn is_leader(&self, id: NodeId, height: Height, rank: Rank) -> bool {
        let slot = height.as_u64().saturating_sub(1) + u64::from(rank.as_u32());
        slot % self.peers == id.index()
    }

    fn leader_for(&self, height: Height, rank: Rank) -> NodeId {
        let slot = height.as_u64().saturating_sub(1) + u64::from(rank.as_u32());
        NodeId::new((slot % self.peers) as u32 + 1)
    }
}

/// A fixed-leader election, every slot is led by the same replica.
#[derive(Copy, Clone, Debug)]
pub struct StaticLeader {
    leader: NodeId,
}

impl StaticLeader {
    /// Create an election that always elects `leader`.
    pub fn new(leader: NodeId) -> Self {
        Self { leader }
    }
}

impl Election for StaticLeader {
    fn is_leader(&self, id: NodeId, _height: Height, _rank: Rank) -> bool {
        id == self.leader
    }

    fn leader_for(&self, _height: Height, _rank: Rank) -> NodeId {
        self.leader
    }
}
