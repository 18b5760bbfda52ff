use async_trait::async_trait;

use banyan_core_types::{ConsensusMsg, NodeId};

/// The point-to-point transport contract consumed by the replica driver.
///
/// Sends are best-effort: a silenced (byzantine) transport drops outbound
/// messages, and delivery failures are logged, not surfaced.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Enqueue a message for unicast delivery.
    async fn send(&self, to: NodeId, msg: ConsensusMsg);

    /// Send a message to every peer except self.
    async fn broadcast(&self, msg: ConsensusMsg);

    /// Receive one inbound message. Returns `None` once the transport has
    /// shut down.
    async fn recv(&self) -> Option<ConsensusMsg>;
}
