use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use banyan_core_types::{ConsensusMsg, NodeId};

use crate::network::Transport;

const QUEUE_DEPTH: usize = 1024;

/// An in-process transport for simulation mode.
///
/// All replicas of a simulated group share a fully-connected mesh of
/// bounded channels; a silenced transport drops its outbound messages.
pub struct ChannelTransport {
    id: NodeId,
    silence: bool,
    peers: BTreeMap<NodeId, mpsc::Sender<ConsensusMsg>>,
    inbound: tokio::sync::Mutex<mpsc::Receiver<ConsensusMsg>>,
}

/// Build a fully-connected in-memory network for the given replicas.
///
/// Each entry is `(id, silence)`; the silence flag marks a byzantine
/// replica that drops all outbound messages.
pub fn sim_network(
    replicas: impl IntoIterator<Item = (NodeId, bool)>,
) -> BTreeMap<NodeId, Arc<ChannelTransport>> {
    let replicas: Vec<_> = replicas.into_iter().collect();

    let mut senders = BTreeMap::new();
    let mut receivers = BTreeMap::new();

    for (id, _) in &replicas {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        senders.insert(*id, tx);
        receivers.insert(*id, rx);
    }

    replicas
        .into_iter()
        .map(|(id, silence)| {
            let inbound = receivers.remove(&id).expect("receiver exists for id");

            let transport = ChannelTransport {
                id,
                silence,
                peers: senders.clone(),
                inbound: tokio::sync::Mutex::new(inbound),
            };

            (id, Arc::new(transport))
        })
        .collect()
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, to: NodeId, msg: ConsensusMsg) {
        if self.silence {
            return;
        }

        if let Some(peer) = self.peers.get(&to) {
            let _ = peer.send(msg).await;
        }
    }

    async fn broadcast(&self, msg: ConsensusMsg) {
        for id in self.peers.keys().copied() {
            if id == self.id {
                continue;
            }
            self.send(id, msg.clone()).await;
        }
    }

    async fn recv(&self) -> Option<ConsensusMsg> {
        self.inbound.lock().await.recv().await
    }
}
