use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use banyan_config::Config;
use banyan_core_safety::{Algorithm, Output, Safety};
use banyan_core_types::{
    Block, ConsensusMsg, Election, Height, NodeId, PrivateKey, Rank, ValidatorSet,
};

use crate::network::Transport;
use crate::pacemaker::Pacemaker;
use crate::stats::Stats;

const EVENT_QUEUE: usize = 100;

enum Event {
    Msg(ConsensusMsg),
    Propose { height: Height, rank: Rank },
    Query { reply: oneshot::Sender<String> },
}

/// A handle for querying a running replica's status.
///
/// Queries travel through the replica's event channel, so the reply is
/// consistent with the event loop's view of the world. A query also
/// counts as the replica's start signal.
#[derive(Clone)]
pub struct QueryHandle {
    events: mpsc::Sender<Event>,
}

impl QueryHandle {
    /// Request the replica's textual status report.
    pub async fn query(&self) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.events.send(Event::Query { reply }).await.ok()?;
        rx.await.ok()
    }
}

/// The replica driver.
///
/// Funnels inbound messages, local proposals, and queries through a single
/// event channel consumed by one task, so every safety-engine mutation is
/// serialized. The pacemaker loop and the measurement pump run as separate
/// tasks wired up by channels.
pub struct Replica {
    id: NodeId,
    safety: Safety,
    transport: Arc<dyn Transport>,
    election: Arc<dyn Election>,
    pacemaker: Arc<Pacemaker>,
    new_heights: mpsc::Receiver<Height>,
    events: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    stats: Arc<Mutex<Stats>>,
}

impl Replica {
    /// Create a replica and the query handle for its status endpoint.
    pub fn new(
        id: NodeId,
        algorithm: Algorithm,
        config: &Config,
        key: PrivateKey,
        validators: ValidatorSet,
        election: Arc<dyn Election>,
        transport: Arc<dyn Transport>,
    ) -> (Self, QueryHandle) {
        let safety = Safety::new(
            algorithm,
            id,
            key,
            validators,
            election.clone(),
            config.thresholds(),
            config.payload_size,
        );

        let (pacemaker, new_heights) = Pacemaker::new(config.timeout);
        let (events, event_rx) = mpsc::channel(EVENT_QUEUE);
        let stats = Arc::new(Mutex::new(Stats::new(
            id,
            config.payload_size,
            config.experiment_duration,
        )));

        let handle = QueryHandle {
            events: events.clone(),
        };

        let replica = Self {
            id,
            safety,
            transport,
            election,
            pacemaker: Arc::new(pacemaker),
            new_heights,
            events,
            event_rx,
            stats,
        };

        (replica, handle)
    }

    /// Run the replica until its transport shuts down.
    pub async fn run(self) {
        let Replica {
            id,
            mut safety,
            transport,
            election,
            pacemaker,
            new_heights,
            events,
            mut event_rx,
            stats,
        } = self;

        info!(%id, "replica starting");

        let (committed_tx, committed_rx) = mpsc::channel::<Block>(EVENT_QUEUE);
        let (forked_tx, forked_rx) = mpsc::channel::<Block>(EVENT_QUEUE);
        let (started, _) = watch::channel(false);

        // Inbound messages from the transport onto the event channel.
        let recv_transport = transport.clone();
        let recv_events = events.clone();
        tokio::spawn(async move {
            while let Some(msg) = recv_transport.recv().await {
                if recv_events.send(Event::Msg(msg)).await.is_err() {
                    return;
                }
            }
        });

        // Committed and forked blocks into the measurement bookkeeping.
        tokio::spawn(stats_pump(committed_rx, forked_rx, stats.clone()));

        // The pacemaker loop: propose on new heights, escalate on timeout.
        tokio::spawn(pacemaker_loop(
            pacemaker.clone(),
            new_heights,
            election,
            id,
            events,
            started.subscribe(),
        ));

        // The single consumer of the event channel; all safety-engine
        // mutations happen here.
        while let Some(event) = event_rx.recv().await {
            if !*started.borrow() {
                debug!(%id, "replica booting");
                let _ = started.send(true);
            }

            match event {
                Event::Msg(ConsensusMsg::Block(block)) => {
                    debug!(
                        %id,
                        proposer = %block.proposer,
                        height = %block.height,
                        block_id = %block.id,
                        "received block"
                    );

                    match safety.process_block(block) {
                        Ok(outputs) => {
                            dispatch(outputs, &transport, &pacemaker, &committed_tx, &forked_tx)
                                .await
                        }
                        Err(e) => warn!(%id, "dropping block: {e}"),
                    }
                }

                Event::Msg(ConsensusMsg::Notarization(share)) => {
                    let outputs = safety.process_notarization_share(share);
                    dispatch(outputs, &transport, &pacemaker, &committed_tx, &forked_tx).await;
                }

                Event::Msg(ConsensusMsg::Finalization(share)) => {
                    let outputs = safety.process_finalization_share(share);
                    dispatch(outputs, &transport, &pacemaker, &committed_tx, &forked_tx).await;
                }

                Event::Propose { height, rank } => {
                    let block = safety.make_proposal(height, rank);
                    debug!(%id, %height, %rank, block_id = %block.id, "proposing block");

                    transport.broadcast(ConsensusMsg::Block(block.clone())).await;

                    match safety.process_block(block) {
                        Ok(outputs) => {
                            dispatch(outputs, &transport, &pacemaker, &committed_tx, &forked_tx)
                                .await
                        }
                        Err(e) => warn!(%id, "dropping own proposal: {e}"),
                    }
                }

                Event::Query { reply } => {
                    let report = stats.lock().expect("stats mutex poisoned").report();
                    let _ = reply.send(report);
                }
            }
        }
    }
}

/// Act on the outputs of a safety-engine step, in order.
async fn dispatch(
    outputs: Vec<Output>,
    transport: &Arc<dyn Transport>,
    pacemaker: &Pacemaker,
    committed_tx: &mpsc::Sender<Block>,
    forked_tx: &mpsc::Sender<Block>,
) {
    for output in outputs {
        match output {
            Output::Broadcast(msg) => transport.broadcast(msg).await,
            Output::Committed(block) => {
                let _ = committed_tx.send(block).await;
            }
            Output::Forked(block) => {
                let _ = forked_tx.send(block).await;
            }
            Output::OpenHeight(height) => pacemaker.height_increased(height),
        }
    }
}

async fn stats_pump(
    mut committed_rx: mpsc::Receiver<Block>,
    mut forked_rx: mpsc::Receiver<Block>,
    stats: Arc<Mutex<Stats>>,
) {
    loop {
        tokio::select! {
            block = committed_rx.recv() => {
                let Some(block) = block else { return };
                stats.lock().expect("stats mutex poisoned").record_committed(&block);
            }
            block = forked_rx.recv() => {
                let Some(block) = block else { return };
                stats.lock().expect("stats mutex poisoned").record_forked(&block);
            }
        }
    }
}

/// Wait on either a new-height signal (reset the rank and the timer) or
/// the rank timer (escalate the rank), proposing whenever this replica
/// leads the resulting `(height, rank)` slot. The first slot is height 1,
/// rank 0, and nothing is proposed before the start signal.
async fn pacemaker_loop(
    pacemaker: Arc<Pacemaker>,
    mut new_heights: mpsc::Receiver<Height>,
    election: Arc<dyn Election>,
    id: NodeId,
    events: mpsc::Sender<Event>,
    mut started: watch::Receiver<bool>,
) {
    while !*started.borrow() {
        if started.changed().await.is_err() {
            return;
        }
    }

    let mut height = Height::INITIAL;
    let mut rank = Rank::ZERO;

    propose_if_leader(election.as_ref(), id, height, rank, &events).await;
    let mut last_height_time = Instant::now();

    loop {
        tokio::select! {
            new_height = new_heights.recv() => {
                let Some(new_height) = new_height else { return };

                height = new_height;
                rank = Rank::ZERO;
                propose_if_leader(election.as_ref(), id, height, rank, &events).await;

                let lasted = last_height_time.elapsed();
                last_height_time = Instant::now();
                debug!(%id, %height, lasted_ms = lasted.as_millis() as u64, "height advanced");
            }

            _ = tokio::time::sleep(pacemaker.timeout_duration()) => {
                rank = rank.increment();
                debug!(%id, %height, %rank, "rank timer fired");
                propose_if_leader(election.as_ref(), id, height, rank, &events).await;
            }
        }
    }
}

async fn propose_if_leader(
    election: &dyn Election,
    id: NodeId,
    height: Height,
    rank: Rank,
    events: &mpsc::Sender<Event>,
) {
    if !election.is_leader(id, height, rank) {
        return;
    }

    let _ = events.send(Event::Propose { height, rank }).await;
}
