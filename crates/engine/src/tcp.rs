use std::collections::BTreeMap;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use banyan_core_types::{ConsensusMsg, NodeId};

use crate::network::Transport;

/// Upper bound on a single wire frame.
const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Dial retry policy for peers that are still starting up.
const DIAL_ATTEMPTS: u32 = 100;
const DIAL_BACKOFF: Duration = Duration::from_millis(50);

/// Per-peer outbound queue depth.
const OUTBOUND_QUEUE: usize = 1024;

/// A length-prefixed JSON transport over TCP.
///
/// Each peer connection is dialed lazily on first send and owned by a
/// writer task; inbound connections are accepted by a listener task that
/// funnels decoded messages into a single queue.
pub struct TcpTransport {
    id: NodeId,
    silence: bool,
    addrs: BTreeMap<NodeId, SocketAddr>,
    outbound: Mutex<BTreeMap<NodeId, mpsc::Sender<ConsensusMsg>>>,
    inbound: tokio::sync::Mutex<mpsc::Receiver<ConsensusMsg>>,
}

impl TcpTransport {
    /// Bind the local listener and start accepting peer connections.
    ///
    /// `silence` marks a byzantine replica whose outbound messages are all
    /// dropped.
    pub async fn bind(
        id: NodeId,
        addrs: BTreeMap<NodeId, SocketAddr>,
        silence: bool,
    ) -> io::Result<Arc<Self>> {
        let local = addrs
            .get(&id)
            .copied()
            .ok_or_else(|| io::Error::other(format!("no address configured for node {id}")))?;

        let listener = TcpListener::bind(local).await?;
        debug!(%id, %local, "transport listening");

        let (inbound_tx, inbound_rx) = mpsc::channel(OUTBOUND_QUEUE);

        tokio::spawn(accept_loop(listener, inbound_tx));

        Ok(Arc::new(Self {
            id,
            silence,
            addrs,
            outbound: Mutex::new(BTreeMap::new()),
            inbound: tokio::sync::Mutex::new(inbound_rx),
        }))
    }

    fn outbound_queue(&self, to: NodeId) -> Option<mpsc::Sender<ConsensusMsg>> {
        let mut outbound = self.outbound.lock().expect("transport mutex poisoned");

        if let Some(queue) = outbound.get(&to) {
            return Some(queue.clone());
        }

        let Some(addr) = self.addrs.get(&to).copied() else {
            error!(%to, "no address configured for peer");
            return None;
        };

        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
        outbound.insert(to, tx.clone());
        tokio::spawn(writer_loop(to, addr, rx));

        Some(tx)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, to: NodeId, msg: ConsensusMsg) {
        if self.silence {
            return;
        }

        let Some(queue) = self.outbound_queue(to) else {
            return;
        };

        if queue.send(msg).await.is_err() {
            warn!(%to, "outbound queue closed, dropping message");
        }
    }

    async fn broadcast(&self, msg: ConsensusMsg) {
        for id in self.addrs.keys().copied() {
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

async fn accept_loop(listener: TcpListener, inbound: mpsc::Sender<ConsensusMsg>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted peer connection");
                tokio::spawn(reader_loop(stream, inbound.clone()));
            }
            Err(e) => {
                error!("accept failed: {e}");
                break;
            }
        }
    }
}

async fn reader_loop(mut stream: TcpStream, inbound: mpsc::Sender<ConsensusMsg>) {
    loop {
        match read_frame(&mut stream).await {
            Ok(msg) => {
                if inbound.send(msg).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    warn!("peer connection failed: {e}");
                }
                return;
            }
        }
    }
}

async fn writer_loop(to: NodeId, addr: SocketAddr, mut outbound: mpsc::Receiver<ConsensusMsg>) {
    let mut stream = match dial_with_retry(addr).await {
        Ok(stream) => stream,
        Err(e) => {
            error!(%to, %addr, "failed to dial peer: {e}");
            return;
        }
    };

    while let Some(msg) = outbound.recv().await {
        if let Err(e) = write_frame(&mut stream, &msg).await {
            error!(%to, "failed to send message: {e}");
            return;
        }
    }
}

async fn dial_with_retry(addr: SocketAddr) -> io::Result<TcpStream> {
    let mut last_err = None;

    for _ in 0..DIAL_ATTEMPTS {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                last_err = Some(e);
                tokio::time::sleep(DIAL_BACKOFF).await;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("dial failed")))
}

async fn read_frame(stream: &mut TcpStream) -> io::Result<ConsensusMsg> {
    let len = stream.read_u32().await? as usize;
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::other(format!("frame of {len} bytes exceeds limit")));
    }

    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;

    serde_json::from_slice(&buf).map_err(io::Error::other)
}

async fn write_frame(stream: &mut TcpStream, msg: &ConsensusMsg) -> io::Result<()> {
    let bytes = serde_json::to_vec(msg).map_err(io::Error::other)?;

    stream.write_u32(bytes.len() as u32).await?;
    stream.write_all(&bytes).await?;
    stream.flush().await
}
