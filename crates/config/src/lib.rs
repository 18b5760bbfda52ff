//! Node configuration for the banyan consensus engine.
//!
//! Configuration is loaded once at startup and handed to each subsystem as
//! an immutable value; there is no process-wide configuration singleton.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![warn(missing_docs, rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

use core::fmt;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use banyan_core_types::{NodeId, ThresholdParams};

/// Errors that can occur while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration is internally inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The byzantine behavior injected into the configured byzantine replicas.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Byzantine replicas drop every outbound message.
    #[default]
    Silence,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Silence => write!(f, "silence"),
        }
    }
}

/// The network addresses of a single replica.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    /// The replica's node id.
    pub id: u32,

    /// The address the replica's transport listens on.
    pub addr: SocketAddr,

    /// The address the replica's HTTP status endpoint listens on.
    pub http_addr: SocketAddr,
}

/// The complete configuration of a replica group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Total number of replicas.
    pub n: usize,

    /// Maximum tolerated byzantine replicas; enters the notarization
    /// threshold.
    pub f: usize,

    /// Fast-path parameter; the fast-path quorum is `n - p`.
    pub p: usize,

    /// How many replicas actually run the byzantine strategy. The highest
    /// `byzantine` node ids are byzantine.
    #[serde(default)]
    pub byzantine: usize,

    /// Bytes of random filler per block.
    pub payload_size: usize,

    /// The rank-escalation timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// The measurement window; not part of safety.
    #[serde(with = "humantime_serde")]
    pub experiment_duration: Duration,

    /// The behavior injected into byzantine replicas.
    #[serde(default)]
    pub strategy: Strategy,

    /// The network addresses of every replica.
    pub peers: Vec<PeerConfig>,
}

impl Config {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Generate a localhost configuration for simulation mode.
    pub fn simulation(n: usize, f: usize, p: usize) -> Self {
        let peers = (1..=n as u32)
            .map(|id| PeerConfig {
                id,
                addr: ([127, 0, 0, 1], 7000 + id as u16).into(),
                http_addr: ([127, 0, 0, 1], 8000 + id as u16).into(),
            })
            .collect();

        Self {
            n,
            f,
            p,
            byzantine: 0,
            payload_size: 128,
            timeout: Duration::from_millis(500),
            experiment_duration: Duration::from_secs(60),
            strategy: Strategy::default(),
            peers,
        }
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), Error> {
        if self.n == 0 {
            return Err(Error::Invalid("n must be positive".to_string()));
        }

        if self.p >= self.n {
            return Err(Error::Invalid(format!(
                "fast-path parameter p ({}) must be smaller than n ({})",
                self.p, self.n
            )));
        }

        if self.byzantine > self.n {
            return Err(Error::Invalid(format!(
                "byzantine count ({}) exceeds n ({})",
                self.byzantine, self.n
            )));
        }

        let mut ids: Vec<u32> = self.peers.iter().map(|peer| peer.id).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.len() != self.n || ids != (1..=self.n as u32).collect::<Vec<_>>() {
            return Err(Error::Invalid(format!(
                "peers must cover node ids 1..={} exactly",
                self.n
            )));
        }

        Ok(())
    }

    /// The quorum thresholds derived from this configuration.
    pub fn thresholds(&self) -> ThresholdParams {
        ThresholdParams::new(self.n, self.f, self.p)
    }

    /// The transport address of the given replica.
    pub fn addr(&self, id: NodeId) -> Option<SocketAddr> {
        self.peers
            .iter()
            .find(|peer| peer.id == id.as_u32())
            .map(|peer| peer.addr)
    }

    /// The HTTP status address of the given replica.
    pub fn http_addr(&self, id: NodeId) -> Option<SocketAddr> {
        self.peers
            .iter()
            .find(|peer| peer.id == id.as_u32())
            .map(|peer| peer.http_addr)
    }

    /// The transport addresses of every replica, keyed by node id.
    pub fn addrs(&self) -> BTreeMap<NodeId, SocketAddr> {
        self.peers
            .iter()
            .map(|peer| (NodeId::new(peer.id), peer.addr))
            .collect()
    }

    /// Whether the given replica runs the byzantine strategy: the highest
    /// `byzantine` node ids do.
    pub fn is_byzantine(&self, id: NodeId) -> bool {
        id.as_u32() as usize > self.n - self.byzantine
    }
}
