mod args;
mod http;
mod logging;

use std::sync::Arc;

use clap::Parser;
use eyre::{ensure, eyre, Result};
use sha3::{Digest, Keccak256};
use tracing::{info, warn};

use banyan_config::Config;
use banyan_core_safety::Algorithm;
use banyan_core_types::{
    Election, NodeId, PrivateKey, RoundRobin, Validator, ValidatorSet,
};
use banyan_engine::{sim_network, Replica, TcpTransport, Transport};

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _guard = logging::init(&args.log_level);

    let config = load_config(&args)?;

    if args.sim {
        run_simulation(args.algorithm, config).await
    } else {
        let id = args
            .id
            .ok_or_else(|| eyre!("--id is required unless --sim is given"))?;

        run_replica(args.algorithm, config, NodeId::new(id)).await
    }
}

fn load_config(args: &Args) -> Result<Config> {
    if !args.config.exists() && args.sim {
        info!("no configuration file found, using the default simulation setup");
        return Ok(Config::simulation(4, 1, 1));
    }

    Config::load(&args.config)
        .map_err(|e| eyre!("failed to load {}: {e}", args.config.display()))
}

/// Derive a replica's signing key from its node id, so that every process
/// of an experiment computes the same keyring without a key exchange.
fn replica_key(id: NodeId) -> PrivateKey {
    let mut hasher = Keccak256::new();
    hasher.update(b"banyan-replica-seed");
    hasher.update(id.as_u32().to_be_bytes());

    let seed: [u8; 32] = hasher.finalize().into();
    PrivateKey::from(seed)
}

fn keyring(n: usize) -> ValidatorSet {
    ValidatorSet::new((1..=n as u32).map(|id| {
        let id = NodeId::new(id);
        Validator::new(id, replica_key(id).public_key())
    }))
}

async fn run_replica(algorithm: Algorithm, config: Config, id: NodeId) -> Result<()> {
    ensure!(
        (1..=config.n as u32).contains(&id.as_u32()),
        "node id {id} is outside 1..={}",
        config.n
    );

    info!(%id, %algorithm, n = config.n, "node starting");

    let validators = keyring(config.n);
    let election: Arc<dyn Election> = Arc::new(RoundRobin::new(config.n));

    let silence = config.is_byzantine(id);
    if silence {
        warn!(%id, strategy = %config.strategy, "replica is byzantine");
    }

    let transport: Arc<dyn Transport> = TcpTransport::bind(id, config.addrs(), silence).await?;

    let http_addr = config
        .http_addr(id)
        .ok_or_else(|| eyre!("no http address configured for node {id}"))?;

    let (replica, handle) = Replica::new(
        id,
        algorithm,
        &config,
        replica_key(id),
        validators,
        election,
        transport,
    );

    tokio::spawn(http::serve(http_addr, handle));
    tokio::spawn(replica.run());

    tokio::signal::ctrl_c().await?;
    info!(%id, "shutting down");
    Ok(())
}

async fn run_simulation(algorithm: Algorithm, config: Config) -> Result<()> {
    info!(%algorithm, n = config.n, "starting simulation");

    let validators = keyring(config.n);
    let election: Arc<dyn Election> = Arc::new(RoundRobin::new(config.n));

    let transports = sim_network((1..=config.n as u32).map(|i| {
        let id = NodeId::new(i);
        (id, config.is_byzantine(id))
    }));

    let mut handles = Vec::new();
    for (id, transport) in transports {
        if config.is_byzantine(id) {
            warn!(%id, strategy = %config.strategy, "replica is byzantine");
        }

        let transport: Arc<dyn Transport> = transport;

        let (replica, handle) = Replica::new(
            id,
            algorithm,
            &config,
            replica_key(id),
            validators.clone(),
            election.clone(),
            transport,
        );

        let http_addr = config
            .http_addr(id)
            .ok_or_else(|| eyre!("no http address configured for node {id}"))?;

        tokio::spawn(http::serve(http_addr, handle.clone()));
        tokio::spawn(replica.run());
        handles.push(handle);
    }

    // The first query is the start signal for block production.
    for handle in &handles {
        let _ = handle.query().await;
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
