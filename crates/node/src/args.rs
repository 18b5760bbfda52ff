use std::path::PathBuf;

use clap::Parser;

use banyan_core_safety::Algorithm;

/// A banyan consensus replica.
#[derive(Parser, Debug)]
#[command(name = "banyan", version, about)]
pub struct Args {
    /// BFT consensus algorithm to run
    #[arg(long, default_value_t = Algorithm::Banyan)]
    pub algorithm: Algorithm,

    /// Node id of this replica; required unless --sim is given
    #[arg(long)]
    pub id: Option<u32>,

    /// Run every replica of the group in this process over an in-memory
    /// transport
    #[arg(long)]
    pub sim: bool,

    /// Path to the TOML configuration file
    #[arg(long, default_value = "banyan.toml")]
    pub config: PathBuf,

    /// Log level (overridden by RUST_LOG), e.g. "info" or "banyan=debug"
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
