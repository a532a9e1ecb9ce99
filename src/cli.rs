use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "latencytrail",
    version,
    about = "Periodically probes HTTP endpoints and keeps latency and availability statistics"
)]
pub struct Cli {
    /// Run a single check and exit.
    #[arg(long)]
    pub once: bool,

    /// Path to the JSON configuration file.
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,
}
