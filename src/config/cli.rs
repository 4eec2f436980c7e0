//! Command-line argument parsing

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(name = "wifi-access-manager", version)]
#[clap(about = "Interactive console for the Wi-Fi access manager, backed by a simulated WLAN service")]
pub struct CliArgs {
    /// Budget for a synchronous connect attempt, in milliseconds
    #[clap(long, default_value = "6000")]
    pub connect_timeout_ms: u64,

    /// Seed the simulated service with an enterprise network as well
    #[clap(long)]
    pub with_enterprise: bool,
}
