//! Wi-Fi access manager - interactive demo console
//!
//! Line-oriented console over a seeded simulated WLAN service. All logic
//! lives in the library; this binary only parses commands and prints
//! results.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wifi_access_manager::{
    AccessPoint, AuthRequest, WifiManager,
    backend::SimulatedBackend,
    config::{CliArgs, Settings},
    core::types::{
        AuthAlgorithm, BssType, CipherAlgorithm, NetworkDescriptor, Ssid,
    },
};

const HELP: &str = "commands: list | connect <n> [password [username [domain]]] | \
disconnect | status | profile <n> | remove <n> | info | quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wifi_access_manager=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from(CliArgs::parse());
    info!(?settings, "starting demo console");

    let backend = Arc::new(seed_backend(&settings).await);
    let manager = WifiManager::new(backend);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut listing: Vec<AccessPoint<SimulatedBackend>> = Vec::new();

    stdout.write_all(format!("{HELP}\n").as_bytes()).await?;
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        match command {
            "list" => {
                listing = manager.access_points().await?;
                for (index, ap) in listing.iter().enumerate() {
                    let line = format!(
                        "{index}: {} [{}%]{}{}{}\n",
                        ap.name(),
                        ap.signal_strength(),
                        if ap.is_secure() { " secured" } else { " open" },
                        if ap.has_profile().await { " saved" } else { "" },
                        if ap.is_connected().await {
                            " connected"
                        } else {
                            ""
                        },
                    );
                    stdout.write_all(line.as_bytes()).await?;
                }
            }
            "connect" => match select(&listing, &args) {
                Some(ap) => {
                    let mut request = AuthRequest::new(ap);
                    let mut remaining = args.iter().skip(1);
                    if let Some(password) = remaining.next() {
                        request.set_password(*password);
                    }
                    if let Some(username) = remaining.next() {
                        request.set_username(*username);
                    }
                    if let Some(domain) = remaining.next() {
                        request.set_domain(*domain);
                    }

                    if request.is_password_required() && !request.is_password_valid() {
                        stdout
                            .write_all(b"password missing or malformed for this network\n")
                            .await?;
                        continue;
                    }
                    let overwrite = args.len() > 1;
                    let connected = ap
                        .connect_with(&request, overwrite, settings.connect_timeout)
                        .await?;
                    let outcome = if connected { "connected\n" } else { "failed\n" };
                    stdout.write_all(outcome.as_bytes()).await?;
                }
                None => stdout.write_all(b"usage: connect <n> [password]\n").await?,
            },
            "disconnect" => {
                manager.disconnect_all().await?;
                stdout.write_all(b"disconnected\n").await?;
            }
            "status" => {
                let status = manager.connection_status().await?;
                stdout.write_all(format!("{status:?}\n").as_bytes()).await?;
            }
            "profile" => match select(&listing, &args) {
                Some(ap) => {
                    let xml = ap.profile_xml().await?.unwrap_or_default();
                    stdout.write_all(format!("{xml}\n").as_bytes()).await?;
                }
                None => stdout.write_all(b"usage: profile <n>\n").await?,
            },
            "remove" => match select(&listing, &args) {
                Some(ap) => {
                    ap.delete_profile().await;
                    stdout.write_all(b"profile removed\n").await?;
                }
                None => stdout.write_all(b"usage: remove <n>\n").await?,
            },
            "info" => {
                for interface in manager.interfaces().await? {
                    let line = format!("{}: {}\n", interface.id(), interface.description());
                    stdout.write_all(line.as_bytes()).await?;
                }
            }
            "quit" | "exit" => break,
            _ => stdout.write_all(format!("{HELP}\n").as_bytes()).await?,
        }
    }

    Ok(())
}

fn select<'a>(
    listing: &'a [AccessPoint<SimulatedBackend>],
    args: &[&str],
) -> Option<&'a AccessPoint<SimulatedBackend>> {
    let index: usize = args.first()?.parse().ok()?;
    listing.get(index)
}

/// Build a simulated service with a handful of representative networks.
async fn seed_backend(settings: &Settings) -> SimulatedBackend {
    let backend = SimulatedBackend::new();
    let interface = backend.add_interface("Simulated 802.11 adapter").await;

    backend
        .add_network(interface, network("HomeNet", CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk, 84))
        .await;
    backend
        .add_network(interface, network("CoffeeShop", CipherAlgorithm::None, AuthAlgorithm::Open, 61))
        .await;
    backend
        .add_network(interface, network("LegacyNet", CipherAlgorithm::Wep, AuthAlgorithm::Open, 37))
        .await;
    if settings.with_enterprise {
        backend
            .add_network(interface, network("CorpNet", CipherAlgorithm::Ccmp, AuthAlgorithm::Rsna, 72))
            .await;
    }

    backend
}

fn network(
    ssid: &str,
    cipher: CipherAlgorithm,
    auth: AuthAlgorithm,
    signal: u8,
) -> NetworkDescriptor {
    NetworkDescriptor {
        ssid: Ssid::from(ssid),
        bss_type: BssType::Infrastructure,
        security_enabled: cipher != CipherAlgorithm::None,
        auth,
        cipher,
        signal_quality: signal,
        connectable: true,
        not_connectable_reason: None,
        profile_name: None,
    }
}
