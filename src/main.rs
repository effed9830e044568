// MIT License - Copyright (c) 2026 Peter Wright
// Replay bridge

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};

use pima_force_bridge::constants::DOMAIN;
use pima_force_bridge::{
    ChannelListener, ConfigEntry, EntryOptions, EntryRegistry, EventSender, FanoutPublisher,
    JsonLinesPublisher, ListenerFactory, ListenerSettings, LogPublisher, MemoryRestoreStore,
    SiaEvent, SystemClock, zone_names,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "pima-force")]
#[command(about = "Track Pima Force zone states from decoded SIA ADM-CID events")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "pima-force.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the zone numbering of every configured panel
    Zones,
    /// Feed decoded events (one JSON object per line) through a panel
    Replay {
        /// Event file; reads stdin when omitted
        #[arg(long)]
        events: Option<PathBuf>,
        /// Listening port of the panel to feed (default: first configured panel)
        #[arg(long)]
        port: Option<u16>,
    },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default, rename = "panel")]
    panels: Vec<PanelToml>,
}

#[derive(Debug, Deserialize)]
struct PanelToml {
    #[serde(default)]
    entry_id: Option<String>,
    #[serde(flatten)]
    options: EntryOptions,
}

impl PanelToml {
    fn into_entry(self) -> ConfigEntry {
        let entry_id = self
            .entry_id
            .unwrap_or_else(|| format!("{DOMAIN}_{}", self.options.port));
        ConfigEntry::new(entry_id, self.options)
    }
}

fn load_config(path: &Path) -> Result<Vec<ConfigEntry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&text).context("Failed to parse config file")?;
    if config.panels.is_empty() {
        anyhow::bail!("No [[panel]] configured in {}", path.display());
    }
    Ok(config.panels.into_iter().map(PanelToml::into_entry).collect())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn print_zones(entries: &[ConfigEntry]) {
    for entry in entries {
        println!("{} ({})", entry.title, entry.entry_id);
        let presented = zone_names(&entry.options.zones);
        for number in (1u32..).take(entry.options.zones.len()) {
            match presented.get(&number) {
                Some(name) => println!("  zone {number}: {name}"),
                None => println!("  zone {number}: (unnamed, not presented)"),
            }
        }
    }
}

async fn replay<R: AsyncBufRead + Unpin>(
    input: R,
    events: EventSender,
) -> Result<usize> {
    let mut lines = input.lines();
    let mut sent = 0;
    let mut sigterm = signal(SignalKind::terminate())?;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read event stream")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, stopping replay...");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, stopping replay...");
                break;
            }
        };
        let Some(line) = line else {
            debug!("End of event stream");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<SiaEvent>(line) {
            Ok(event) => {
                events
                    .send(event)
                    .await
                    .context("SIA listener stopped accepting events")?;
                sent += 1;
            }
            Err(e) => warn!("Skipping malformed event line: {e}"),
        }
    }
    Ok(sent)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=pima_force_bridge=trace).
    // Default: info. Logs go to stderr so stdout stays a clean JSON stream.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    }

    let cli = Cli::parse();
    let entries = load_config(&cli.config)?;

    let (events_path, port) = match cli.command {
        Command::Zones => {
            print_zones(&entries);
            return Ok(());
        }
        Command::Replay { events, port } => (events, port),
    };

    let target = match port {
        Some(port) => entries
            .iter()
            .find(|entry| entry.options.port == port)
            .with_context(|| format!("No panel configured on port {port}"))?,
        None => &entries[0],
    }
    .entry_id
    .clone();

    // Each listener's sending half, by port, so the replay can reach it
    let senders: Arc<Mutex<HashMap<u16, EventSender>>> = Arc::default();
    let factory_senders = Arc::clone(&senders);
    let factory: ListenerFactory<ChannelListener> = Box::new(move |settings: &ListenerSettings| {
        let (listener, events) = ChannelListener::new(settings.clone());
        let mut senders = match factory_senders.lock() {
            Ok(senders) => senders,
            Err(poisoned) => poisoned.into_inner(),
        };
        senders.insert(settings.port, events);
        listener
    });

    let restore = Arc::new(MemoryRestoreStore::new());
    let publisher = FanoutPublisher::new()
        .with(Arc::new(LogPublisher))
        .with(Arc::new(JsonLinesPublisher::new(std::io::stdout())))
        .with(restore.clone());
    let mut registry =
        EntryRegistry::new(factory, restore, Arc::new(publisher), Arc::new(SystemClock));

    for entry in entries {
        registry.add(entry)?;
    }
    registry
        .setup(&target)
        .await
        .with_context(|| format!("Failed to set up {target}"))?;

    let port = registry.entry(&target)?.options.port;
    let events = {
        let senders = match senders.lock() {
            Ok(senders) => senders,
            Err(poisoned) => poisoned.into_inner(),
        };
        senders
            .get(&port)
            .cloned()
            .context("Listener was not created for the panel")?
    };

    let sent = match &events_path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            replay(BufReader::new(file), events).await
        }
        None => replay(BufReader::new(tokio::io::stdin()), events).await,
    };

    // Stop the listener even when the replay failed part way
    let stopped = registry.shutdown().await;
    let sent = sent?;
    stopped?;

    info!("Replayed {sent} event(s) into {target}");
    Ok(())
}
