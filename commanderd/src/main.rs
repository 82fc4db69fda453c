//! Commander dispatch daemon entry point.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use commander_commands::bus::{CommandLineBus, SystemBus};
use commander_commands::{
    EchoCommand, NotifyCommand, ServicesCommand, TemplateCommand, UpdateDnsmasqCommand,
    UpdateHostapdCommand,
};
use commanderd::config::Config;
use commanderd::http::{self, AppState};
use commanderd::registry::Registry;
use commanderd::socket;
use commanderd::status::StatusTracker;
use commanderd::watchdog::{self, Notifier};

#[derive(Parser, Debug)]
#[command(name = "commanderd", version)]
#[command(about = "Command dispatch daemon serving a JSON API over a Unix socket")]
struct Cli {
    /// Socket path to bind (overrides the config file)
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Bind the socket path directly, ignoring any service-manager handover,
    /// and raise the default log level
    #[arg(long)]
    debug: bool,

    /// Path to the daemon configuration file (commanderd.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("COMMANDERD_CONFIG").ok().map(PathBuf::from))
        .or_else(|| {
            let candidate = std::env::current_dir().ok()?.join("commanderd.toml");
            candidate.is_file().then_some(candidate)
        });
    let config = Config::load(config_path.as_deref())?;
    let socket_path = cli.socket.clone().unwrap_or_else(|| config.socket.clone());

    info!("commanderd {} initialising", env!("CARGO_PKG_VERSION"));

    let bus: Arc<dyn SystemBus> = Arc::new(CommandLineBus);

    let mut registry = Registry::new();
    registry
        .install(EchoCommand)
        .await
        .context("installing commands")?;
    registry
        .install(NotifyCommand::new(bus.clone(), config.notify_timeout_ms))
        .await
        .context("installing commands")?;
    registry
        .install(ServicesCommand::new(bus.clone()))
        .await
        .context("installing commands")?;
    registry
        .install(TemplateCommand::new(config.template.clone()))
        .await
        .context("installing commands")?;
    registry
        .install(UpdateDnsmasqCommand::new(
            config.dnsmasq.target.clone(),
            config.dnsmasq.unit.clone(),
            bus.clone(),
        ))
        .await
        .context("installing commands")?;
    registry
        .install(UpdateHostapdCommand::new(
            config.hostapd.target.clone(),
            config.hostapd.unit.clone(),
            bus.clone(),
        ))
        .await
        .context("installing commands")?;
    info!(commands = registry.len(), "command registry initialised");

    let (listener, owned_path) = socket::acquire(cli.debug, &socket_path)?.into_parts();

    let state = AppState {
        registry: Arc::new(registry),
        status: Arc::new(StatusTracker::new()),
    };

    let notifier = Notifier::from_env();
    let watchdog = notifier
        .clone()
        .and_then(|notifier| watchdog::watchdog_interval().map(|interval| (notifier, interval)));

    let router = http::router(
        state,
        watchdog.as_ref().map(|(notifier, _)| notifier.clone()),
    );

    if let Some((notifier, interval)) = watchdog {
        info!(interval_ms = interval.as_millis() as u64, "watchdog enabled");
        watchdog::spawn_keep_alive(notifier, interval);
    }
    if let Some(notifier) = &notifier {
        notifier.ready();
    }

    spawn_signal_handlers(owned_path, notifier);

    info!("commanderd is now listening for requests");
    http::serve(listener, router).await
}

fn spawn_signal_handlers(owned_path: Option<PathBuf>, notifier: Option<Notifier>) {
    {
        let owned_path = owned_path.clone();
        let notifier = notifier.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("received Ctrl+C; shutting down");
                shutdown(owned_path, notifier);
            }
        });
    }

    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!("failed to install SIGTERM handler: {err}");
            return;
        }
    };
    tokio::spawn(async move {
        if sigterm.recv().await.is_some() {
            info!("received SIGTERM; shutting down");
            shutdown(owned_path, notifier);
        }
    });
}

fn shutdown(owned_path: Option<PathBuf>, notifier: Option<Notifier>) {
    if let Some(notifier) = notifier {
        notifier.stopping();
    }
    if let Some(path) = owned_path {
        let _ = std::fs::remove_file(path);
    }
    std::process::exit(0);
}
