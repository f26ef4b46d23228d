use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tvlink_gateway::{Command as TvCommand, Config, Dispatcher, MdnsScanner, Session};

/// TVLink - Command dispatch gateway for smart TVs
#[derive(Parser)]
#[command(name = "tvlink", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "TVLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Port for the control API
    #[arg(long, env = "TVLINK_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the gateway with the control API (the default)
    Run,
    /// Send a single command to a device and print the outcome
    Send {
        /// Device id or name
        #[arg(short, long)]
        device: String,
        /// Logical command name (e.g. "up", "play_pause", "launch_app")
        command: String,
        /// Command argument, for commands that take one
        value: Option<String>,
    },
    /// Scan the network for controllable devices
    Scan {
        /// Scan window in seconds
        #[arg(short, long, default_value = "3")]
        window: u64,
    },
    /// Connectivity-test every transport strategy against a device
    Probe {
        /// Device id or name
        device: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,tvlink_gateway=info",
        1 => "info,tvlink_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.api_port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        None | Some(Command::Run) => run_gateway(config).await,
        Some(Command::Send {
            device,
            command,
            value,
        }) => send_once(config, &device, &command, value.as_deref()).await,
        Some(Command::Scan { window }) => scan(Duration::from_secs(window)).await,
        Some(Command::Probe { device }) => probe(config, &device).await,
    }
}

/// Run the gateway until interrupted
async fn run_gateway(config: Config) -> anyhow::Result<()> {
    let dispatcher = Arc::new(Dispatcher::new(&config));
    dispatcher.init().await;

    let registry = config.seed_registry();
    let session = Arc::new(Session::new(Arc::clone(&dispatcher), registry));

    tracing::info!(port = config.api_port, "tvlink gateway ready");

    tokio::select! {
        result = tvlink_gateway::api::serve(Arc::clone(&session), config.api_port) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    dispatcher.shutdown().await;
    Ok(())
}

/// Send one command and print the structured outcome
async fn send_once(
    config: Config,
    device: &str,
    command: &str,
    value: Option<&str>,
) -> anyhow::Result<()> {
    let command = TvCommand::parse(command, value)?;

    let dispatcher = Arc::new(Dispatcher::new(&config));
    dispatcher.init().await;

    let registry = config.seed_registry();
    let session = Session::new(Arc::clone(&dispatcher), registry);
    let device = session.find_device(device).await?;

    let reply = session.send_to(Some(device), &command).await;
    println!("{}", serde_json::to_string_pretty(&reply)?);

    dispatcher.shutdown().await;
    if reply.outcome.success {
        Ok(())
    } else {
        anyhow::bail!("command failed")
    }
}

/// Scan for devices and print what resolved
async fn scan(window: Duration) -> anyhow::Result<()> {
    let scanner = MdnsScanner::new()?;
    println!("Scanning for {} seconds...", window.as_secs());

    let mut devices = scanner.scan(window).await?;
    devices.sort_by(|a, b| a.name.cmp(&b.name));

    if devices.is_empty() {
        println!("No devices found");
        return Ok(());
    }
    for device in devices {
        println!(
            "{}  {}  {}  {}",
            device.name,
            device.brand,
            device.addr,
            device.model.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Probe every strategy against one device
async fn probe(config: Config, device: &str) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::new(&config);
    dispatcher.init().await;

    let registry = config.seed_registry();
    let device = registry
        .find(device)
        .ok_or_else(|| anyhow::anyhow!("unknown device: {device}"))?;

    println!("Probing {} ({}) at {}", device.name, device.brand, device.addr);
    for (kind, reachable) in dispatcher.probe(device).await {
        let mark = if reachable { "ok" } else { "unreachable" };
        println!("  {kind:<10} {mark}");
    }
    Ok(())
}
