//! hidkey entry point.
//!
//! Parses the command line, loads the configuration, and dispatches to one
//! of the sub-commands.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()               -- TOML from --config or the platform dir
//!  └─ run
//!       ├─ wait_for_devices()     -- poll hidapi until a panel is attached
//!       ├─ HidReportSource::open  -- one reader thread per panel
//!       ├─ StreamSupervisor       -- one DeviceSession task per panel
//!       └─ Ctrl-C                 -- ShutdownHandle aborts every session
//! ```
//!
//! `diagnose` and `dump` open a single configured device and print what it
//! sends; `list` prints every attached HID device; `init` writes a starter
//! config.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hidkey_bridge::application::diagnose::{DiagnosticMode, DiagnosticSession, StdoutSink};
use hidkey_bridge::application::emit_keys::KeyEmitter;
use hidkey_bridge::application::run_session::DeviceSession;
use hidkey_bridge::application::supervise::{SessionOutcome, StreamSupervisor};
use hidkey_bridge::infrastructure::discovery::{self, MatchedDevice};
use hidkey_bridge::infrastructure::key_injection::platform_injector;
use hidkey_bridge::infrastructure::report_source::hid::HidReportSource;
use hidkey_bridge::infrastructure::storage::config::{
    config_file_path, load_config, save_config, AppConfig, DeviceConfig,
};

/// Turn switches on a USB HID button panel into keystrokes.
#[derive(Parser)]
#[command(name = "hidkey", version, about)]
struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log keystrokes instead of injecting them
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind every configured device and inject keystrokes (default)
    Run,
    /// Print the byte/bit that changed in each report of one device
    Diagnose {
        /// Device name from the config
        #[arg(long)]
        device: String,
    },
    /// Print every report of one device as a bitstream
    Dump {
        /// Device name from the config
        #[arg(long)]
        device: String,
    },
    /// List all attached HID devices
    List,
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    if let Commands::Init { force } = command {
        init_tracing("info");
        return write_starter_config(cli.config, force);
    }

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.bridge.log_level);

    match command {
        Commands::Run => run(&config, cli.dry_run).await,
        Commands::Diagnose { device } => diagnose(&config, &device, DiagnosticMode::Changes).await,
        Commands::Dump { device } => diagnose(&config, &device, DiagnosticMode::Dump).await,
        Commands::List => list(&config),
        Commands::Init { .. } => Ok(()),
    }
}

/// Structured logging; `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn poll_interval(config: &AppConfig) -> Duration {
    Duration::from_millis(config.bridge.discovery_interval_ms)
}

// ── run ───────────────────────────────────────────────────────────────────────

async fn run(config: &AppConfig, dry_run: bool) -> Result<()> {
    config.validate().context("invalid configuration")?;
    info!("hidkey starting ({} configured device(s))", config.devices.len());

    let mut api = discovery::open_api()?;
    let matched = tokio::select! {
        found = discovery::wait_for_devices(&mut api, &config.devices, poll_interval(config)) => found?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received while waiting for devices");
            return Ok(());
        }
    };

    let emitter = KeyEmitter::new(platform_injector(dry_run));
    let mut supervisor = StreamSupervisor::new();

    for MatchedDevice { config: device, candidate } in matched {
        let ctx = device.session_context()?;
        match HidReportSource::open(&api, &candidate.path, &device.name) {
            Ok(source) => supervisor.spawn(DeviceSession::new(ctx, Box::new(source), emitter.clone())),
            Err(e) => warn!("{}: {e}", device.name),
        }
    }

    if supervisor.is_empty() {
        bail!("none of the attached devices could be opened");
    }

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let shutdown = supervisor.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown.shutdown();
        }
    });

    info!("hidkey ready; {} session(s) running", supervisor.len());
    for report in supervisor.join_all().await {
        match report.outcome {
            SessionOutcome::Failed(e) => warn!("{}: session failed: {e}", report.device),
            SessionOutcome::Cancelled => info!("{}: session stopped", report.device),
            SessionOutcome::Panicked(msg) => error!("{}: session panicked: {msg}", report.device),
        }
    }

    info!("hidkey stopped");
    Ok(())
}

// ── diagnose / dump ───────────────────────────────────────────────────────────

async fn diagnose(config: &AppConfig, name: &str, mode: DiagnosticMode) -> Result<()> {
    let device: &DeviceConfig = config
        .device(name)
        .with_context(|| format!("no device named {name:?} in configuration"))?;

    let mut api = discovery::open_api()?;
    let wanted = std::slice::from_ref(device);
    let matched = tokio::select! {
        found = discovery::wait_for_devices(&mut api, wanted, poll_interval(config)) => found?,
        _ = tokio::signal::ctrl_c() => return Ok(()),
    };
    let Some(target) = matched.into_iter().next() else {
        bail!("device {name:?} is not attached");
    };

    let source = HidReportSource::open(&api, &target.candidate.path, name)?;
    let session = DiagnosticSession::new(
        Box::new(source),
        mode,
        config.bridge.housekeeping_byte,
        StdoutSink,
    );

    tokio::select! {
        e = session.run() => Err(e).with_context(|| format!("{name}: report stream ended")),
        _ = tokio::signal::ctrl_c() => Ok(()),
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

fn list(config: &AppConfig) -> Result<()> {
    let api = discovery::open_api()?;
    let candidates = discovery::list_candidates(&api);
    if candidates.is_empty() {
        println!("No HID devices found.");
        return Ok(());
    }

    println!(
        "{:<8} {:<8} {:<14} {:<24} {:<24} Path",
        "VID", "PID", "Configured", "Manufacturer", "Product"
    );
    println!("{}", "-".repeat(100));
    for candidate in &candidates {
        let configured = config
            .devices
            .iter()
            .find(|d| discovery::matches(d, candidate))
            .map_or("-", |d| d.name.as_str());
        println!(
            "{:<8} {:<8} {:<14} {:<24} {:<24} {}",
            format!("0x{:04X}", candidate.vendor_id),
            format!("0x{:04X}", candidate.product_id),
            configured,
            candidate.manufacturer.as_deref().unwrap_or("(unknown)"),
            candidate.product.as_deref().unwrap_or("(unknown)"),
            candidate.path,
        );
    }
    Ok(())
}

// ── init ──────────────────────────────────────────────────────────────────────

fn write_starter_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => config_file_path()?,
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let written = save_config(&AppConfig::sample(), Some(&path))?;
    info!("wrote starter config to {}", written.display());
    Ok(())
}
