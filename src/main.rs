//! uibridge - drive the embedded-UI messaging protocol from a terminal.
//!
//! The parent process plays the host: it reads NDJSON messages from our
//! stdout and answers on our stdin.

use clap::Parser;
use mcp_ui_bridge::cli::{self, Command};
use mcp_ui_bridge::BridgeConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Talk to an embedding host over stdio
#[derive(Parser, Debug)]
#[command(name = "uibridge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Config file (defaults to the XDG config location)
    #[arg(long, env = "UIBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Enable verbose logging (equivalent to RUST_LOG=trace)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Override both request and render-data timeouts, in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Determine log level from args or env
    let default_filter = if args.verbose {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "warn" // stdout carries the protocol; keep stderr quiet
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if args.debug || args.verbose {
        tracing::info!("Debug logging enabled");
    }

    let mut config = BridgeConfig::load_or_default(args.config.as_deref())?;
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cli::run(args.command, config))
}
