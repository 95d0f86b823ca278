use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use squawker::config::SquawkerConfig;
use squawker::responder::Squawker;
use squawker::runner;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Answer IRC channel activity with a throttled canned reply.
///
/// Reads raw IRC lines on stdin and writes reply lines on stdout.
#[derive(Parser, Debug)]
#[command(name = "squawker", version)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network name used to resolve per-network settings
    #[arg(short, long, default_value = "default")]
    network: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout only carries replies
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match args.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    info!("Starting Squawker");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match args.config {
        Some(ref path) => SquawkerConfig::from_file(path)?,
        None => SquawkerConfig::default(),
    };
    info!(
        network = %args.network,
        networks = config.networks.len(),
        "Configuration loaded"
    );

    let squawker = Squawker::new(config)?;
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        stats = runner::run(stdin, &mut stdout, &squawker, &args.network) => {
            stats?;
        }
        _ = shutdown_signal() => {}
    }

    info!("Squawker stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
