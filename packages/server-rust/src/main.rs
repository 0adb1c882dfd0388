//! Roster server binary: parse flags, install logging, run the lifecycle.

use clap::Parser;
use tracing::info;

use roster_server::network::{NetworkConfig, NetworkModule};
use roster_server::observability::logging::{self, LoggingConfig};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "roster-server",
    about = "User-roster HTTP service with request correlation and access logging"
)]
struct Args {
    /// Bind address.
    #[arg(long, env = "ROSTER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on. 0 picks an OS-assigned port.
    #[arg(long, env = "ROSTER_PORT", default_value_t = 8080)]
    port: u16,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, env = "ROSTER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON log records instead of the human-readable format.
    #[arg(long, env = "ROSTER_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init(&LoggingConfig {
        level: args.log_level,
        json: args.log_json,
        ..LoggingConfig::default()
    })?;

    let config = NetworkConfig {
        host: args.host,
        port: args.port,
        ..NetworkConfig::default()
    };

    let mut module = NetworkModule::new(config);
    let port = module.start().await?;
    info!(port, "roster server listening");

    module.shutdown_controller().set_ready();
    module.serve(shutdown_signal()).await
}

/// Completes when SIGINT (Ctrl-C) or, on Unix, SIGTERM arrives.
///
/// If a handler cannot be installed the branch parks forever instead of
/// completing, so a registration failure never shuts the server down.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
