//! basic-auth-gateway - HTTP Basic authentication in front of a static site
//!
//! This is the main entry point for the basic-auth-gateway application.

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;

use basic_auth_gateway::auth::hash_password;
use basic_auth_gateway::config::Config;
use basic_auth_gateway::logging::init_tracing;
use basic_auth_gateway::server::{AppState, Server};

/// basic-auth-gateway - HTTP Basic authentication in front of a static site
#[derive(Parser, Debug)]
#[command(name = "basic-auth-gateway")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "BASIC_AUTH_GATEWAY_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an Argon2 hash usable as a user password in the config file
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    if let Some(Command::HashPassword { password }) = &args.command {
        let hash = hash_password(password)?;
        println!("{}", hash);
        return Ok(());
    }

    // Load configuration
    let config = load_config(&args)?;

    // Initialize tracing/logging
    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting basic-auth-gateway"
    );

    // Validate and build the decision engine and resolver
    let state = AppState::from_config(&config)?;
    info!(
        realm = %state.engine.realm(),
        users = state.engine.user_count(),
        retry_on_failure = state.engine.retry_on_failure(),
        document_root = %config.resources.document_root,
        "Gateway initialized"
    );

    // Create and start the HTTP server
    let server = Server::new(config.server.clone(), state);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting HTTP server"
    );

    server.run(shutdown_signal()).await?;

    info!("basic-auth-gateway shutdown complete");
    Ok(())
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
        None => {
            eprintln!("Loading configuration from environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
    }
}

/// Create a future that resolves when a shutdown signal is received
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
