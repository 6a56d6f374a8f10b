//! Sahayak CLI
//!
//! Main entry point for the Sahayak teaching-assistant server.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sahayak_flows::{create_router, AppState, Config};
use sahayak_model::GeminiClient;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Sahayak - AI teaching assistant for multi-grade classrooms
///
/// Serves the assistance flows (content generation, worksheets, visual
/// aids, knowledge base, lesson planning, reading assessment) and the
/// teacher report over HTTP.
#[derive(Parser, Debug)]
#[command(name = "sahayak")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: sahayak.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Port for the HTTP server (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing subscriber with appropriate filter
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Sahayak starting");
    tracing::debug!(config = ?args.config, "Config file");

    match run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, builds the model client, and serves HTTP.
async fn run_server(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let mut config = load_config(args.config.as_deref())?;

    // Apply CLI argument overrides
    if let Some(port) = args.port {
        config.port = port;
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    // The API key never lives in the config file, only in the environment.
    let api_key = std::env::var(&config.api_key_env).map_err(|_| {
        anyhow::anyhow!(
            "Environment variable '{}' is not set\n\nSuggestion: export {}=<your API key> before starting the server",
            config.api_key_env,
            config.api_key_env
        )
    })?;

    let client = GeminiClient::new(
        &config.api_base_url,
        api_key,
        Duration::from_secs(config.request_timeout_secs),
    )
    .map_err(|e| anyhow::anyhow!("Failed to build model client: {e}"))?;

    let state = AppState::new(config.clone(), Arc::new(client));
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("Sahayak running on http://{addr}");

    axum::serve(listener, router)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {e}"))?;

    Ok(())
}

/// Loads configuration from the given path or the default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Prints the effective configuration at startup.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Text model: {}", config.text_model);
    println!("  Image model: {}", config.image_model);
    println!("  API base URL: {}", config.api_base_url);
    println!("  API key from: ${}", config.api_key_env);
    println!("  Port: {}", config.port);
    println!("  Request timeout: {}s", config.request_timeout_secs);
}
