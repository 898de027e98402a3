use std::net::SocketAddr;

use anyhow::Context;
use asset_upload_relay::{
    config::Config,
    function::{handle_event, FunctionEvent},
    routes::create_router,
    utils::init_logger,
    AppState,
};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "asset-upload-relay", version, about = "Relay multipart uploads to the Roblox asset API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Run one serverless function event and print the function response
    Invoke {
        /// Path to the event JSON, or `-` for stdin
        #[arg(long, default_value = "-")]
        event: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    let state = AppState::new(config.clone())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state, &config).await,
        Command::Invoke { event } => invoke(state, &event).await,
    }
}

async fn serve(state: AppState, config: &Config) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn invoke(state: AppState, source: &str) -> anyhow::Result<()> {
    let raw = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read event file {}", source))?
    };

    let event: FunctionEvent = serde_json::from_str(&raw).context("Event is not valid JSON")?;
    let response = handle_event(&state, event).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
