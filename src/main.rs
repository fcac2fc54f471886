// src/main.rs

use codeforge::config::{Config, Transport};
use codeforge::mcp::stdio;
use codeforge::routes;
use codeforge::state::AppState;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (.env included)
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "codeforge-mcp.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);

    // stdout carries the protocol in stdio mode, so console logs go to stderr there.
    let console_writer = match config.transport {
        Transport::Stdio => BoxMakeWriter::new(std::io::stderr),
        Transport::Http => BoxMakeWriter::new(std::io::stdout),
    };
    let console_layer = fmt::layer().with_writer(console_writer).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    let state = AppState::new(config.clone())?;
    tracing::info!("Using CodeForge API at {}", state.client.base_url());

    match config.transport {
        Transport::Stdio => {
            stdio::run(state.server()).await?;
        }
        Transport::Http => {
            let app = routes::create_router(state);

            let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
            tracing::info!("MCP server listening on http://{}/mcp", listener.local_addr()?);

            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
