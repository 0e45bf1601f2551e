//! POCKETBRIDGE MCP server binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::{Context, Result};
use clap::Parser;
use pocketbridge_server::{Args, DEFAULT_LOG_FILTER, McpServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let server = McpServer::from_args(&args).context("failed to configure backend client")?;
    tracing::info!(
        url = %args.url,
        tools = server.host().registry().count(),
        limit = args.max_output_chars,
        "pocketbridge starting"
    );

    if let Some(credentials) = args.admin_credentials() {
        server.authenticate(&credentials).await;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    server
        .serve(stdin, tokio::io::stdout())
        .await
        .context("stdio transport failed")?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}
