//! immoflow MCP Server
//!
//! Exposes the immoflow API to AI assistants over stdio. Authentication uses
//! the caller's platform session token from the environment. Tools cover:
//! - Bank transaction categorization and rules
//! - The Anlage V wizard
//! - Workflow version management
//! - Documentation generation and tenant messaging

mod client;
mod server;

use anyhow::Result;
use rmcp::ServiceExt;
use server::ImmoflowServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is used for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting immoflow MCP server");

    let server = ImmoflowServer::from_env()?;

    // Serve over stdio - pass as tuple (stdin, stdout)
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;

    service.waiting().await?;

    Ok(())
}
