mod config;
mod error;
mod mcp_api;
mod server;

use std::sync::Arc;

use life_context::ContextMerger;
use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use server::LifeContextServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting life-context MCP server");

    let config = Config::from_env()?;
    info!(
        max_document_bytes = config.max_document_bytes,
        pinned_section = ?config.pinned_section_path,
        tcp = config.listen_addr.is_some(),
        "configuration loaded"
    );

    let pinned = config.pinned_section()?;
    info!(
        variants = pinned.variants().len(),
        "pinned section ready"
    );

    let merger = Arc::new(ContextMerger::new(pinned));
    let server = LifeContextServer::new(merger, config.max_document_bytes);

    if let Some(addr) = config.listen_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                tracing::info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                tracing::info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
