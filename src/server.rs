use rmcp::ServiceExt;
use rmcp::transport::sse_server::SseServer;
use rmcp::transport::stdio;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api_docs::ApiDocsService;
use crate::config::Config;
use crate::mcp::NodeDocsServer;

/// Logs go to stderr so they never interleave with the stdio transport.
pub fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

// start sse server
pub async fn start_sse_server(addr: &str, config: &Config) -> anyhow::Result<()> {
    let docs = Arc::new(ApiDocsService::new(config)?);
    tracing::info!("Starting SSE server on {}", addr);

    let ct = SseServer::serve(addr.parse()?)
        .await?
        .with_service(move || NodeDocsServer::new(docs.clone()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C. Shutting down...");
    ct.cancel();
    Ok(())
}

// start stdio server
pub async fn start_stdio_server(config: &Config) -> anyhow::Result<()> {
    let docs = Arc::new(ApiDocsService::new(config)?);
    tracing::info!("Starting MCP server on stdio (corpus: {})", config.corpus_url);

    let service = NodeDocsServer::new(docs)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;

    service.waiting().await?;
    Ok(())
}
