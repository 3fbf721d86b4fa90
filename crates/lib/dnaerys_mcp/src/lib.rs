//! # dnaerys_mcp
//!
//! MCP (Model Context Protocol) tool surface for the Dnaerys variant store.
//!
//! Exposes one tool per dispatcher operation. The server can run over
//! stdio for a locally spawned agent, or as a Streamable HTTP endpoint that
//! `dnaerys_mcp_server` mounts on its own port.

pub mod hooks;
pub mod server;
pub mod tools;

use std::sync::Arc;

use dnaerys_core::query::Dispatcher;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build a server with the default hook pipeline.
pub fn build_server(dispatcher: Arc<Dispatcher>) -> server::DnaerysMcpServer {
    server::DnaerysMcpServer::new(dispatcher, Arc::new(hooks::default_pipeline()))
}

/// Build an Axum router that serves the MCP Streamable HTTP endpoint at `/mcp`.
///
/// Every session gets its own server handle over the shared dispatcher, so
/// the store client and its connection pool are reused across sessions.
///
/// # Arguments
///
/// * `dispatcher`: shared query dispatcher.
/// * `ct`: cancellation token for graceful shutdown of SSE streams.
pub fn mcp_router(dispatcher: Arc<Dispatcher>, ct: CancellationToken) -> axum::Router {
    let hook_pipeline = Arc::new(hooks::default_pipeline());

    let service: StreamableHttpService<server::DnaerysMcpServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || {
                Ok(server::DnaerysMcpServer::new(
                    dispatcher.clone(),
                    hook_pipeline.clone(),
                ))
            },
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                cancellation_token: ct,
                ..Default::default()
            },
        );

    axum::Router::new().nest_service("/mcp", service)
}
