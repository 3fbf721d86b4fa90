//! Dnaerys MCP server binary.
//!
//! Connects to a Dnaerys variant store and exposes it as MCP tools, either
//! over stdio (for an agent that spawns this process) or as a Streamable
//! HTTP endpoint at `/mcp`.

mod error;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dnaerys_core::query::{Dispatcher, QueryPolicy, RefAssembly};
use dnaerys_core::store::{HttpVariantStore, StoreChannel, StoreConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

/// CLI arguments for the MCP server.
#[derive(Parser, Debug)]
#[command(name = "dnaerys_mcp_server", about = "Dnaerys variant store MCP server", version)]
struct Args {
    /// Base URL of the variant store gateway.
    #[arg(long, env = "DNAERYS_URL", default_value = dnaerys_core::store::config::DEFAULT_STORE_URL)]
    store_url: String,

    /// Per-request timeout in seconds, including draining streamed replies.
    #[arg(long, env = "DNAERYS_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Reference assembly sent with every region query (GRCh38 or GRCh37).
    #[arg(long, env = "DNAERYS_ASSEMBLY", default_value = "GRCh38")]
    assembly: RefAssembly,

    /// MCP transport.
    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "MCP_BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind: String,

    /// Void queries whose min length exceeds max length instead of
    /// resetting them to the unrestricted range.
    #[arg(long, default_value_t = false)]
    void_contradictory_lengths: bool,

    /// Send allele-frequency bounds of 0 to the store instead of
    /// treating them as unset.
    #[arg(long, default_value_t = false)]
    allow_zero_af: bool,
}

impl Args {
    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            base_url: self.store_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    fn policy(&self) -> QueryPolicy {
        QueryPolicy {
            reset_contradictory_lengths: !self.void_contradictory_lengths,
            positive_af_only: !self.allow_zero_af,
            assembly: self.assembly,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the stdio transport.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,dnaerys_core=debug,dnaerys_mcp=debug")
            }),
        )
        .init();

    let args = Args::parse();

    info!(
        store_url = %args.store_url,
        timeout_secs = args.timeout_secs,
        transport = ?args.transport,
        version = dnaerys_mcp::version(),
        "starting dnaerys_mcp_server"
    );

    let channel = Arc::new(StoreChannel::new(args.store_config())?);
    let store = Arc::new(HttpVariantStore::new(channel));
    let dispatcher = Arc::new(Dispatcher::new(store, args.policy()));

    match args.transport {
        Transport::Stdio => serve_stdio(dispatcher).await,
        Transport::Http => serve_http(dispatcher, &args.bind).await,
    }
}

async fn serve_stdio(dispatcher: Arc<Dispatcher>) -> Result<()> {
    info!("serving MCP over stdio");
    dnaerys_mcp::build_server(dispatcher).serve_stdio().await?;
    info!("stdio client disconnected");
    Ok(())
}

async fn serve_http(dispatcher: Arc<Dispatcher>, bind: &str) -> Result<()> {
    if bind.trim().is_empty() {
        return Err(Error::Custom("MCP_BIND_ADDR must not be empty".into()));
    }
    let ct = CancellationToken::new();
    let app = dnaerys_mcp::mcp_router(dispatcher, ct.clone());

    let listener = tokio::net::TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "MCP server listening");

    tokio::spawn({
        let ct = ct.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
            }
            ct.cancel();
        }
    });

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { ct.cancelled().await })
            .await
    });

    handle.await??;
    info!("MCP server stopped");
    Ok(())
}
