use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Store::{:?}: {}", .0, .0)]
    Store(#[from] dnaerys_core::store::StoreError),

    #[error("Mcp::{:?}: {}", .0, .0)]
    Mcp(#[from] rmcp::RmcpError),

    #[error("Server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
