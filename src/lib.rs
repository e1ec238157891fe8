use thiserror::Error;

/// Error types for the muxecho library
#[derive(Error, Debug)]
pub enum MuxError {
    /// Transport-level errors (bind, connect, read, write on the raw socket
    /// or on a logical stream)
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Multiplexing session errors (establishment, stream accept/open,
    /// session torn down by the peer)
    #[error("session error: {0}")]
    Session(#[from] yamux::ConnectionError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// UTF-8 encoding errors
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for the muxecho library
pub type Result<T> = std::result::Result<T, MuxError>;

pub mod client;
pub mod config;
pub mod handler;
pub mod server;
pub mod session;

// Re-export main types for convenience
pub use client::EchoClient;
pub use config::{ClientConfig, ServerConfig};
pub use server::EchoServer;
pub use session::{ClientSession, LogicalStream, ServerSession};
