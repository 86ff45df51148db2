use std::net::SocketAddr;

/// Errors that can occur in transport layer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect to the remote endpoint.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to bind a local socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on an open transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation is not supported by this transport's direction.
    /// Publishers cannot receive; subscribers cannot send.
    #[error("capability violation: {0}")]
    Capability(&'static str),

    /// The layer has no open connection below it.
    #[error("layer is not connected")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, TransportError>;
