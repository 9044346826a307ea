use thiserror::Error;

/// Errors raised by the IPC listener itself, distinct from [`neru_engine::Error`]
/// which governs one request's dispatch outcome.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to bind, chmod, or otherwise prepare the listening socket.
    #[error("failed to bind socket at {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A connection's read/write loop hit an I/O error.
    #[error("IPC connection error: {0}")]
    Connection(#[from] std::io::Error),
}

/// Convenience result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
