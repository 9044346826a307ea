use thiserror::Error;

/// Errors that can occur during screen/cursor queries.
#[derive(Error, Debug)]
pub enum Error {
    /// Operation must be executed on the main thread (AppKit requirement).
    #[error("operation requires main thread")]
    MainThread,
    /// The requested system call reported failure.
    #[error("system call failed: {0}")]
    System(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
