use thiserror::Error;

/// Errors produced while collecting elements from the accessibility tree.
#[derive(Error, Debug)]
pub enum Error {
    /// The Accessibility permission has not been granted to this process.
    #[error("accessibility permission not granted")]
    Permission,
    /// An AX call reported a non-zero error code.
    #[error("AX call failed: {0} ({1})")]
    AxCode(&'static str, i32),
    /// The element or window disappeared between two AX calls.
    #[error("UI element is gone")]
    ElementGone,
    /// The filtered collection produced no elements; entry is aborted.
    #[error("no elements matched the collection filter")]
    EmptyCollection,
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, Error>;
