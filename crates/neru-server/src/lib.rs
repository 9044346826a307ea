//! The IPC dispatcher (§4.8): a Unix-domain-socket listener translating
//! newline-delimited JSON requests into the mode engine's serial queue and
//! writing back each response.
//!
//! This crate owns only the socket and the connection threads; mode
//! transitions, routers, and every other piece of engine state live in
//! `neru-engine` and are reached exclusively through the
//! [`neru_engine::CoalescingSender`] passed to [`serve`].

mod error;
mod listener;

use std::path::PathBuf;

pub use error::{Error, Result};
pub use listener::serve;

/// The well-known IPC socket path (§4's `<tmpdir>/neru.sock`).
pub fn default_socket_path() -> PathBuf {
    std::env::temp_dir().join("neru.sock")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_socket_path_is_under_tmpdir() {
        let path = default_socket_path();
        assert_eq!(path.file_name().unwrap(), "neru.sock");
        assert_eq!(path.parent().unwrap(), std::env::temp_dir());
    }
}
