//! Event types emitted by the focus watcher.

/// A focus-related event emitted by the watcher.
///
/// Semantics:
/// - `AppChanged { bundle_id, title, pid }`: emitted when the foreground
///   application changes. `bundle_id` is the activated app's bundle
///   identifier when the OS reports one; exclusion-list matching keys on
///   this field. `title` is the app's localized display name, for logging.
///   `pid` is the process identifier of the foreground app (or -1 if
///   unavailable).
/// - `TitleChanged { title, pid }`: emitted when the focused window's title
///   changes. `title` is the new title string (may be empty if unavailable).
///   `pid` is the PID of the owning app (or -1 if unavailable).
#[derive(Debug, Clone)]
pub enum FocusEvent {
    /// The foreground application changed.
    AppChanged {
        /// Bundle identifier of the newly foreground app, when known.
        bundle_id: Option<String>,
        /// Localized display name, for logging.
        title: String,
        /// Process identifier, or -1 if unavailable.
        pid: i32,
    },
    /// The focused window's title changed.
    TitleChanged { title: String, pid: i32 },
}
