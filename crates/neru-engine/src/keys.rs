//! Canonical spellings of the navigation keys every router recognizes.
//!
//! These are `Chord::parse(..).to_string_canonical()`'s actual output for
//! each navigation key, which is the enum variant name lowercased, not the
//! shorthand spelling accepted by `Chord::parse` itself (e.g. parsing
//! accepts `"esc"`/`"enter"`/`"backspace"`, but the canonical round-trip
//! form is `"escape"`/`"return"`/`"delete"`). Routers compare against
//! these constants, and [`pipeline`](crate::pipeline) registers the
//! human-readable spellings that parse to the same chords.
pub const ESCAPE: &str = "escape";
pub const BACKSPACE: &str = "delete";
pub const ENTER: &str = "return";
pub const ARROW_UP: &str = "uparrow";
pub const ARROW_DOWN: &str = "downarrow";
pub const ARROW_LEFT: &str = "leftarrow";
pub const ARROW_RIGHT: &str = "rightarrow";

/// The navigation keys registered as part of the key-event tap's
/// suppressed set (§4.6), in their human-readable `Chord::parse` spelling.
pub const NAVIGATION_SPECS: &[&str] = &["Escape", "Backspace", "Enter", "Up", "Down", "Left", "Right"];
