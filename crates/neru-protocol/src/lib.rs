//! Shared data model and IPC wire types for neru.
//!
//! This crate has no platform dependencies: it defines the vocabulary the
//! mode engine, routers, overlay coordinator and IPC dispatcher all share,
//! so that none of them need to agree on shapes by convention alone.
#![warn(missing_docs)]

mod binding;
mod element;
mod error;
mod grid;
mod hint;
mod ipc;
mod key;
mod mode;

pub use binding::{Command, HotkeyBinding};
pub use element::{App, CollectFilter, Rect, UiElement};
pub use error::{Code, Error};
pub use grid::{GridCell, RecursiveGridFrame};
pub use hint::Hint;
pub use ipc::{Action, ProtocolVersion, Request, Response, PROTOCOL_VERSION};
pub use key::{canonicalize, KeyEvent};
pub use mode::{Mode, PendingAction};
