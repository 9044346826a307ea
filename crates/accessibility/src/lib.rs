//! Accessibility-tree collection of clickable UI elements.
//!
//! Scope matches the data model's `UiElement`: a one-shot, per-activation
//! collection, not a persisted observer cache. Pointer synthesis and
//! cursor queries live elsewhere (`pointer`, `mac-winops`).
#![warn(missing_docs)]

mod collector;
mod error;
mod ffi;

pub use collector::{Collector, MockCollector, RealCollector};
pub use error::{Error, Result};
