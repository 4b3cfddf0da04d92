//! Core plumbing for treelist.
//!
//! This crate provides the pieces the reconciliation engine builds on:
//!
//! - **Signal/Slot System**: Type-safe change notification ([`Signal`])
//! - **Logging**: `tracing` targets and tree-dump formatting options
//! - **Errors**: Connection-management errors ([`SignalError`])
//!
//! # Signal/Slot Example
//!
//! ```
//! use treelist_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::SignalError;
pub use logging::{TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
