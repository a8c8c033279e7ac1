//! Core systems for Horizon Menus.
//!
//! This crate provides the toolkit-independent foundation the menu subsystem
//! is built on:
//!
//! - **Signal/Slot System**: Type-safe observer notification, safe to re-enter
//! - **Logging**: `tracing` targets, span names and a [`PerfSpan`] guard
//! - **Tree Formatting**: Shared options for text dumps of menu trees
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_menus_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::{CoreError, Result, SignalError};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
