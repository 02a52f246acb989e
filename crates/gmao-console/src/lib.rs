//! `gmao-console` - terminal console for a GMAO factory maintenance server.
//!
//! The server is the single source of truth: it pushes full JSON snapshots
//! over a WebSocket and the console mirrors the latest one into a
//! [`StateStore`](gmao_sync::StateStore). Edits are fire-and-forget commands;
//! the console never patches local state and instead waits for the next push.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Console configuration loading and validation.
pub mod config;
/// Modal dialogs for machine and maintenance edits.
pub mod dialog;
/// Console errors.
pub mod error;
/// Screen routing.
pub mod router;
/// WebSocket client for the snapshot/command protocol.
pub mod sync_client;
/// Terminal UI loop.
pub mod ui;
/// Per-screen view models and rendering.
pub mod views;

pub use config::{ConsoleConfig, ReconnectPolicy};
pub use error::ConsoleError;
pub use router::Route;
pub use sync_client::{LinkEvent, ServerEndpoint, SyncClient};
