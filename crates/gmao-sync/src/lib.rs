//! `gmao-sync` - wire contract and state store for the GMAO floor console.
//!
//! The server owns all persistent state and pushes it as one JSON document
//! (the snapshot); clients send fire-and-forget command messages back. This
//! crate holds the data model, the codec for both directions, and the
//! replace-wholesale store the client mirrors the server into. It performs
//! no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Outbound command messages.
pub mod command;
/// Error types for decoding and encoding.
pub mod error;
/// Snapshot data model and decoding.
pub mod model;
/// Snapshot store with an explicit observer list.
pub mod store;

pub use command::Command;
pub use error::SyncError;
pub use model::{
    decode_snapshot, Chain, EntityId, Machine, MaintenanceRecord, Record, Snapshot, StatusTone,
    MACHINE_STATUSES,
};
pub use store::{ObserverId, StateStore};
