//! Error types for decoding and encoding.

use smol_str::SmolStr;
use thiserror::Error;

/// Errors produced by the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Inbound text was not a valid snapshot document. The message carries
    /// the decoder's reason, including the name of any missing collection.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(SmolStr),

    /// Snapshot sequence number did not advance past the last accepted one.
    #[error("stale snapshot (seq {got} after {last})")]
    StaleSnapshot {
        /// Last sequence number accepted on this connection.
        last: u64,
        /// Sequence number of the rejected snapshot.
        got: u64,
    },

    /// Outbound command could not be encoded.
    #[error("command encode error: {0}")]
    EncodeCommand(SmolStr),
}
