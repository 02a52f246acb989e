//! Console errors.

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised by configuration loading and the server link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Configuration error.
    #[error("invalid config '{0}'")]
    InvalidConfig(SmolStr),

    /// Server endpoint could not be parsed.
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(SmolStr),

    /// WebSocket connection could not be established.
    #[error("connect error '{0}'")]
    Connect(SmolStr),
}
