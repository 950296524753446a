use thiserror::Error;

/// Failure reported by a host-implemented bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host side of the bridge has gone away (activity finished, log
    /// pipe closed).
    #[error("Host bridge detached: {0}")]
    Detached(String),

    /// The host refused the call.
    #[error("Host rejected bridge call: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
