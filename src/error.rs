//! Canal client error types

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanalError {
    /// The socket failed or ended mid-frame. A connector that raised this
    /// must be reconnected before further use.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with something the protocol does not allow at
    /// this point, or reported an error through an ACK body.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server rejected the CLIENTAUTHENTICATION exchange.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A received body could not be decoded. `context` identifies the
    /// entry (binlog position and table) when a header was available.
    #[error("malformed payload in {context}: {reason}")]
    MalformedPayload { context: String, reason: String },

    #[error("connector is not connected")]
    NotConnected,

    #[error("event channel closed")]
    ChannelClosed,
}

impl From<io::Error> for CanalError {
    fn from(err: io::Error) -> Self {
        CanalError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CanalError>;
