// ABOUTME: Session-level error type covering transport, codec and bind failures

use crate::codec::{CodecError, Pdu};
use crate::datatypes::CommandStatus;
use std::io;
use thiserror::Error;

/// Error type for session and server operations.
///
/// Read timeouts and closed transports get their own variants because callers
/// treat them differently: a timeout is retried by receive loops, a closed
/// transport tears the session down.
#[derive(Debug, Error)]
pub enum SmppError {
    /// I/O error during network operations (connect, read, write)
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// Wire-format error from the PDU codec
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The 1-second read deadline elapsed; recoverable, the receive loop retries
    #[error("read timed out")]
    Timeout,

    /// The transport is gone: peer disconnect, EOF, or the session was closed
    #[error("connection closed")]
    ConnectionClosed,

    /// The peer answered a bind request with a non-Ok status
    #[error("bind rejected with status {status}")]
    BindRejected {
        status: CommandStatus,
        /// The full response, for callers that inspect more than the status
        response: Box<Pdu>,
    },
}

/// Result type alias for session and server operations
pub type SmppResult<T> = Result<T, SmppError>;
