use thiserror::Error;

/// Fatal to the session: the comm/data streams are dropped and the slot is
/// reaped. Distinct from [`CapabilityError`], which is reported back to the
/// client as a per-call error and the session continues.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("framing: {0}")]
    Framing(#[from] FramingError),
    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("frame size {size} exceeds the maximum of {max} bytes")]
    OversizedFrame { size: u32, max: u32 },
    #[error("short read: expected {expected} bytes")]
    ShortRead {
        expected: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid UTF-8 in frame body: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON-RPC 2.0 message expected, but got something else")]
    NotJsonRpc2,
    #[error("JSON-RPC 2.0 notifications are not supported")]
    NotificationRejected,
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// Raised when the invoked data source capability fails. Its `Display` text
/// becomes the JSON-RPC `error.message` verbatim, matching the Python
/// original's `str(ex)`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl CapabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Raised while assembling a pairing slot's preamble; the half-connection is
/// closed and no slot mutation occurs.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("invalid connection id")]
    InvalidConnectionId,
    #[error("invalid role tag: {0:?}")]
    InvalidRole(String),
    #[error("timed out reading connection preamble")]
    PreambleTimeout,
    #[error("I/O error reading preamble: {0}")]
    Io(#[from] std::io::Error),
    #[error("constructing data source: {0}")]
    Registry(#[from] CapabilityError),
}
