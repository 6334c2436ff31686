//! The pairing slot: half a connection pair waiting for its sibling to
//! arrive under the same connection id.

use std::time::Instant;

use tokio::net::TcpStream;

/// One outstanding half-connection, keyed by connection id in the
/// dispatcher's slot table.
pub enum PairingSlot {
    AwaitingData { comm: TcpStream, registered_at: Instant },
    AwaitingComm { data: TcpStream, registered_at: Instant },
}

impl PairingSlot {
    pub fn registered_at(&self) -> Instant {
        match self {
            Self::AwaitingData { registered_at, .. } => *registered_at,
            Self::AwaitingComm { registered_at, .. } => *registered_at,
        }
    }
}
