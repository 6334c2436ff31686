//! The pairing dispatcher (C5): the accept loop that reads each new
//! connection's preamble (a 36-byte hyphenated connection id followed by a
//! 4-byte role tag) and joins `comm`/`data` halves sharing the same id into
//! one session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::session::{self, SessionHandle};
use super::slot::PairingSlot;
use crate::datasource::registry::DataSourceRegistry;
use crate::error::PairingError;

/// Connection ids may be used to pair exactly one comm/data set; the slot
/// table is the sole record of who has already paired.
pub type SlotTable = Arc<Mutex<HashMap<Uuid, PairingSlot>>>;
/// Live sessions, tracked so the watchdog can reap ones that have gone
/// quiet and so shutdown can cancel every outstanding task.
pub type SessionTable = Arc<Mutex<HashMap<Uuid, SessionHandle>>>;

const PREAMBLE_TIMEOUT: StdDuration = StdDuration::from_secs(5);
const CONNECTION_ID_LEN: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Comm,
    Data,
}

impl Role {
    fn parse(tag: &[u8; 4]) -> Result<Self, PairingError> {
        match tag {
            b"comm" => Ok(Self::Comm),
            b"data" => Ok(Self::Data),
            other => Err(PairingError::InvalidRole(String::from_utf8_lossy(other).into_owned())),
        }
    }
}

async fn read_preamble(stream: &mut TcpStream) -> Result<(Uuid, Role), PairingError> {
    let mut id_bytes = [0u8; CONNECTION_ID_LEN];
    let mut role_bytes = [0u8; 4];

    tokio::time::timeout(PREAMBLE_TIMEOUT, async {
        stream.read_exact(&mut id_bytes).await?;
        stream.read_exact(&mut role_bytes).await?;
        Ok::<_, std::io::Error>(())
    })
    .await
    .map_err(|_| PairingError::PreambleTimeout)?
    .map_err(PairingError::Io)?;

    let id_text = std::str::from_utf8(&id_bytes).map_err(|_| PairingError::InvalidConnectionId)?;
    let id = Uuid::parse_str(id_text).map_err(|_| PairingError::InvalidConnectionId)?;
    let role = Role::parse(&role_bytes)?;
    Ok((id, role))
}

/// Accepts connections until `listener` is dropped or the task is aborted.
/// Each accepted connection is paired (or slotted) independently; a
/// malformed preamble only drops that one connection.
pub async fn accept_loop(
    listener: TcpListener,
    slots: SlotTable,
    sessions: SessionTable,
    registry: Arc<dyn DataSourceRegistry>,
    provider: String,
) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };

        let slots = Arc::clone(&slots);
        let sessions = Arc::clone(&sessions);
        let registry = Arc::clone(&registry);
        let provider = provider.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, slots, sessions, registry, provider).await {
                debug!(%peer, error = %e, "dropping unpaired connection");
            }
        });
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: std::net::SocketAddr,
    slots: SlotTable,
    sessions: SessionTable,
    registry: Arc<dyn DataSourceRegistry>,
    provider: String,
) -> Result<(), PairingError> {
    let (id, role) = read_preamble(&mut stream).await?;

    {
        let already_sessioned = sessions.lock().await.contains_key(&id);
        if already_sessioned {
            return Err(PairingError::InvalidConnectionId);
        }
    }

    let paired = {
        let mut slots = slots.lock().await;
        match (slots.remove(&id), role) {
            (None, Role::Comm) => {
                slots.insert(id, PairingSlot::AwaitingData { comm: stream, registered_at: Instant::now() });
                None
            }
            (None, Role::Data) => {
                slots.insert(id, PairingSlot::AwaitingComm { data: stream, registered_at: Instant::now() });
                None
            }
            (Some(PairingSlot::AwaitingData { comm, .. }), Role::Data) => Some((comm, stream)),
            (Some(PairingSlot::AwaitingComm { data, .. }), Role::Comm) => Some((stream, data)),
            (Some(existing), role) => {
                // Same role arrived twice for this id: put the original back
                // and reject the newcomer.
                slots.insert(id, existing);
                return Err(PairingError::InvalidRole(format!("{role:?}")));
            }
        }
    };

    let Some((comm, data)) = paired else { return Ok(()) };

    let data_source = registry.create(&provider)?;

    info!(%id, %peer, "session paired");
    let handle = session::spawn(id, comm, data, data_source, Arc::clone(&sessions));
    sessions.lock().await.insert(id, handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_tags() {
        assert_eq!(Role::parse(b"comm").unwrap(), Role::Comm);
        assert_eq!(Role::parse(b"data").unwrap(), Role::Data);
        assert!(Role::parse(b"xxxx").is_err());
    }
}
