//! A paired session: one comm stream, one data stream, one data-source
//! instance. Owns the request/response loop and the comm-write mutex that
//! serializes responses against logger notifications.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use nexus_protocol::rpc::{Notification, ResponseErr, ResponseOk};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::communicator;
use super::pairing::SessionTable;
use crate::datasource::{DataSource, LogLevel, Logger};
use crate::error::{ProtocolError, SessionError};
use crate::transport::{read_frame, write_frame, FrameReadError};

/// Tracked by the dispatcher so the watchdog can reap a session whose comm
/// stream has gone quiet, and so shutdown can cancel it.
pub struct SessionHandle {
    pub join: JoinHandle<()>,
    pub last_communication: Arc<Mutex<Instant>>,
}

/// Sends a `log` notification under the comm-write mutex, so it never
/// interleaves with an in-flight response.
struct CommLogger {
    comm_write: Arc<Mutex<OwnedWriteHalf>>,
}

#[async_trait]
impl Logger for CommLogger {
    async fn log(&self, level: LogLevel, message: &str) {
        let notification = Notification::log(level.name(), message);
        let Ok(body) = serde_json::to_vec(&notification) else { return };
        let mut writer = self.comm_write.lock().await;
        if let Err(e) = write_frame(&mut *writer, &body).await {
            warn!(error = %e, "failed to deliver log notification");
        }
    }
}

/// Spawns the session task and returns a handle the dispatcher tracks.
///
/// The task removes its own entry from `sessions` when it finishes on its
/// own (EOF or a fatal error) so the connection id becomes eligible for
/// watchdog-independent cleanup immediately, rather than lingering until
/// the next watchdog tick. A session torn down by the watchdog instead is
/// already removed from the table by the time its `JoinHandle` is aborted,
/// so this is a no-op in that case.
pub fn spawn(
    id: Uuid,
    comm: TcpStream,
    data: TcpStream,
    data_source: Box<dyn DataSource>,
    sessions: SessionTable,
) -> SessionHandle {
    let last_communication = Arc::new(Mutex::new(Instant::now()));
    let watched = Arc::clone(&last_communication);

    let join = tokio::spawn(async move {
        if let Err(e) = run(comm, data, data_source, watched).await {
            debug!(%id, error = %e, "session ended");
        } else {
            debug!(%id, "session closed cleanly");
        }
        sessions.lock().await.remove(&id);
    });

    SessionHandle { join, last_communication }
}

async fn run(
    comm: TcpStream,
    data: TcpStream,
    mut data_source: Box<dyn DataSource>,
    last_communication: Arc<Mutex<Instant>>,
) -> Result<(), SessionError> {
    let (mut comm_read, comm_write) = comm.into_split();
    let comm_write = Arc::new(Mutex::new(comm_write));
    let (_data_read, mut data_write) = data.into_split();

    let logger: Arc<dyn Logger> = Arc::new(CommLogger { comm_write: Arc::clone(&comm_write) });

    loop {
        let body = match read_frame(&mut comm_read).await {
            Ok(Some(body)) => body,
            Ok(None) => return Ok(()),
            Err(FrameReadError::Transport(e)) => return Err(SessionError::Transport(e)),
            Err(FrameReadError::Framing(e)) => return Err(SessionError::Framing(e)),
        };

        let envelope: Value = serde_json::from_slice(&body)
            .map_err(|e| SessionError::Protocol(ProtocolError::MalformedRequest(e.to_string())))?;
        let object = envelope.as_object();

        // A non-`2.0` envelope is fatal, but if it still carries a
        // recoverable `id` we owe the client a final error response before
        // dropping the session (§7).
        let recoverable_id = object.and_then(|o| o.get("id")).cloned();
        let is_jsonrpc_2 =
            object.is_some_and(|o| o.get("jsonrpc").and_then(Value::as_str) == Some("2.0"));
        if !is_jsonrpc_2 {
            if let Some(id) = recoverable_id {
                let response = ResponseErr::new(
                    id,
                    ProtocolError::NotJsonRpc2.to_string(),
                );
                let body = serde_json::to_vec(&response).expect("a response envelope always serializes");
                let mut writer = comm_write.lock().await;
                let _ = write_frame(&mut *writer, &body).await;
            }
            return Err(SessionError::Protocol(ProtocolError::NotJsonRpc2));
        }
        let object = object.expect("is_jsonrpc_2 implies object is Some");

        let id = object
            .get("id")
            .cloned()
            .ok_or(SessionError::Protocol(ProtocolError::NotificationRejected))?;
        let method_name = object
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| SessionError::Protocol(ProtocolError::MalformedRequest("missing method".to_owned())))?
            .to_owned();
        let params: Vec<Value> = object
            .get("params")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let outcome = communicator::dispatch(&method_name, &params, data_source.as_mut(), Arc::clone(&logger)).await;

        let (response_body, payload) = match outcome {
            Ok(outcome) => {
                let body = serde_json::to_vec(&ResponseOk::new(id, outcome.result))
                    .expect("a response envelope always serializes");
                (body, outcome.payload)
            }
            Err(err) => {
                let body = serde_json::to_vec(&ResponseErr::new(id, err.message()))
                    .expect("a response envelope always serializes");
                (body, None)
            }
        };

        // §4.4's state machine writes the comm response before emitting any
        // bulk data-stream payload, so the response is always on the wire
        // first even for readSingleAsync.
        {
            let mut writer = comm_write.lock().await;
            write_frame(&mut *writer, &response_body)
                .await
                .map_err(SessionError::Transport)?;
        }

        if let Some(payload) = payload {
            payload
                .write_to(&mut data_write)
                .await
                .map_err(SessionError::Transport)?;
        }

        *last_communication.lock().await = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawning_seeds_last_communication_near_now() {
        // Exercises SessionHandle bookkeeping directly, without opening real
        // sockets (covered by the end-to-end tests in services/agent).
        let before = Instant::now();
        let last_communication = Arc::new(Mutex::new(Instant::now()));
        let elapsed = last_communication.lock().await.duration_since(before);
        assert!(elapsed.as_secs() < 1);
    }
}
