//! A harness client speaking the agent's raw comm/data pairing protocol,
//! for the end-to-end tests in `services/agent/tests`. Grounded on the
//! teacher workspace's `rt-test-utils` pattern of shipping a small
//! test-only client alongside the production crates rather than faking the
//! wire protocol with mocks.

use std::net::SocketAddr;

use nexus_core::transport::{read_frame, write_frame};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use uuid::Uuid;

/// One client-side session: a paired comm/data connection plus a request id
/// counter.
pub struct TestClient {
    pub connection_id: Uuid,
    comm: TcpStream,
    data: TcpStream,
    next_id: u64,
}

impl TestClient {
    /// Connects both halves to `addr` under a freshly generated connection
    /// id and sends each half's preamble.
    pub async fn connect(addr: SocketAddr) -> std::io::Result<Self> {
        Self::connect_with_id(addr, Uuid::new_v4()).await
    }

    /// Like [`connect`](Self::connect), but under a caller-chosen connection
    /// id — used by tests that reuse an id freed by the watchdog.
    pub async fn connect_with_id(addr: SocketAddr, connection_id: Uuid) -> std::io::Result<Self> {
        let mut comm = TcpStream::connect(addr).await?;
        let mut data = TcpStream::connect(addr).await?;

        send_preamble(&mut comm, connection_id, b"comm").await?;
        send_preamble(&mut data, connection_id, b"data").await?;

        Ok(Self { connection_id, comm, data, next_id: 1 })
    }

    /// Connects only the comm half, for tests exercising the pairing
    /// watchdog against a half-paired connection.
    pub async fn connect_comm_only(addr: SocketAddr) -> std::io::Result<(Uuid, TcpStream)> {
        let connection_id = Uuid::new_v4();
        let mut comm = TcpStream::connect(addr).await?;
        send_preamble(&mut comm, connection_id, b"comm").await?;
        Ok((connection_id, comm))
    }

    /// Writes a JSON-RPC request frame and returns its id, without waiting
    /// for a response — used by tests that need to observe notifications
    /// interleaved ahead of the matching response.
    pub async fn send_request(&mut self, method: &str, params: Vec<Value>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let body = serde_json::to_vec(&request).expect("request always serializes");
        write_frame(&mut self.comm, &body).await.expect("writing request frame");
        id
    }

    /// Sends a JSON-RPC request and returns its response envelope, skipping
    /// past (and discarding) any `log` notifications the call emits first —
    /// mirroring how a real host client tolerates interleaved notifications
    /// ahead of the response they preceded.
    pub async fn call(&mut self, method: &str, params: Vec<Value>) -> Value {
        let id = self.send_request(method, params).await;

        loop {
            let envelope = self.read_envelope().await;
            if envelope.get("id").map(|v| v == &json!(id)).unwrap_or(false) {
                return envelope;
            }
        }
    }

    /// Sends a JSON-RPC notification (no `id` field); the agent is expected
    /// to close the session in response.
    pub async fn send_notification(&mut self, method: &str, params: Vec<Value>) {
        let notification = json!({ "jsonrpc": "2.0", "method": method, "params": params });
        let body = serde_json::to_vec(&notification).expect("notification always serializes");
        write_frame(&mut self.comm, &body).await.expect("writing notification frame");
    }

    /// Sends an arbitrary envelope verbatim, bypassing the usual
    /// `jsonrpc: "2.0"` construction — used by tests exercising malformed
    /// or non-`2.0` envelopes.
    pub async fn send_raw(&mut self, envelope: Value) {
        let body = serde_json::to_vec(&envelope).expect("envelope always serializes");
        write_frame(&mut self.comm, &body).await.expect("writing raw envelope frame");
    }

    /// Reads a single framed JSON envelope off the comm stream, without
    /// interpreting it as either a response or a notification.
    pub async fn read_envelope(&mut self) -> Value {
        let body = read_frame(&mut self.comm)
            .await
            .expect("reading a framed envelope")
            .expect("agent closed the comm stream unexpectedly");
        serde_json::from_slice(&body).expect("envelope is valid JSON")
    }

    /// Reads exactly `len` bytes pushed on the data stream by a
    /// `readSingleAsync` call.
    pub async fn read_data_exact(&mut self, len: usize) -> Vec<u8> {
        use tokio::io::AsyncReadExt;
        let mut buf = vec![0u8; len];
        self.data.read_exact(&mut buf).await.expect("reading data payload");
        buf
    }

    /// Reads the next comm-stream frame and reports whether it was a clean
    /// close (`Ok(None)` from [`read_frame`]) rather than another envelope —
    /// used to assert the agent dropped a session after a protocol error.
    pub async fn expect_closed(&mut self) -> bool {
        matches!(read_frame(&mut self.comm).await, Ok(None) | Err(_))
    }

    pub async fn shutdown(&mut self) {
        let _ = self.comm.shutdown().await;
        let _ = self.data.shutdown().await;
    }
}

async fn send_preamble(stream: &mut TcpStream, id: Uuid, role: &[u8; 4]) -> std::io::Result<()> {
    stream.write_all(id.hyphenated().to_string().as_bytes()).await?;
    stream.write_all(role).await?;
    stream.flush().await
}
