//! Connection watchdog (C5): periodically reaps half-paired slots and
//! sessions that have gone quiet.

use std::time::{Duration as StdDuration, Instant};

use tracing::{info, warn};

use super::pairing::{SessionTable, SlotTable};

/// How often the watchdog wakes up to scan both tables.
pub const TICK_INTERVAL: StdDuration = StdDuration::from_secs(600);
/// A slot or session idle longer than this is considered dead.
pub const DEAD_THRESHOLD: StdDuration = StdDuration::from_secs(60);

/// Runs until the task is aborted. Intended to be spawned once alongside
/// the accept loop.
pub async fn run(slots: SlotTable, sessions: SessionTable) {
    run_with(slots, sessions, TICK_INTERVAL, DEAD_THRESHOLD).await
}

/// Like [`run`], but with an overridable tick interval and dead threshold —
/// used by tests so the watchdog's real 600-second tick isn't on the
/// critical path of the test suite.
pub async fn run_with(
    slots: SlotTable,
    sessions: SessionTable,
    tick_interval: StdDuration,
    dead_threshold: StdDuration,
) {
    let mut interval = tokio::time::interval(tick_interval);
    loop {
        interval.tick().await;
        reap_stale_slots(&slots, dead_threshold).await;
        reap_stale_sessions(&sessions, dead_threshold).await;
    }
}

async fn reap_stale_slots(slots: &SlotTable, dead_threshold: StdDuration) {
    let mut slots = slots.lock().await;
    let before = slots.len();
    slots.retain(|id, slot| {
        let alive = slot.registered_at().elapsed() < dead_threshold;
        if !alive {
            warn!(%id, "reaping half-paired connection");
        }
        alive
    });
    if slots.len() != before {
        info!(reaped = before - slots.len(), "watchdog reaped stale slots");
    }
}

async fn reap_stale_sessions(sessions: &SessionTable, dead_threshold: StdDuration) {
    let mut dead = Vec::new();
    {
        let sessions = sessions.lock().await;
        for (id, handle) in sessions.iter() {
            let last = *handle.last_communication.lock().await;
            if last.elapsed() >= dead_threshold {
                dead.push(*id);
            }
        }
    }

    if dead.is_empty() {
        return;
    }

    let mut sessions = sessions.lock().await;
    for id in dead {
        if let Some(handle) = sessions.remove(&id) {
            warn!(%id, "reaping stale session");
            handle.join.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::slot::PairingSlot;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::Mutex;

    async fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (accepted, connected) =
            tokio::join!(listener.accept(), TcpStream::connect(addr));
        (accepted.unwrap().0, connected.unwrap())
    }

    #[tokio::test]
    async fn reaps_slots_older_than_the_dead_threshold() {
        let (comm, _peer) = loopback_pair().await;
        let slots: SlotTable = Arc::new(Mutex::new(HashMap::new()));
        let id = uuid::Uuid::new_v4();
        let stale_at = Instant::now() - DEAD_THRESHOLD - StdDuration::from_secs(1);
        slots
            .lock()
            .await
            .insert(id, PairingSlot::AwaitingData { comm, registered_at: stale_at });

        reap_stale_slots(&slots, DEAD_THRESHOLD).await;

        assert!(slots.lock().await.is_empty());
    }

    #[tokio::test]
    async fn keeps_fresh_slots() {
        let (comm, _peer) = loopback_pair().await;
        let slots: SlotTable = Arc::new(Mutex::new(HashMap::new()));
        let id = uuid::Uuid::new_v4();
        slots
            .lock()
            .await
            .insert(id, PairingSlot::AwaitingData { comm, registered_at: Instant::now() });

        reap_stale_slots(&slots, DEAD_THRESHOLD).await;

        assert_eq!(slots.lock().await.len(), 1);
    }
}
