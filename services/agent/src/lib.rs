//! Bootstrap for the Nexus agent binary: assembles configuration, the
//! data-source registry, and the pairing dispatcher, then runs the accept
//! loop and watchdog side by side until shut down.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nexus_core::config::Config;
use nexus_core::datasource::registry::{DataSourceRegistry, SampleDataSourceRegistry};
use nexus_core::dispatch::{accept_loop, watchdog, SessionTable, SlotTable};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

/// A running agent: the accept loop and watchdog tasks, plus the listening
/// address actually bound (useful in tests that bind port 0).
pub struct Agent {
    pub local_addr: SocketAddr,
    accept_task: tokio::task::JoinHandle<()>,
    watchdog_task: tokio::task::JoinHandle<()>,
    sessions: SessionTable,
}

impl Agent {
    /// Binds `config.listen_address:listen_port` and spawns the accept loop
    /// and watchdog against `registry`, using the watchdog's production
    /// tick interval and dead threshold.
    pub async fn start(config: Config, registry: Arc<dyn DataSourceRegistry>) -> std::io::Result<Self> {
        Self::start_with_watchdog_tuning(
            config,
            registry,
            watchdog::TICK_INTERVAL,
            watchdog::DEAD_THRESHOLD,
        )
        .await
    }

    /// Like [`start`](Self::start), but with an overridable watchdog tick
    /// interval and dead threshold — used by tests that need to observe
    /// reaping without waiting out the real 600-second tick.
    pub async fn start_with_watchdog_tuning(
        config: Config,
        registry: Arc<dyn DataSourceRegistry>,
        tick_interval: Duration,
        dead_threshold: Duration,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.listen_address, config.listen_port)).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, provider = %config.provider, "agent listening");

        let slots: SlotTable = Arc::new(Mutex::new(HashMap::new()));
        let sessions: SessionTable = Arc::new(Mutex::new(HashMap::new()));

        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&slots),
            Arc::clone(&sessions),
            registry,
            config.provider,
        ));
        let watchdog_task =
            tokio::spawn(watchdog::run_with(slots, Arc::clone(&sessions), tick_interval, dead_threshold));

        Ok(Self { local_addr, accept_task, watchdog_task, sessions })
    }

    /// Binds an ephemeral loopback port hosting the built-in sample data
    /// source. Used by the end-to-end tests.
    pub async fn start_sample(listen_port: u16) -> std::io::Result<Self> {
        let mut config = Config::from_reader(|_| None);
        config.listen_address = "127.0.0.1".parse().unwrap();
        config.listen_port = listen_port;
        Self::start(config, Arc::new(SampleDataSourceRegistry)).await
    }

    /// Cancels the accept task, the watchdog, and every outstanding session
    /// task (§4.5). Each session is responsible for releasing its own
    /// streams when its task is aborted.
    pub async fn shutdown(&self) {
        self.accept_task.abort();
        self.watchdog_task.abort();
        for (_, handle) in self.sessions.lock().await.drain() {
            handle.join.abort();
        }
    }
}
