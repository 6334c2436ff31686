//! The data-source port (C3): the fixed capability the communicator
//! invokes. Implementers are opaque extensions; the core only knows these
//! six operations plus the logger it hands them.

pub mod buffers;
pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use nexus_protocol::{Catalog, CatalogItem, CatalogRegistration, DataSourceContext, Timestamp};

use crate::error::CapabilityError;

/// Mirrors the standard five-level logging severity the host expects in
/// the `log` notification's level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Trace => "Trace",
            Self::Debug => "Debug",
            Self::Information => "Information",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Critical => "Critical",
        }
    }
}

/// Emits a `log` JSON-RPC notification. Implementations must serialize
/// under the session's comm-write mutex so notifications never interleave
/// with response frames.
#[async_trait]
pub trait Logger: Send + Sync {
    async fn log(&self, level: LogLevel, message: &str);
}

/// A data source may request a secondary read of an unrelated resource
/// path; the agent routes this back out as a separate RPC call. No
/// extension exercises this in the single-request contract today, so the
/// communicator passes `None` whenever it has no handler wired.
#[async_trait]
pub trait ReadHandler: Send + Sync {
    async fn read(&self, resource_path: &str) -> Result<(), CapabilityError>;
}

/// Reports read progress in `[0, 1]`.
pub trait ProgressHandler: Send + Sync {
    fn report(&self, progress: f64);
}

/// A single item's read buffers, allocated by the communicator before
/// invoking `read` and owned by the call for its duration.
pub struct ReadRequest {
    pub catalog_item: CatalogItem,
    pub data: Vec<u8>,
    pub status: Vec<u8>,
}

/// The capability a data-source extension implements. One instance is
/// constructed per session by the [`registry::DataSourceRegistry`].
#[async_trait]
pub trait DataSource: Send {
    async fn set_context(
        &mut self,
        context: DataSourceContext,
        logger: Arc<dyn Logger>,
    ) -> Result<(), CapabilityError>;

    async fn get_catalog_registrations(
        &self,
        path: &str,
    ) -> Result<Vec<CatalogRegistration>, CapabilityError>;

    async fn get_catalog(&self, catalog_id: &str) -> Result<Catalog, CapabilityError>;

    async fn get_time_range(&self, catalog_id: &str) -> Result<(Timestamp, Timestamp), CapabilityError>;

    async fn get_availability(
        &self,
        catalog_id: &str,
        begin: Timestamp,
        end: Timestamp,
    ) -> Result<f64, CapabilityError>;

    /// The current contract defines single-request reads; the port accepts
    /// a list to reserve extensibility for future multi-request calls.
    async fn read(
        &self,
        begin: Timestamp,
        end: Timestamp,
        requests: &mut [ReadRequest],
        read_handler: Option<Arc<dyn ReadHandler>>,
        progress_handler: Option<Arc<dyn ProgressHandler>>,
    ) -> Result<(), CapabilityError>;
}
