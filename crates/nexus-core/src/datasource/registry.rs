//! The extension registry (§4.3.1, resolving the corresponding §9 design
//! note): the capability that maps a provider type name to a freshly
//! constructed [`DataSource`] instance per session. Production registries
//! (reading `packages.json`, loading compiled extension binaries) are out
//! of scope per §1; this crate ships only the trait plus a built-in sample
//! implementation used by the end-to-end tests in §8.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nexus_protocol::{
    Catalog, CatalogItem, CatalogMeta, CatalogRegistration, DataSourceContext, Duration,
    NexusDataType, Representation, Resource, Timestamp,
};

use super::{DataSource, Logger, ProgressHandler, ReadHandler, ReadRequest};
use crate::error::CapabilityError;

/// Constructs a fresh [`DataSource`] for a provider type name, once per
/// session.
pub trait DataSourceRegistry: Send + Sync {
    fn create(&self, provider: &str) -> Result<Box<dyn DataSource>, CapabilityError>;
}

/// Provider name served by [`SampleDataSource`].
pub const SAMPLE_PROVIDER: &str = "Nexus.Agent.Sample";

/// Serves [`SAMPLE_PROVIDER`] only; any other name is a [`CapabilityError`].
#[derive(Default)]
pub struct SampleDataSourceRegistry;

impl DataSourceRegistry for SampleDataSourceRegistry {
    fn create(&self, provider: &str) -> Result<Box<dyn DataSource>, CapabilityError> {
        if provider == SAMPLE_PROVIDER {
            Ok(Box::new(SampleDataSource::default()))
        } else {
            Err(CapabilityError::new(format!("Unknown provider '{provider}'.")))
        }
    }
}

const SAMPLE_CATALOG_ID: &str = "/SAMPLE/DATA";

/// A deterministic in-memory data source for integration tests: one catalog
/// holding one `INT64` resource at a 1-second sample period. `read` writes
/// monotonically increasing little-endian timestamps and marks every
/// sample `1` (ok), matching scenario 4 of the testable properties.
#[derive(Default)]
pub struct SampleDataSource {
    context: Option<DataSourceContext>,
}

fn sample_representation() -> Representation {
    Representation {
        data_type: NexusDataType::Int64,
        sample_period: Duration::new(std::time::Duration::from_secs(1)),
    }
}

fn sample_catalog_item() -> CatalogItem {
    CatalogItem {
        catalog: CatalogMeta {
            id: SAMPLE_CATALOG_ID.to_owned(),
            properties: HashMap::new(),
            additional_properties: serde_json::Map::new(),
        },
        resource: Resource { id: "timestamps".to_owned(), properties: HashMap::new() },
        representation: sample_representation(),
    }
}

#[async_trait]
impl DataSource for SampleDataSource {
    async fn set_context(
        &mut self,
        context: DataSourceContext,
        logger: Arc<dyn Logger>,
    ) -> Result<(), CapabilityError> {
        logger
            .log(
                super::LogLevel::Information,
                &format!("context set to {}", context.resource_locator),
            )
            .await;
        self.context = Some(context);
        Ok(())
    }

    async fn get_catalog_registrations(
        &self,
        path: &str,
    ) -> Result<Vec<CatalogRegistration>, CapabilityError> {
        if path == "/" {
            Ok(vec![CatalogRegistration {
                path: SAMPLE_CATALOG_ID.to_owned(),
                title: Some("Sample".to_owned()),
                is_leaf: true,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    async fn get_catalog(&self, catalog_id: &str) -> Result<Catalog, CapabilityError> {
        if catalog_id != SAMPLE_CATALOG_ID {
            return Err(CapabilityError::new(format!("Unknown catalog '{catalog_id}'.")));
        }
        Ok(Catalog { id: catalog_id.to_owned(), items: vec![sample_catalog_item()] })
    }

    async fn get_time_range(&self, catalog_id: &str) -> Result<(Timestamp, Timestamp), CapabilityError> {
        if catalog_id != SAMPLE_CATALOG_ID {
            return Err(CapabilityError::new(format!("Unknown catalog '{catalog_id}'.")));
        }
        let begin = Timestamp(chrono::DateTime::from_timestamp(0, 0).unwrap());
        let end = Timestamp(chrono::Utc::now());
        Ok((begin, end))
    }

    async fn get_availability(
        &self,
        catalog_id: &str,
        _begin: Timestamp,
        _end: Timestamp,
    ) -> Result<f64, CapabilityError> {
        if catalog_id != SAMPLE_CATALOG_ID {
            return Err(CapabilityError::new(format!("Unknown catalog '{catalog_id}'.")));
        }
        Ok(1.0)
    }

    async fn read(
        &self,
        begin: Timestamp,
        _end: Timestamp,
        requests: &mut [ReadRequest],
        _read_handler: Option<Arc<dyn ReadHandler>>,
        _progress_handler: Option<Arc<dyn ProgressHandler>>,
    ) -> Result<(), CapabilityError> {
        for request in requests {
            let elem_size = request.catalog_item.representation.data_type.element_size();
            if elem_size == 0 {
                continue;
            }
            let count = request.data.len() / elem_size;
            let base = begin.0.timestamp();
            for k in 0..count {
                let value = base + k as i64;
                let bytes = value.to_le_bytes();
                request.data[k * elem_size..(k + 1) * elem_size].copy_from_slice(&bytes[..elem_size]);
                request.status[k] = 1;
            }
        }
        Ok(())
    }
}
