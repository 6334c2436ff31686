//! The remote communicator (C4): JSON-RPC method dispatch against a
//! session's data source. This module never touches either stream itself —
//! it hands [`super::session`] a result value plus an optional bulk
//! payload, so the caller can write the comm response before the data
//! stream, matching §4.4's `Responding` → `EmittingData` ordering.

use std::sync::Arc;

use nexus_protocol::rpc::method;
use nexus_protocol::{CatalogItem, DataSourceContext, DecodeError, DecodeErrorKind, Timestamp};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::datasource::{buffers, DataSource, Logger, ReadRequest};
use crate::error::{CapabilityError, TransportError};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error("Unknown method '{0}'.")]
    UnknownMethod(String),
}

impl DispatchError {
    /// Text for the JSON-RPC `error.message` field; every disposition in
    /// this protocol uses the fixed code `-1` (see `nexus_protocol::rpc`).
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// The filled data/status buffers for a `readSingleAsync` call, to be
/// written to the data stream only after the comm response is on the wire.
pub struct BulkPayload {
    pub data: Vec<u8>,
    pub status: Vec<u8>,
}

impl BulkPayload {
    /// Writes `data` then `status` to the data stream and flushes it. A
    /// failure here is a transport error like any other stream write, not a
    /// data-source [`CapabilityError`] — the call already succeeded.
    pub async fn write_to<W>(&self, data_write: &mut W) -> Result<(), TransportError>
    where
        W: AsyncWrite + Unpin,
    {
        data_write.write_all(&self.data).await?;
        data_write.write_all(&self.status).await?;
        data_write.flush().await?;
        Ok(())
    }
}

/// The outcome of one successful dispatch: the JSON-RPC result value, plus
/// a bulk payload for `readSingleAsync` to be written to the data stream
/// once the caller has written the comm response.
pub struct DispatchOutcome {
    pub result: Value,
    pub payload: Option<BulkPayload>,
}

impl DispatchOutcome {
    fn value(result: Value) -> Self {
        Self { result, payload: None }
    }
}

/// Handles one JSON-RPC request against `data_source`. Performs no I/O on
/// either stream; the caller is responsible for writing the comm response
/// and, if present, the returned bulk payload afterward.
pub async fn dispatch(
    method_name: &str,
    params: &[Value],
    data_source: &mut dyn DataSource,
    logger: Arc<dyn Logger>,
) -> Result<DispatchOutcome, DispatchError> {
    match method_name {
        method::GET_API_VERSION => Ok(DispatchOutcome::value(
            serde_json::json!({ "apiVersion": nexus_protocol::rpc::API_VERSION }),
        )),

        method::SET_CONTEXT => {
            let raw = params
                .first()
                .ok_or_else(|| missing_param(0, "context"))?;
            let context = DataSourceContext::decode(raw)?;
            data_source.set_context(context, logger).await?;
            Ok(DispatchOutcome::value(Value::Null))
        }

        method::GET_CATALOG_REGISTRATIONS => {
            let path = param_str(params, 0, "path")?;
            let registrations = data_source.get_catalog_registrations(path).await?;
            Ok(DispatchOutcome::value(serde_json::json!({ "registrations": registrations })))
        }

        method::GET_CATALOG => {
            let catalog_id = param_str(params, 0, "catalogId")?;
            let catalog = data_source.get_catalog(catalog_id).await?;
            Ok(DispatchOutcome::value(serde_json::json!({ "catalog": catalog })))
        }

        method::GET_TIME_RANGE => {
            let catalog_id = param_str(params, 0, "catalogId")?;
            let (begin, end) = data_source.get_time_range(catalog_id).await?;
            Ok(DispatchOutcome::value(
                serde_json::json!({ "begin": begin.encode(), "end": end.encode() }),
            ))
        }

        method::GET_AVAILABILITY => {
            let catalog_id = param_str(params, 0, "catalogId")?;
            let begin = param_timestamp_seconds(params, 1)?;
            let end = param_timestamp_seconds(params, 2)?;
            let availability = data_source.get_availability(catalog_id, begin, end).await?;
            Ok(DispatchOutcome::value(serde_json::json!({ "availability": availability })))
        }

        method::READ_SINGLE => {
            // Positional params are [begin, end, <reserved>, catalogItem];
            // index 2 is read by the original but its meaning is undocumented,
            // so it is ignored here too (see the spec's open questions).
            let begin = param_timestamp(params, 0)?;
            let end = param_timestamp(params, 1)?;
            let catalog_item: CatalogItem = param_decode(params, 3)?;

            let (data, status) = buffers::allocate(begin, end, &catalog_item.representation);
            let mut request = ReadRequest { catalog_item, data, status };

            data_source
                .read(begin, end, std::slice::from_mut(&mut request), None, None)
                .await?;

            Ok(DispatchOutcome {
                result: Value::Null,
                payload: Some(BulkPayload { data: request.data, status: request.status }),
            })
        }

        // Reserved for a future out-of-band channel; no extension exercises
        // either today, so both are accepted as no-ops.
        method::CANCEL_REQUEST | method::PROGRESS => Ok(DispatchOutcome::value(Value::Null)),

        other => Err(DispatchError::UnknownMethod(other.to_owned())),
    }
}

fn missing_param(index: usize, name: &str) -> DecodeError {
    DecodeError::new(
        format!("params[{index}]"),
        DecodeErrorKind::UnsupportedShape(format!("missing {name}")),
    )
}

fn param_str<'a>(params: &'a [Value], index: usize, name: &str) -> Result<&'a str, DecodeError> {
    params
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| missing_param(index, name))
}

fn param_decode<T: serde::de::DeserializeOwned>(params: &[Value], index: usize) -> Result<T, DecodeError> {
    let raw = params.get(index).ok_or_else(|| missing_param(index, "value"))?;
    serde_json::from_value(raw.clone()).map_err(|e| {
        DecodeError::new(format!("params[{index}]"), DecodeErrorKind::UnsupportedShape(e.to_string()))
    })
}

fn param_timestamp(params: &[Value], index: usize) -> Result<Timestamp, DecodeError> {
    let text = param_str(params, index, "timestamp")?;
    Timestamp::decode(text)
}

fn param_timestamp_seconds(params: &[Value], index: usize) -> Result<Timestamp, DecodeError> {
    let text = param_str(params, index, "timestamp")?;
    Timestamp::decode_seconds(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::registry::SampleDataSource;
    use crate::datasource::{LogLevel, Logger};
    use async_trait::async_trait;

    struct NullLogger;

    #[async_trait]
    impl Logger for NullLogger {
        async fn log(&self, _level: LogLevel, _message: &str) {}
    }

    #[tokio::test]
    async fn get_api_version_returns_the_fixed_version() {
        let mut source = SampleDataSource::default();
        let outcome = dispatch(method::GET_API_VERSION, &[], &mut source, Arc::new(NullLogger))
            .await
            .unwrap();
        assert_eq!(outcome.result["apiVersion"], 1);
        assert!(outcome.payload.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let mut source = SampleDataSource::default();
        let err = dispatch("frobnicateAsync", &[], &mut source, Arc::new(NullLogger))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownMethod(_)));
        assert_eq!(err.message(), "Unknown method 'frobnicateAsync'.");
    }

    #[tokio::test]
    async fn set_context_rejects_missing_resource_locator() {
        let mut source = SampleDataSource::default();
        let params = vec![serde_json::json!({})];
        let err = dispatch(method::SET_CONTEXT, &params, &mut source, Arc::new(NullLogger))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
    }

    #[tokio::test]
    async fn get_availability_wraps_the_result_in_an_object() {
        let mut source = SampleDataSource::default();
        let params = vec![
            serde_json::json!("/SAMPLE/DATA"),
            serde_json::json!("2020-01-01T00:00:00Z"),
            serde_json::json!("2020-01-01T00:01:00Z"),
        ];
        let outcome = dispatch(method::GET_AVAILABILITY, &params, &mut source, Arc::new(NullLogger))
            .await
            .unwrap();
        assert!(outcome.result["availability"].is_number());
    }

    #[tokio::test]
    async fn read_single_returns_a_payload_of_the_exact_byte_lengths_and_a_null_result() {
        let mut source = SampleDataSource::default();
        let catalog = source.get_catalog("/SAMPLE/DATA").await.unwrap();
        let item = catalog.items.into_iter().next().unwrap();
        let params = vec![
            serde_json::json!("2020-01-01T00:00:00.000000Z"),
            serde_json::json!("2020-01-01T00:10:00.000000Z"),
            Value::Null,
            serde_json::to_value(&item).unwrap(),
        ];
        let outcome = dispatch(method::READ_SINGLE, &params, &mut source, Arc::new(NullLogger))
            .await
            .unwrap();

        assert_eq!(outcome.result, Value::Null);
        let payload = outcome.payload.expect("readSingleAsync always returns a bulk payload");
        // 600 one-second samples of INT64 (8 bytes) plus one status byte each.
        assert_eq!(payload.data.len(), 600 * 8);
        assert_eq!(payload.status.len(), 600);
    }
}
