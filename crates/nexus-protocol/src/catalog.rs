use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::duration::Duration;

/// The data type carried by a representation's samples. Wire form is the
/// enum's name, unchanged by the usual camelCase rule (it spells the same
/// all-caps convention the host and every other extension already use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NexusDataType {
    #[serde(rename = "UINT8")]
    UInt8,
    #[serde(rename = "INT8")]
    Int8,
    #[serde(rename = "UINT16")]
    UInt16,
    #[serde(rename = "INT16")]
    Int16,
    #[serde(rename = "UINT32")]
    UInt32,
    #[serde(rename = "INT32")]
    Int32,
    #[serde(rename = "UINT64")]
    UInt64,
    #[serde(rename = "INT64")]
    Int64,
    #[serde(rename = "FLOAT32")]
    Float32,
    #[serde(rename = "FLOAT64")]
    Float64,
}

impl NexusDataType {
    /// Bytes per sample, per the fixed table in the data model.
    pub fn element_size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }
}

/// Metadata describing a resource's sample period and element size, used to
/// size read buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Representation {
    pub data_type: NexusDataType,
    pub sample_period: Duration,
}

/// The resource a catalog item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

/// Catalog-level metadata. `additional_properties` is an opaque passthrough
/// bag so extensions can round-trip metadata the core doesn't model
/// (license, contact, readme/license URLs, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMeta {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub additional_properties: serde_json::Map<String, serde_json::Value>,
}

/// A single addressable item within a catalog: the triple of catalog,
/// resource, and representation the communicator needs to size and serve a
/// `readSingleAsync` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub catalog: CatalogMeta,
    pub resource: Resource,
    pub representation: Representation,
}

/// One entry returned by `getCatalogRegistrationsAsync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRegistration {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_leaf: bool,
}

/// The full catalog returned by `getCatalogAsync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub id: String,
    pub items: Vec<CatalogItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn element_sizes_match_the_fixed_table() {
        assert_eq!(NexusDataType::Int8.element_size(), 1);
        assert_eq!(NexusDataType::UInt8.element_size(), 1);
        assert_eq!(NexusDataType::Int16.element_size(), 2);
        assert_eq!(NexusDataType::UInt16.element_size(), 2);
        assert_eq!(NexusDataType::Int32.element_size(), 4);
        assert_eq!(NexusDataType::UInt32.element_size(), 4);
        assert_eq!(NexusDataType::Float32.element_size(), 4);
        assert_eq!(NexusDataType::Int64.element_size(), 8);
        assert_eq!(NexusDataType::UInt64.element_size(), 8);
        assert_eq!(NexusDataType::Float64.element_size(), 8);
    }

    #[test]
    fn representation_round_trips_camel_case_keys() {
        let repr = Representation {
            data_type: NexusDataType::Int64,
            sample_period: Duration::new(StdDuration::from_secs(1)),
        };
        let value = serde_json::to_value(&repr).unwrap();
        assert_eq!(value["dataType"], "INT64");
        assert_eq!(value["samplePeriod"], "0.00:00:01.000000");
        let back: Representation = serde_json::from_value(value).unwrap();
        assert_eq!(back, repr);
    }

    #[test]
    fn catalog_item_tolerates_unknown_fields() {
        let json = serde_json::json!({
            "catalog": {"id": "/a/b", "properties": {}, "somethingNew": 1},
            "resource": {"id": "r1", "properties": {}},
            "representation": {"dataType": "FLOAT64", "samplePeriod": "0.00:00:01.0"},
        });
        let item: CatalogItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.catalog.id, "/a/b");
    }
}
