// nexus-protocol: wire codec and domain value types shared between the
// Nexus agent and the data sources it hosts. Keys on the wire are
// lowerCamelCase; internal identifiers are snake_case (see `casing`).

pub mod casing;
pub mod catalog;
pub mod context;
pub mod duration;
pub mod error;
pub mod rpc;
pub mod timestamp;

pub use catalog::{Catalog, CatalogItem, CatalogMeta, CatalogRegistration, NexusDataType, Representation, Resource};
pub use context::DataSourceContext;
pub use duration::Duration;
pub use error::{DecodeError, DecodeErrorKind};
pub use timestamp::Timestamp;
