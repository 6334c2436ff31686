//! nexus-core: the pairing dispatcher, remote communicator, and connection
//! watchdog that together form the agent's TCP-facing runtime. The wire
//! codec and domain value types live in `nexus_protocol`; this crate wires
//! them to real sockets and a [`datasource::DataSource`] implementation.

pub mod config;
pub mod datasource;
pub mod dispatch;
pub mod error;
pub mod transport;

pub use config::Config;
pub use dispatch::{accept_loop, SessionTable, SlotTable};
