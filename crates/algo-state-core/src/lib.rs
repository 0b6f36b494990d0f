//! algo-state-core — Algorand application state decoding
//!
//! Decodes the global, local and box state that algod reports for an
//! application, and provides a small read-only client to fetch it.

pub mod address;
pub mod boxes;
pub mod client;
pub mod config;
pub mod decoder;
pub mod differ;
pub mod error;
pub mod exporter;
pub mod inspector;
pub mod types;

#[cfg(test)]
mod test_server;

pub use address::{application_address, decode_address, encode_address};
pub use boxes::BoxEntry;
pub use client::AlgodClient;
pub use config::NodeConfig;
pub use decoder::{decode_state, decode_state_json, decode_uint_be, str_or_hex};
pub use differ::StateDiffer;
pub use error::{AddressError, ConfigError, DecodeError, NodeError};
pub use exporter::StateExporter;
pub use inspector::StateInspector;
pub use types::*;
