//! Packet tables and the version adapter for every supported Minecraft
//! protocol, from 1.8 to 1.21.

pub mod adapter;
pub mod blocks;
pub mod chunk;
pub mod codecs;
pub mod registries;
pub mod tables;
pub mod text;

pub use adapter::MultiVersionAdapter;
pub use tables::build_registry;

use limbo_protocol_core::{Protocol, ProtocolVersion, RegistryError};
use tracing::debug;

/// Every protocol version with a packet table, oldest first.
pub const SUPPORTED_VERSIONS: &[ProtocolVersion] = &[
    ProtocolVersion::V1_8,
    ProtocolVersion::V1_12_2,
    ProtocolVersion::V1_20,
    ProtocolVersion::V1_20_2,
    ProtocolVersion::V1_20_3,
    ProtocolVersion::V1_20_5,
    ProtocolVersion::V1_21,
];

/// Build the full pipeline for `versions`, validating each table against
/// what the adapter needs.
pub fn build_protocol(versions: &[ProtocolVersion]) -> Result<Protocol, RegistryError> {
    if let Some(&unknown) = versions.iter().find(|v| !SUPPORTED_VERSIONS.contains(v)) {
        return Err(RegistryError::UnknownVersion(unknown));
    }
    let registry = build_registry(versions)?;
    let protocol = Protocol::new(registry, Box::new(MultiVersionAdapter::new()))?;
    debug!("Packet tables ready for {} protocol versions", protocol.versions().len());
    Ok(protocol)
}
