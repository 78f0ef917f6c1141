use crate::adapter::{ProtocolAdapter, ProtocolFeatures, VersionedPacket};
use crate::codec::CodecResult;
use crate::error::ProtocolError;
use crate::packets::InternalPacket;
use crate::registry::{PacketRegistry, RegistryError};
use crate::state::ConnectionState;
use crate::version::ProtocolVersion;
use bytes::BytesMut;

/// The full packet pipeline: registry lookup plus version adaptation.
///
/// `frame payload -> registry -> adapter -> InternalPacket` inbound and the
/// reverse outbound. Immutable once built; share it behind an `Arc`.
pub struct Protocol {
    registry: PacketRegistry,
    adapter: Box<dyn ProtocolAdapter>,
}

impl Protocol {
    /// Pair a registry with an adapter, checking that every version in the
    /// registry has all the packets the adapter needs.
    pub fn new(
        registry: PacketRegistry,
        adapter: Box<dyn ProtocolAdapter>,
    ) -> Result<Self, RegistryError> {
        for &version in registry.versions() {
            registry.validate(version, &adapter.required_packets(version))?;
        }
        Ok(Self { registry, adapter })
    }

    pub fn registry(&self) -> &PacketRegistry {
        &self.registry
    }

    pub fn versions(&self) -> &[ProtocolVersion] {
        self.registry.versions()
    }

    pub fn supports(&self, version: ProtocolVersion) -> bool {
        self.registry.supports(version)
    }

    pub fn newest(&self) -> Option<ProtocolVersion> {
        self.registry.versions().last().copied()
    }

    pub fn oldest(&self) -> Option<ProtocolVersion> {
        self.registry.versions().first().copied()
    }

    pub fn features(&self, version: ProtocolVersion) -> ProtocolFeatures {
        self.adapter.features(version)
    }

    pub fn decode(
        &self,
        version: ProtocolVersion,
        state: ConnectionState,
        frame: BytesMut,
    ) -> CodecResult<InternalPacket> {
        let packet = self.registry.decode(version, state, frame)?;
        self.adapter.to_internal(VersionedPacket {
            version,
            state,
            packet,
        })
    }

    /// Encode into zero or more frame payloads, in send order.
    pub fn encode(
        &self,
        version: ProtocolVersion,
        state: ConnectionState,
        packet: &InternalPacket,
    ) -> Result<Vec<BytesMut>, ProtocolError> {
        self.adapter
            .from_internal(version, packet)?
            .iter()
            .map(|wire| self.registry.encode(version, state, wire))
            .collect()
    }
}
