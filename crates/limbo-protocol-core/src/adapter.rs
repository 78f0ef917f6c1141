use crate::codec::CodecResult;
use crate::error::ProtocolError;
use crate::packets::{InternalPacket, PacketKind, WirePacket};
use crate::state::ConnectionState;
use crate::version::ProtocolVersion;

/// A decoded packet still in the layout of the version that sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedPacket {
    pub version: ProtocolVersion,
    pub state: ConnectionState,
    pub packet: WirePacket,
}

/// What a protocol version can do, as far as session logic cares.
///
/// Handlers branch on these flags instead of on version numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolFeatures {
    /// Login is followed by an explicit Configuration exchange.
    pub configuration_state: bool,
    /// The client takes part in the known-packs negotiation.
    pub known_packs: bool,
    /// The server may send a Play client back into Configuration.
    pub reconfiguration: bool,
    /// The client renders streamed chunk columns.
    pub chunk_streaming: bool,
    /// Keep-alive ids fit in an i32 on the wire.
    pub narrow_keep_alive: bool,
    /// Boss bars exist.
    pub boss_bar: bool,
    /// Login plugin requests exist (1.13+).
    pub login_plugin: bool,
    /// The server can hand the client over to another server.
    pub transfer: bool,
}

/// Converts between version-specific wire packets and [`InternalPacket`].
///
/// This is the only place allowed to branch on protocol version numbers.
pub trait ProtocolAdapter: Send + Sync {
    fn features(&self, version: ProtocolVersion) -> ProtocolFeatures;

    /// Normalize an incoming packet, filling in defaults for fields the
    /// version does not send.
    fn to_internal(&self, packet: VersionedPacket) -> CodecResult<InternalPacket>;

    /// Lower an outgoing packet for `version`. One internal packet may
    /// become zero, one, or several wire packets.
    fn from_internal(
        &self,
        version: ProtocolVersion,
        packet: &InternalPacket,
    ) -> Result<Vec<WirePacket>, ProtocolError>;

    /// Packets `version` must have registered for a session to work.
    fn required_packets(&self, version: ProtocolVersion) -> Vec<(ConnectionState, PacketKind)>;
}
