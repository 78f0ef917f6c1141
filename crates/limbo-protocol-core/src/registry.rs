use crate::codec::{read_remaining, read_varint, write_varint, CodecError, CodecResult};
use crate::error::ProtocolError;
use crate::packets::{Direction, PacketKind, WirePacket};
use crate::state::ConnectionState;
use crate::version::{ProtocolVersion, VersionRange};
use bytes::BytesMut;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

pub type DecodeFn = fn(&mut BytesMut) -> CodecResult<WirePacket>;
pub type EncodeFn = fn(&WirePacket, &mut BytesMut) -> CodecResult<()>;

/// Reads or writes the body of one packet in one layout.
#[derive(Debug, Clone, Copy)]
pub struct PacketCodec {
    kind: PacketKind,
    decode: Option<DecodeFn>,
    encode: Option<EncodeFn>,
}

impl PacketCodec {
    pub const fn serverbound(kind: PacketKind, decode: DecodeFn) -> Self {
        Self {
            kind,
            decode: Some(decode),
            encode: None,
        }
    }

    pub const fn clientbound(kind: PacketKind, encode: EncodeFn) -> Self {
        Self {
            kind,
            decode: None,
            encode: Some(encode),
        }
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    pub fn decode(&self, buf: &mut BytesMut) -> CodecResult<WirePacket> {
        match self.decode {
            Some(decode) => decode(buf),
            None => Err(CodecError::WrongDirection(self.kind)),
        }
    }

    pub fn encode(&self, packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
        match self.encode {
            Some(encode) => encode(packet, buf),
            None => Err(CodecError::WrongDirection(self.kind)),
        }
    }

    fn direction(&self) -> Direction {
        if self.decode.is_some() {
            Direction::Serverbound
        } else {
            Direction::Clientbound
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("packet id 0x{id:02X} registered twice for {version} {state} {direction:?} ({first:?}, {second:?})")]
    Duplicate {
        version: ProtocolVersion,
        state: ConnectionState,
        direction: Direction,
        id: i32,
        first: PacketKind,
        second: PacketKind,
    },
    #[error("{kind:?} registered twice for {version} in {state} state")]
    DuplicateKind {
        version: ProtocolVersion,
        state: ConnectionState,
        kind: PacketKind,
    },
    #[error("{kind:?} registered as {registered:?} but travels {actual:?}")]
    WrongDirection {
        kind: PacketKind,
        registered: Direction,
        actual: Direction,
    },
    #[error("no packet table for {0}")]
    UnknownVersion(ProtocolVersion),
    #[error("{version} is missing {kind:?} in {state} state")]
    Missing {
        version: ProtocolVersion,
        state: ConnectionState,
        kind: PacketKind,
    },
}

type IdKey = (ProtocolVersion, ConnectionState, Direction, i32);
type KindKey = (ProtocolVersion, ConnectionState, PacketKind);

/// Collects registrations for a fixed set of protocol versions.
///
/// Ranges are expanded against that set, so a registration covering
/// versions the server does not support simply contributes nothing.
pub struct PacketRegistryBuilder {
    versions: Vec<ProtocolVersion>,
    by_id: HashMap<IdKey, PacketCodec>,
    by_kind: HashMap<KindKey, (i32, PacketCodec)>,
    error: Option<RegistryError>,
}

impl PacketRegistryBuilder {
    pub fn register(
        &mut self,
        range: impl Into<VersionRange>,
        state: ConnectionState,
        direction: Direction,
        id: i32,
        codec: PacketCodec,
    ) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if codec.kind().direction() != direction || codec.direction() != direction {
            self.error = Some(RegistryError::WrongDirection {
                kind: codec.kind(),
                registered: direction,
                actual: codec.kind().direction(),
            });
            return self;
        }

        let range = range.into();
        let versions: Vec<ProtocolVersion> = self
            .versions
            .iter()
            .copied()
            .filter(|v| range.contains(*v))
            .collect();
        for version in versions {
            if let Some(existing) = self.by_id.get(&(version, state, direction, id)) {
                self.error = Some(RegistryError::Duplicate {
                    version,
                    state,
                    direction,
                    id,
                    first: existing.kind(),
                    second: codec.kind(),
                });
                return self;
            }
            if self.by_kind.contains_key(&(version, state, codec.kind())) {
                self.error = Some(RegistryError::DuplicateKind {
                    version,
                    state,
                    kind: codec.kind(),
                });
                return self;
            }
            self.by_id.insert((version, state, direction, id), codec);
            self.by_kind.insert((version, state, codec.kind()), (id, codec));
        }
        self
    }

    pub fn build(self) -> Result<PacketRegistry, RegistryError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(PacketRegistry {
            versions: self.versions,
            by_id: self.by_id,
            by_kind: self.by_kind,
        })
    }
}

/// Immutable lookup table from `(version, state, direction, id)` to codecs.
/// Built once at startup and shared by every connection.
#[derive(Debug)]
pub struct PacketRegistry {
    versions: Vec<ProtocolVersion>,
    by_id: HashMap<IdKey, PacketCodec>,
    by_kind: HashMap<KindKey, (i32, PacketCodec)>,
}

impl PacketRegistry {
    pub fn builder(versions: &[ProtocolVersion]) -> PacketRegistryBuilder {
        let mut versions = versions.to_vec();
        versions.sort();
        versions.dedup();
        PacketRegistryBuilder {
            versions,
            by_id: HashMap::new(),
            by_kind: HashMap::new(),
            error: None,
        }
    }

    /// Versions this registry was built for, oldest first.
    pub fn versions(&self) -> &[ProtocolVersion] {
        &self.versions
    }

    pub fn supports(&self, version: ProtocolVersion) -> bool {
        self.versions.binary_search(&version).is_ok()
    }

    pub fn resolve(
        &self,
        version: ProtocolVersion,
        state: ConnectionState,
        direction: Direction,
        id: i32,
    ) -> Option<&PacketCodec> {
        self.by_id.get(&(version, state, direction, id))
    }

    /// Numeric id and codec of a packet kind, if the version has it in that state.
    pub fn lookup(
        &self,
        version: ProtocolVersion,
        state: ConnectionState,
        kind: PacketKind,
    ) -> Option<(i32, &PacketCodec)> {
        self.by_kind
            .get(&(version, state, kind))
            .map(|(id, codec)| (*id, codec))
    }

    /// Decode one serverbound frame payload (packet id + body).
    /// Ids nothing is registered for come back as [`WirePacket::Unknown`].
    pub fn decode(
        &self,
        version: ProtocolVersion,
        state: ConnectionState,
        mut frame: BytesMut,
    ) -> CodecResult<WirePacket> {
        let id = read_varint(&mut frame)?;
        match self.resolve(version, state, Direction::Serverbound, id) {
            Some(codec) => {
                trace!("Read {:?} (0x{:02X}) len={}", codec.kind(), id, frame.len());
                codec.decode(&mut frame)
            }
            None => Ok(WirePacket::Unknown {
                id,
                data: read_remaining(&mut frame),
            }),
        }
    }

    /// Encode one clientbound packet into a frame payload (packet id + body).
    pub fn encode(
        &self,
        version: ProtocolVersion,
        state: ConnectionState,
        packet: &WirePacket,
    ) -> Result<BytesMut, ProtocolError> {
        let kind = packet.kind();
        let (id, codec) = self
            .lookup(version, state, kind)
            .ok_or(ProtocolError::NoCodec {
                version,
                state,
                kind,
            })?;
        let mut buf = BytesMut::new();
        write_varint(&mut buf, id);
        codec
            .encode(packet, &mut buf)
            .map_err(|source| ProtocolError::Encode { kind, source })?;
        trace!("Encoded {:?} (0x{:02X}) len={}", kind, id, buf.len());
        Ok(buf)
    }

    /// Check that `version` has every packet in `required`.
    pub fn validate(
        &self,
        version: ProtocolVersion,
        required: &[(ConnectionState, PacketKind)],
    ) -> Result<(), RegistryError> {
        if !self.supports(version) {
            return Err(RegistryError::UnknownVersion(version));
        }
        for &(state, kind) in required {
            if self.lookup(version, state, kind).is_none() {
                return Err(RegistryError::Missing {
                    version,
                    state,
                    kind,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{read_i64, write_string};
    use bytes::BufMut;

    const OLD: ProtocolVersion = ProtocolVersion(47);
    const NEW: ProtocolVersion = ProtocolVersion(767);

    fn decode_ping(buf: &mut BytesMut) -> CodecResult<WirePacket> {
        Ok(WirePacket::PingRequest {
            payload: read_i64(buf)?,
        })
    }

    fn encode_pong(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
        match packet {
            WirePacket::PongResponse { payload } => {
                buf.put_i64(*payload);
                Ok(())
            }
            other => Err(crate::codec::mismatch(PacketKind::PongResponse, other)),
        }
    }

    fn encode_status(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
        if let WirePacket::StatusResponse { json } = packet {
            write_string(buf, json);
        }
        Ok(())
    }

    fn registry() -> PacketRegistry {
        let mut builder = PacketRegistry::builder(&[OLD, NEW]);
        builder
            .register(
                47..=767,
                ConnectionState::Status,
                Direction::Serverbound,
                0x01,
                PacketCodec::serverbound(PacketKind::PingRequest, decode_ping),
            )
            .register(
                47..=767,
                ConnectionState::Status,
                Direction::Clientbound,
                0x01,
                PacketCodec::clientbound(PacketKind::PongResponse, encode_pong),
            )
            .register(
                NEW,
                ConnectionState::Status,
                Direction::Clientbound,
                0x00,
                PacketCodec::clientbound(PacketKind::StatusResponse, encode_status),
            );
        builder.build().unwrap()
    }

    #[test]
    fn test_resolve_is_scoped_by_version_state_and_direction() {
        let registry = registry();
        assert!(registry
            .resolve(OLD, ConnectionState::Status, Direction::Serverbound, 0x01)
            .is_some());
        assert!(registry
            .resolve(OLD, ConnectionState::Login, Direction::Serverbound, 0x01)
            .is_none());
        assert!(registry
            .resolve(OLD, ConnectionState::Status, Direction::Clientbound, 0x00)
            .is_none());
        assert!(registry
            .resolve(NEW, ConnectionState::Status, Direction::Clientbound, 0x00)
            .is_some());
        assert!(!registry.supports(ProtocolVersion(340)));
    }

    #[test]
    fn test_unknown_id_keeps_raw_bytes() {
        let registry = registry();
        let frame = BytesMut::from(&[0x7F, 1, 2, 3][..]);
        let packet = registry
            .decode(OLD, ConnectionState::Status, frame)
            .unwrap();
        assert_eq!(
            packet,
            WirePacket::Unknown {
                id: 0x7F,
                data: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn test_decode_and_encode() {
        let registry = registry();
        let mut frame = BytesMut::new();
        write_varint(&mut frame, 0x01);
        frame.put_i64(42);
        let packet = registry.decode(NEW, ConnectionState::Status, frame).unwrap();
        assert_eq!(packet, WirePacket::PingRequest { payload: 42 });

        let out = registry
            .encode(NEW, ConnectionState::Status, &WirePacket::PongResponse { payload: 42 })
            .unwrap();
        assert_eq!(out[0], 0x01);
        assert_eq!(out.len(), 9);
    }

    #[test]
    fn test_encode_without_codec() {
        let registry = registry();
        let result = registry.encode(
            OLD,
            ConnectionState::Status,
            &WirePacket::StatusResponse { json: "{}".into() },
        );
        assert!(matches!(
            result,
            Err(ProtocolError::NoCodec {
                kind: PacketKind::StatusResponse,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_registration_is_an_error() {
        let mut builder = PacketRegistry::builder(&[NEW]);
        builder
            .register(
                NEW,
                ConnectionState::Status,
                Direction::Serverbound,
                0x01,
                PacketCodec::serverbound(PacketKind::PingRequest, decode_ping),
            )
            .register(
                767..=767,
                ConnectionState::Status,
                Direction::Serverbound,
                0x01,
                PacketCodec::serverbound(PacketKind::StatusRequest, |_| Ok(WirePacket::StatusRequest)),
            );
        assert!(matches!(builder.build(), Err(RegistryError::Duplicate { id: 0x01, .. })));
    }

    #[test]
    fn test_direction_mismatch_is_an_error() {
        let mut builder = PacketRegistry::builder(&[NEW]);
        builder.register(
            NEW,
            ConnectionState::Status,
            Direction::Clientbound,
            0x01,
            PacketCodec::serverbound(PacketKind::PingRequest, decode_ping),
        );
        assert!(matches!(builder.build(), Err(RegistryError::WrongDirection { .. })));
    }

    #[test]
    fn test_validate_reports_gaps() {
        let registry = registry();
        let required = [
            (ConnectionState::Status, PacketKind::PingRequest),
            (ConnectionState::Status, PacketKind::StatusResponse),
        ];
        assert!(registry.validate(NEW, &required).is_ok());
        assert!(matches!(
            registry.validate(OLD, &required),
            Err(RegistryError::Missing {
                kind: PacketKind::StatusResponse,
                ..
            })
        ));
        assert!(matches!(
            registry.validate(ProtocolVersion(340), &required),
            Err(RegistryError::UnknownVersion(_))
        ));
    }
}
