use crate::codec::CodecError;
use crate::packets::PacketKind;
use crate::state::ConnectionState;
use crate::version::ProtocolVersion;
use std::time::Duration;
use thiserror::Error;

/// A packet or request that is well-formed but not acceptable in the
/// current state. Always terminates the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(ProtocolVersion),
    #[error("invalid handshake intent {0}")]
    InvalidIntent(i32),
    #[error("illegal state transition {from} -> {to}")]
    IllegalTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
    #[error("unexpected {packet} packet in {state} state")]
    UnexpectedPacket {
        state: ConnectionState,
        packet: &'static str,
    },
    #[error("unknown packet 0x{id:02X} in {state} state")]
    UnknownPacket { state: ConnectionState, id: i32 },
    #[error("no {kind:?} packet registered for {version} in {state} state")]
    NoCodec {
        version: ProtocolVersion,
        state: ConnectionState,
        kind: PacketKind,
    },
    #[error("failed to encode {kind:?}: {source}")]
    Encode {
        kind: PacketKind,
        #[source]
        source: CodecError,
    },
    #[error("{0} cannot be sent to a client")]
    NotClientbound(&'static str),
    #[error("login rejected: {0}")]
    Rejected(String),
}

/// A deadline expired.
#[derive(Debug, Error)]
pub enum TimeoutError {
    #[error("no keep-alive response within {0:?}")]
    KeepAlive(Duration),
    #[error("outbound data not flushed within {0:?}")]
    Write(Duration),
    #[error("no packet received within {limit:?} in {state} state")]
    Idle {
        state: ConnectionState,
        limit: Duration,
    },
}
