//! Per-state packet handlers.
//!
//! Handlers never touch the socket: they read the shared context, update
//! the session's data and return the [`Action`]s to perform, in order.

pub mod commands;
pub mod configuration;
pub mod handshake;
pub mod login;
pub mod play;
pub mod status;

use crate::context::{OnlineGuard, ServerContext};
use limbo_protocol_core::{
    CompressionSettings, ConnectionState, InternalPacket, ProtocolError, ProtocolVersion,
};
use limbo_types::{GameProfile, TextComponent, Vec3d};
use std::net::SocketAddr;

/// Vanilla's flying speed.
pub const DEFAULT_FLYING_SPEED: f32 = 0.05;

/// One step for the session to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Encode in the current state and write.
    Send(InternalPacket),
    EnableCompression(CompressionSettings),
    EnableEncryption([u8; 16]),
    Transition(ConnectionState),
    /// Send a disconnect reason if the state has a channel for it, then close.
    Disconnect(TextComponent),
    Close,
}

/// The client packet the session is waiting on before it can move on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Awaiting {
    #[default]
    Nothing,
    /// The proxy's answer to a login plugin request, with the name the
    /// client gave in Login Start.
    ForwardingResponse { message_id: i32, name: String },
    EncryptionResponse { verify_token: Vec<u8> },
    LoginAcknowledged,
    KnownPacks,
    FinishConfigurationAck,
    ConfigurationAcknowledged,
}

/// Everything one session knows about its client.
#[derive(Debug)]
pub struct SessionData {
    pub peer: SocketAddr,
    /// The player's address: the peer, or whatever the proxy forwarded.
    pub address: SocketAddr,
    pub state: ConnectionState,
    /// Layout used for this connection. Until the handshake names a
    /// supported version this is the newest one.
    pub version: ProtocolVersion,
    /// What the client asked for in its handshake.
    pub intent: Option<ConnectionState>,
    pub client_protocol: i32,
    pub handshake_address: String,
    pub profile: Option<GameProfile>,
    pub awaiting: Awaiting,
    pub entity_id: Option<i32>,
    pub position: Vec3d,
    pub next_teleport_id: i32,
    pub locale: Option<String>,
    /// The `max_players` slot, taken at Login Start.
    pub slot: Option<OnlineGuard>,
    pub status_answered: bool,
    pub allow_flying: bool,
    pub flying: bool,
    pub flying_speed: f32,
}

impl SessionData {
    pub fn new(peer: SocketAddr, default_version: ProtocolVersion) -> Self {
        Self {
            peer,
            address: peer,
            state: ConnectionState::Handshake,
            version: default_version,
            intent: None,
            client_protocol: default_version.number(),
            handshake_address: String::new(),
            profile: None,
            awaiting: Awaiting::Nothing,
            entity_id: None,
            position: Vec3d::new(0.0, 0.0, 0.0),
            next_teleport_id: 1,
            locale: None,
            slot: None,
            status_answered: false,
            allow_flying: false,
            flying: false,
            flying_speed: DEFAULT_FLYING_SPEED,
        }
    }

    /// Name for log lines: the player once known, the address before.
    pub fn display_name(&self) -> String {
        match &self.profile {
            Some(profile) => profile.name.clone(),
            None => self.address.to_string(),
        }
    }
}

/// Move the player to spawn.
pub(crate) fn teleport_to_spawn(ctx: &ServerContext, data: &mut SessionData) -> InternalPacket {
    let metadata = ctx.world.metadata();
    data.position = metadata.spawn;
    let teleport_id = data.next_teleport_id;
    data.next_teleport_id = data.next_teleport_id.wrapping_add(1).max(1);
    InternalPacket::PlayerPositionSync {
        position: metadata.spawn,
        yaw: metadata.spawn_yaw,
        pitch: metadata.spawn_pitch,
        teleport_id,
    }
}

/// The error for a packet a state has no use for. Ids nothing is registered
/// for are reported as unknown.
pub(crate) fn unexpected(state: ConnectionState, packet: InternalPacket) -> ProtocolError {
    match packet {
        InternalPacket::Unknown { packet_id, .. } => ProtocolError::UnknownPacket {
            state,
            id: packet_id,
        },
        other => ProtocolError::UnexpectedPacket {
            state,
            packet: other.name(),
        },
    }
}
