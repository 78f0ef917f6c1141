use limbo_nbt::NbtValue;
use limbo_types::{
    BlockPos, BlockState, BossBarColor, BossBarDivision, Dimension, GameMode, GameProfile,
    ProfileProperty, TextComponent, Vec3d,
};
use std::sync::Arc;
use uuid::Uuid;

/// Which way a packet travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Serverbound,
    Clientbound,
}

/// Version-independent internal packet representation.
///
/// Handlers only ever see and produce these. The version adapter converts
/// between them and the per-version [`WirePacket`] layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalPacket {
    // === Handshake (serverbound) ===
    Handshake {
        protocol_version: i32,
        server_address: String,
        server_port: u16,
        next_state: i32,
    },

    // === Status ===
    StatusRequest,
    StatusResponse {
        json: String,
    },
    PingRequest {
        payload: i64,
    },
    PongResponse {
        payload: i64,
    },

    // === Login (serverbound) ===
    /// Always carries a UUID; versions that do not send one get the offline UUID.
    LoginStart {
        name: String,
        uuid: Uuid,
    },
    EncryptionResponse {
        shared_secret: Vec<u8>,
        verify_token: Vec<u8>,
    },
    LoginAcknowledged,
    /// `data` is `None` when the client did not understand the request.
    LoginPluginResponse {
        message_id: i32,
        data: Option<Vec<u8>>,
    },

    // === Login (clientbound) ===
    EncryptionRequest {
        server_id: String,
        public_key: Vec<u8>,
        verify_token: Vec<u8>,
    },
    SetCompression {
        threshold: i32,
    },
    LoginSuccess {
        profile: GameProfile,
    },
    LoginPluginRequest {
        message_id: i32,
        channel: String,
        data: Vec<u8>,
    },

    // === Configuration (serverbound) ===
    ClientInformation {
        locale: String,
        view_distance: i8,
    },
    PluginMessage {
        channel: String,
        data: Vec<u8>,
    },
    FinishConfigurationAck,
    KnownPacksResponse {
        packs: Vec<KnownPack>,
    },

    // === Configuration (clientbound) ===
    /// Send every synchronized registry the client needs to render the world.
    Registries,
    /// Offer the vanilla data pack matching the client's version.
    RequestKnownPacks,
    FinishConfiguration,

    // === Play (clientbound) ===
    JoinGame {
        entity_id: i32,
        game_mode: GameMode,
        hardcore: bool,
        dimension: Dimension,
        max_players: i32,
        view_distance: i32,
        simulation_distance: i32,
        reduced_debug_info: bool,
        is_flat: bool,
        hashed_seed: i64,
    },
    PlayerPositionSync {
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        teleport_id: i32,
    },
    SpawnPosition {
        position: BlockPos,
        angle: f32,
    },
    KeepAlive {
        id: i64,
    },
    ServerBrand {
        brand: String,
    },
    ChunkData {
        chunk_x: i32,
        chunk_z: i32,
        column: Arc<ChunkColumn>,
    },
    SetCenterChunk {
        chunk_x: i32,
        chunk_z: i32,
    },
    /// Tell the client to leave the loading screen once chunks arrive.
    StartWaitingForChunks,
    UpdateTime {
        world_age: i64,
        time_of_day: i64,
    },
    SystemMessage {
        content: TextComponent,
    },
    ActionBar {
        content: TextComponent,
    },
    TabList {
        header: TextComponent,
        footer: TextComponent,
    },
    BossBar {
        uuid: Uuid,
        title: TextComponent,
        health: f32,
        color: BossBarColor,
        division: BossBarDivision,
    },
    /// Title and/or subtitle with timings in ticks.
    Title {
        title: Option<TextComponent>,
        subtitle: Option<TextComponent>,
        fade_in: i32,
        stay: i32,
        fade_out: i32,
    },
    StartConfiguration,
    PlayerAbilities {
        allow_flying: bool,
        flying: bool,
        flying_speed: f32,
    },
    /// Send the client to another server (1.20.5+).
    Transfer {
        host: String,
        port: u16,
    },

    // === Play (serverbound) ===
    KeepAliveResponse {
        id: i64,
    },
    ChatMessage {
        message: String,
    },
    /// A command without its leading slash.
    ChatCommand {
        command: String,
    },
    ConfirmTeleport {
        teleport_id: i32,
    },
    PlayerMove {
        position: Vec3d,
        rotation: Option<(f32, f32)>,
        on_ground: bool,
    },
    ConfigurationAcknowledged,
    /// The client started or stopped flying.
    ClientAbilities {
        flying: bool,
    },

    // === Any state ===
    Disconnect {
        reason: TextComponent,
    },
    /// A packet id nothing is registered for; the body is kept undecoded.
    Unknown {
        packet_id: i32,
        data: Vec<u8>,
    },
}

impl InternalPacket {
    pub fn name(&self) -> &'static str {
        match self {
            InternalPacket::Handshake { .. } => "Handshake",
            InternalPacket::StatusRequest => "StatusRequest",
            InternalPacket::StatusResponse { .. } => "StatusResponse",
            InternalPacket::PingRequest { .. } => "PingRequest",
            InternalPacket::PongResponse { .. } => "PongResponse",
            InternalPacket::LoginStart { .. } => "LoginStart",
            InternalPacket::EncryptionResponse { .. } => "EncryptionResponse",
            InternalPacket::LoginAcknowledged => "LoginAcknowledged",
            InternalPacket::LoginPluginResponse { .. } => "LoginPluginResponse",
            InternalPacket::EncryptionRequest { .. } => "EncryptionRequest",
            InternalPacket::SetCompression { .. } => "SetCompression",
            InternalPacket::LoginSuccess { .. } => "LoginSuccess",
            InternalPacket::LoginPluginRequest { .. } => "LoginPluginRequest",
            InternalPacket::ClientInformation { .. } => "ClientInformation",
            InternalPacket::PluginMessage { .. } => "PluginMessage",
            InternalPacket::FinishConfigurationAck => "FinishConfigurationAck",
            InternalPacket::KnownPacksResponse { .. } => "KnownPacksResponse",
            InternalPacket::Registries => "Registries",
            InternalPacket::RequestKnownPacks => "RequestKnownPacks",
            InternalPacket::FinishConfiguration => "FinishConfiguration",
            InternalPacket::JoinGame { .. } => "JoinGame",
            InternalPacket::PlayerPositionSync { .. } => "PlayerPositionSync",
            InternalPacket::SpawnPosition { .. } => "SpawnPosition",
            InternalPacket::KeepAlive { .. } => "KeepAlive",
            InternalPacket::ServerBrand { .. } => "ServerBrand",
            InternalPacket::ChunkData { .. } => "ChunkData",
            InternalPacket::SetCenterChunk { .. } => "SetCenterChunk",
            InternalPacket::StartWaitingForChunks => "StartWaitingForChunks",
            InternalPacket::UpdateTime { .. } => "UpdateTime",
            InternalPacket::SystemMessage { .. } => "SystemMessage",
            InternalPacket::ActionBar { .. } => "ActionBar",
            InternalPacket::TabList { .. } => "TabList",
            InternalPacket::BossBar { .. } => "BossBar",
            InternalPacket::Title { .. } => "Title",
            InternalPacket::StartConfiguration => "StartConfiguration",
            InternalPacket::PlayerAbilities { .. } => "PlayerAbilities",
            InternalPacket::Transfer { .. } => "Transfer",
            InternalPacket::KeepAliveResponse { .. } => "KeepAliveResponse",
            InternalPacket::ChatMessage { .. } => "ChatMessage",
            InternalPacket::ChatCommand { .. } => "ChatCommand",
            InternalPacket::ConfirmTeleport { .. } => "ConfirmTeleport",
            InternalPacket::PlayerMove { .. } => "PlayerMove",
            InternalPacket::ConfigurationAcknowledged => "ConfigurationAcknowledged",
            InternalPacket::ClientAbilities { .. } => "ClientAbilities",
            InternalPacket::Disconnect { .. } => "Disconnect",
            InternalPacket::Unknown { .. } => "Unknown",
        }
    }
}

/// Identity of a packet on the wire, independent of its numeric id.
///
/// The packet registry maps `(version, state, direction, id)` to one of these
/// plus the codec for that version's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PacketKind {
    // serverbound
    Handshake,
    StatusRequest,
    PingRequest,
    LoginStart,
    EncryptionResponse,
    LoginAcknowledged,
    LoginPluginResponse,
    ClientInformation,
    ServerboundPluginMessage,
    FinishConfigurationAck,
    KnownPacksResponse,
    ServerboundKeepAlive,
    ChatMessage,
    ChatCommand,
    ConfirmTeleport,
    PlayerPosition,
    PlayerPositionAndRotation,
    ConfigurationAcknowledged,
    ServerboundPlayerAbilities,
    // clientbound
    StatusResponse,
    PongResponse,
    Disconnect,
    EncryptionRequest,
    LoginSuccess,
    SetCompression,
    LoginPluginRequest,
    ClientboundPluginMessage,
    RegistryCodec,
    RegistryData,
    KnownPacksRequest,
    FinishConfiguration,
    ClientboundKeepAlive,
    JoinGame,
    SynchronizePlayerPosition,
    SetDefaultSpawnPosition,
    ChunkDataAndUpdateLight,
    SetCenterChunk,
    GameEvent,
    UpdateTime,
    LegacyChat,
    SystemChat,
    TabList,
    BossBar,
    LegacyTitle,
    TitleText,
    SubtitleText,
    TitleAnimation,
    ActionBar,
    StartConfiguration,
    PlayerAbilities,
    Transfer,
    // unregistered
    Unknown,
}

impl PacketKind {
    pub fn direction(self) -> Direction {
        use PacketKind::*;
        match self {
            Handshake
            | StatusRequest
            | PingRequest
            | LoginStart
            | EncryptionResponse
            | LoginAcknowledged
            | LoginPluginResponse
            | ClientInformation
            | ServerboundPluginMessage
            | FinishConfigurationAck
            | KnownPacksResponse
            | ServerboundKeepAlive
            | ChatMessage
            | ChatCommand
            | ConfirmTeleport
            | PlayerPosition
            | PlayerPositionAndRotation
            | ConfigurationAcknowledged
            | ServerboundPlayerAbilities
            | Unknown => Direction::Serverbound,
            _ => Direction::Clientbound,
        }
    }
}

/// A packet in the layout of one specific protocol version.
///
/// Fields mirror what is on the wire: values a version does not carry are
/// `Option`s, and version-specific encodings (block position packing,
/// legacy chat positions) are already applied.
#[derive(Debug, Clone, PartialEq)]
pub enum WirePacket {
    Handshake {
        protocol_version: i32,
        server_address: String,
        server_port: u16,
        next_state: i32,
    },
    StatusRequest,
    PingRequest {
        payload: i64,
    },
    LoginStart {
        name: String,
        uuid: Option<Uuid>,
    },
    EncryptionResponse {
        shared_secret: Vec<u8>,
        verify_token: Vec<u8>,
    },
    LoginAcknowledged,
    LoginPluginResponse {
        message_id: i32,
        data: Option<Vec<u8>>,
    },
    ClientInformation {
        locale: String,
        view_distance: i8,
    },
    ServerboundPluginMessage {
        channel: String,
        data: Vec<u8>,
    },
    FinishConfigurationAck,
    KnownPacksResponse {
        packs: Vec<KnownPack>,
    },
    ServerboundKeepAlive {
        id: i64,
    },
    ChatMessage {
        message: String,
    },
    ChatCommand {
        command: String,
    },
    ConfirmTeleport {
        teleport_id: i32,
    },
    PlayerPosition {
        x: f64,
        y: f64,
        z: f64,
        on_ground: bool,
    },
    PlayerPositionAndRotation {
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
    ConfigurationAcknowledged,
    ServerboundPlayerAbilities {
        flags: u8,
    },

    StatusResponse {
        json: String,
    },
    PongResponse {
        payload: i64,
    },
    Disconnect {
        reason: TextComponent,
    },
    EncryptionRequest {
        server_id: String,
        public_key: Vec<u8>,
        verify_token: Vec<u8>,
        should_authenticate: bool,
    },
    LoginSuccess {
        uuid: Uuid,
        name: String,
        properties: Vec<ProfileProperty>,
    },
    SetCompression {
        threshold: i32,
    },
    LoginPluginRequest {
        message_id: i32,
        channel: String,
        data: Vec<u8>,
    },
    ClientboundPluginMessage {
        channel: String,
        data: Vec<u8>,
    },
    /// All registries in one NBT compound (1.20.2 - 1.20.4 configuration).
    RegistryCodec {
        codec: NbtValue,
    },
    RegistryData {
        registry_id: String,
        entries: Vec<RegistryEntry>,
    },
    KnownPacksRequest {
        packs: Vec<KnownPack>,
    },
    FinishConfiguration,
    ClientboundKeepAlive {
        id: i64,
    },
    JoinGame(Box<JoinGameData>),
    SynchronizePlayerPosition {
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
        flags: u8,
        teleport_id: i32,
    },
    SetDefaultSpawnPosition {
        location: u64,
        angle: f32,
    },
    ChunkDataAndUpdateLight {
        chunk_x: i32,
        chunk_z: i32,
        heightmaps: NbtValue,
        data: Vec<u8>,
        light: ChunkLightData,
    },
    SetCenterChunk {
        chunk_x: i32,
        chunk_z: i32,
    },
    GameEvent {
        event: u8,
        value: f32,
    },
    UpdateTime {
        world_age: i64,
        time_of_day: i64,
    },
    /// Pre-1.19 chat: 0 chat box, 1 system, 2 action bar.
    LegacyChat {
        message: TextComponent,
        position: i8,
    },
    SystemChat {
        content: TextComponent,
        overlay: bool,
    },
    TabList {
        header: TextComponent,
        footer: TextComponent,
    },
    BossBar {
        uuid: Uuid,
        title: TextComponent,
        health: f32,
        color: i32,
        division: i32,
        flags: u8,
    },
    LegacyTitle {
        action: LegacyTitleAction,
    },
    TitleText {
        text: TextComponent,
    },
    SubtitleText {
        text: TextComponent,
    },
    TitleAnimation {
        fade_in: i32,
        stay: i32,
        fade_out: i32,
    },
    ActionBar {
        text: TextComponent,
    },
    StartConfiguration,
    /// Flags: 0x01 invulnerable, 0x02 flying, 0x04 may fly, 0x08 creative.
    PlayerAbilities {
        flags: u8,
        flying_speed: f32,
        field_of_view: f32,
    },
    Transfer {
        host: String,
        port: i32,
    },

    Unknown {
        id: i32,
        data: Vec<u8>,
    },
}

impl WirePacket {
    pub fn kind(&self) -> PacketKind {
        match self {
            WirePacket::Handshake { .. } => PacketKind::Handshake,
            WirePacket::StatusRequest => PacketKind::StatusRequest,
            WirePacket::PingRequest { .. } => PacketKind::PingRequest,
            WirePacket::LoginStart { .. } => PacketKind::LoginStart,
            WirePacket::EncryptionResponse { .. } => PacketKind::EncryptionResponse,
            WirePacket::LoginAcknowledged => PacketKind::LoginAcknowledged,
            WirePacket::LoginPluginResponse { .. } => PacketKind::LoginPluginResponse,
            WirePacket::ClientInformation { .. } => PacketKind::ClientInformation,
            WirePacket::ServerboundPluginMessage { .. } => PacketKind::ServerboundPluginMessage,
            WirePacket::FinishConfigurationAck => PacketKind::FinishConfigurationAck,
            WirePacket::KnownPacksResponse { .. } => PacketKind::KnownPacksResponse,
            WirePacket::ServerboundKeepAlive { .. } => PacketKind::ServerboundKeepAlive,
            WirePacket::ChatMessage { .. } => PacketKind::ChatMessage,
            WirePacket::ChatCommand { .. } => PacketKind::ChatCommand,
            WirePacket::ConfirmTeleport { .. } => PacketKind::ConfirmTeleport,
            WirePacket::PlayerPosition { .. } => PacketKind::PlayerPosition,
            WirePacket::PlayerPositionAndRotation { .. } => PacketKind::PlayerPositionAndRotation,
            WirePacket::ConfigurationAcknowledged => PacketKind::ConfigurationAcknowledged,
            WirePacket::ServerboundPlayerAbilities { .. } => PacketKind::ServerboundPlayerAbilities,
            WirePacket::StatusResponse { .. } => PacketKind::StatusResponse,
            WirePacket::PongResponse { .. } => PacketKind::PongResponse,
            WirePacket::Disconnect { .. } => PacketKind::Disconnect,
            WirePacket::EncryptionRequest { .. } => PacketKind::EncryptionRequest,
            WirePacket::LoginSuccess { .. } => PacketKind::LoginSuccess,
            WirePacket::SetCompression { .. } => PacketKind::SetCompression,
            WirePacket::LoginPluginRequest { .. } => PacketKind::LoginPluginRequest,
            WirePacket::ClientboundPluginMessage { .. } => PacketKind::ClientboundPluginMessage,
            WirePacket::RegistryCodec { .. } => PacketKind::RegistryCodec,
            WirePacket::RegistryData { .. } => PacketKind::RegistryData,
            WirePacket::KnownPacksRequest { .. } => PacketKind::KnownPacksRequest,
            WirePacket::FinishConfiguration => PacketKind::FinishConfiguration,
            WirePacket::ClientboundKeepAlive { .. } => PacketKind::ClientboundKeepAlive,
            WirePacket::JoinGame(_) => PacketKind::JoinGame,
            WirePacket::SynchronizePlayerPosition { .. } => PacketKind::SynchronizePlayerPosition,
            WirePacket::SetDefaultSpawnPosition { .. } => PacketKind::SetDefaultSpawnPosition,
            WirePacket::ChunkDataAndUpdateLight { .. } => PacketKind::ChunkDataAndUpdateLight,
            WirePacket::SetCenterChunk { .. } => PacketKind::SetCenterChunk,
            WirePacket::GameEvent { .. } => PacketKind::GameEvent,
            WirePacket::UpdateTime { .. } => PacketKind::UpdateTime,
            WirePacket::LegacyChat { .. } => PacketKind::LegacyChat,
            WirePacket::SystemChat { .. } => PacketKind::SystemChat,
            WirePacket::TabList { .. } => PacketKind::TabList,
            WirePacket::BossBar { .. } => PacketKind::BossBar,
            WirePacket::LegacyTitle { .. } => PacketKind::LegacyTitle,
            WirePacket::TitleText { .. } => PacketKind::TitleText,
            WirePacket::SubtitleText { .. } => PacketKind::SubtitleText,
            WirePacket::TitleAnimation { .. } => PacketKind::TitleAnimation,
            WirePacket::ActionBar { .. } => PacketKind::ActionBar,
            WirePacket::StartConfiguration => PacketKind::StartConfiguration,
            WirePacket::PlayerAbilities { .. } => PacketKind::PlayerAbilities,
            WirePacket::Transfer { .. } => PacketKind::Transfer,
            WirePacket::Unknown { .. } => PacketKind::Unknown,
        }
    }
}

/// Every field any supported Join Game layout carries. Each layout writes
/// the subset it knows about.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinGameData {
    pub entity_id: i32,
    pub hardcore: bool,
    pub game_mode: u8,
    pub previous_game_mode: i8,
    pub dimension: Dimension,
    pub dimension_names: Vec<String>,
    /// Only 1.20 - 1.20.1 embed the registries here.
    pub registry_codec: Option<NbtValue>,
    pub hashed_seed: i64,
    pub max_players: i32,
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
    pub do_limited_crafting: bool,
    pub is_debug: bool,
    pub is_flat: bool,
    pub portal_cooldown: i32,
    pub enforces_secure_chat: bool,
    /// Pre-1.16 world type string ("flat" / "default").
    pub level_type: String,
    pub difficulty: u8,
}

/// The pre-1.17 combined title packet.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyTitleAction {
    SetTitle(TextComponent),
    SetSubtitle(TextComponent),
    /// Only 1.11+.
    SetActionBar(TextComponent),
    SetTimes { fade_in: i32, stay: i32, fade_out: i32 },
    Hide,
    Reset,
}

/// Data pack identity exchanged during configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPack {
    pub namespace: String,
    pub id: String,
    pub version: String,
}

/// One entry of a synchronized registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub id: String,
    pub data: Option<NbtValue>,
}

/// Light data attached to a chunk packet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkLightData {
    pub sky_light_mask: Vec<i64>,
    pub block_light_mask: Vec<i64>,
    pub empty_sky_light_mask: Vec<i64>,
    pub empty_block_light_mask: Vec<i64>,
    pub sky_light_arrays: Vec<Vec<u8>>,
    pub block_light_arrays: Vec<Vec<u8>>,
}

/// A chunk column described in block states, before any version picks
/// numeric ids for them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkColumn {
    pub min_y: i32,
    pub sections: Vec<ChunkSection>,
    /// Per block column (index `z * 16 + x`): one above the highest
    /// non-air block, relative to `min_y`. 0 for empty columns.
    pub heights: Vec<u16>,
}

/// A 16x16x16 slice of a column as a palette plus indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSection {
    pub non_air_blocks: i16,
    pub palette: Vec<BlockState>,
    /// 4096 palette indices in `y * 256 + z * 16 + x` order; `None` when
    /// the palette has a single entry.
    pub indices: Option<Vec<u16>>,
}

impl ChunkSection {
    pub fn single(state: BlockState) -> Self {
        Self {
            non_air_blocks: if state.is_air() { 0 } else { 4096 },
            palette: vec![state],
            indices: None,
        }
    }
}
