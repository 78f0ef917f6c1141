use crate::chunk::chunk_packet;
use crate::registries;
use bytes::BytesMut;
use limbo_protocol_core::*;
use limbo_types::{offline_uuid, Dimension, TextComponent, Vec3d};

/// Game event that lets 1.20.3+ clients leave the terrain loading screen.
const START_WAITING_FOR_CHUNKS: u8 = 13;

const ABILITY_FLYING: u8 = 0x02;
const ABILITY_ALLOW_FLYING: u8 = 0x04;
/// Field of view modifier vanilla sends for an unmodified player.
const DEFAULT_FIELD_OF_VIEW: f32 = 0.1;

/// The version adapter for every protocol in the packet tables.
///
/// All "if version < X" decisions live in this file.
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiVersionAdapter;

impl MultiVersionAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn brand_channel(version: ProtocolVersion) -> &'static str {
    if version.at_least(ProtocolVersion::V1_13) {
        "minecraft:brand"
    } else {
        "MC|Brand"
    }
}

/// The vanilla data pack a 1.20.5+ client ships with.
fn core_pack(version: ProtocolVersion) -> KnownPack {
    let release = if version.at_least(ProtocolVersion::V1_21) {
        "1.21"
    } else {
        "1.20.5"
    };
    KnownPack {
        namespace: "minecraft".into(),
        id: "core".into(),
        version: release.into(),
    }
}

impl MultiVersionAdapter {
    fn join_game(&self, version: ProtocolVersion, packet: &InternalPacket) -> Option<JoinGameData> {
        let InternalPacket::JoinGame {
            entity_id,
            game_mode,
            hardcore,
            dimension,
            max_players,
            view_distance,
            simulation_distance,
            reduced_debug_info,
            is_flat,
            hashed_seed,
        } = packet
        else {
            return None;
        };
        let embeds_codec =
            version.at_least(ProtocolVersion::V1_20) && !self.features(version).configuration_state;
        Some(JoinGameData {
            entity_id: *entity_id,
            hardcore: *hardcore,
            game_mode: game_mode.id(),
            previous_game_mode: -1,
            dimension: *dimension,
            dimension_names: Dimension::ALL
                .iter()
                .map(|d| d.identifier().to_string())
                .collect(),
            registry_codec: embeds_codec.then(|| registries::registry_codec(version)),
            hashed_seed: *hashed_seed,
            max_players: *max_players,
            view_distance: *view_distance,
            simulation_distance: *simulation_distance,
            reduced_debug_info: *reduced_debug_info,
            enable_respawn_screen: true,
            do_limited_crafting: false,
            is_debug: false,
            is_flat: *is_flat,
            portal_cooldown: 0,
            enforces_secure_chat: false,
            level_type: if *is_flat { "flat" } else { "default" }.into(),
            difficulty: 0,
        })
    }

    fn title(
        &self,
        version: ProtocolVersion,
        title: &Option<TextComponent>,
        subtitle: &Option<TextComponent>,
        times: (i32, i32, i32),
    ) -> Vec<WirePacket> {
        let (fade_in, stay, fade_out) = times;
        // A subtitle alone is never shown, so pair it with an empty title.
        let title = match (title, subtitle) {
            (None, Some(_)) => Some(TextComponent::plain("")),
            (title, _) => title.clone(),
        };

        let mut packets = Vec::with_capacity(3);
        if version.at_least(ProtocolVersion::V1_17) {
            packets.push(WirePacket::TitleAnimation {
                fade_in,
                stay,
                fade_out,
            });
            if let Some(text) = subtitle {
                packets.push(WirePacket::SubtitleText { text: text.clone() });
            }
            if let Some(text) = title {
                packets.push(WirePacket::TitleText { text });
            }
        } else {
            packets.push(WirePacket::LegacyTitle {
                action: LegacyTitleAction::SetTimes {
                    fade_in,
                    stay,
                    fade_out,
                },
            });
            if let Some(text) = subtitle {
                packets.push(WirePacket::LegacyTitle {
                    action: LegacyTitleAction::SetSubtitle(text.clone()),
                });
            }
            if let Some(text) = title {
                packets.push(WirePacket::LegacyTitle {
                    action: LegacyTitleAction::SetTitle(text),
                });
            }
        }
        packets
    }
}

impl ProtocolAdapter for MultiVersionAdapter {
    fn features(&self, version: ProtocolVersion) -> ProtocolFeatures {
        ProtocolFeatures {
            configuration_state: version.at_least(ProtocolVersion::V1_20_2),
            known_packs: version.at_least(ProtocolVersion::V1_20_5),
            reconfiguration: version.at_least(ProtocolVersion::V1_20_2),
            chunk_streaming: version.at_least(ProtocolVersion::V1_20),
            narrow_keep_alive: !version.at_least(ProtocolVersion::V1_12_2),
            boss_bar: version.at_least(ProtocolVersion::V1_9),
            login_plugin: version.at_least(ProtocolVersion::V1_13),
            transfer: version.at_least(ProtocolVersion::V1_20_5),
        }
    }

    fn to_internal(&self, packet: VersionedPacket) -> CodecResult<InternalPacket> {
        let VersionedPacket { version, packet, .. } = packet;
        Ok(match packet {
            WirePacket::Handshake {
                protocol_version,
                server_address,
                server_port,
                next_state,
            } => InternalPacket::Handshake {
                protocol_version,
                server_address,
                server_port,
                next_state,
            },
            WirePacket::StatusRequest => InternalPacket::StatusRequest,
            WirePacket::PingRequest { payload } => InternalPacket::PingRequest { payload },
            WirePacket::LoginStart { name, uuid } => {
                let uuid = uuid.unwrap_or_else(|| offline_uuid(&name));
                InternalPacket::LoginStart { name, uuid }
            }
            WirePacket::EncryptionResponse {
                shared_secret,
                verify_token,
            } => InternalPacket::EncryptionResponse {
                shared_secret,
                verify_token,
            },
            WirePacket::LoginAcknowledged => InternalPacket::LoginAcknowledged,
            WirePacket::LoginPluginResponse { message_id, data } => {
                InternalPacket::LoginPluginResponse { message_id, data }
            }
            WirePacket::ClientInformation {
                locale,
                view_distance,
            } => InternalPacket::ClientInformation {
                locale,
                view_distance,
            },
            WirePacket::ServerboundPluginMessage { channel, data } => {
                InternalPacket::PluginMessage { channel, data }
            }
            WirePacket::FinishConfigurationAck => InternalPacket::FinishConfigurationAck,
            WirePacket::KnownPacksResponse { packs } => InternalPacket::KnownPacksResponse { packs },
            WirePacket::ServerboundKeepAlive { id } => InternalPacket::KeepAliveResponse { id },
            WirePacket::ChatMessage { message } => {
                // Before 1.19 commands arrive as chat starting with a slash.
                match message.strip_prefix('/') {
                    Some(command) if !version.at_least(ProtocolVersion::V1_19) => {
                        InternalPacket::ChatCommand {
                            command: command.to_string(),
                        }
                    }
                    _ => InternalPacket::ChatMessage { message },
                }
            }
            WirePacket::ChatCommand { command } => InternalPacket::ChatCommand { command },
            WirePacket::ConfirmTeleport { teleport_id } => {
                InternalPacket::ConfirmTeleport { teleport_id }
            }
            WirePacket::PlayerPosition { x, y, z, on_ground } => InternalPacket::PlayerMove {
                position: Vec3d::new(x, y, z),
                rotation: None,
                on_ground,
            },
            WirePacket::PlayerPositionAndRotation {
                x,
                y,
                z,
                yaw,
                pitch,
                on_ground,
            } => InternalPacket::PlayerMove {
                position: Vec3d::new(x, y, z),
                rotation: Some((yaw, pitch)),
                on_ground,
            },
            WirePacket::ServerboundPlayerAbilities { flags } => InternalPacket::ClientAbilities {
                flying: flags & ABILITY_FLYING != 0,
            },
            WirePacket::ConfigurationAcknowledged => InternalPacket::ConfigurationAcknowledged,
            WirePacket::Unknown { id, data } => InternalPacket::Unknown {
                packet_id: id,
                data,
            },
            other => return Err(CodecError::WrongDirection(other.kind())),
        })
    }

    fn from_internal(
        &self,
        version: ProtocolVersion,
        packet: &InternalPacket,
    ) -> Result<Vec<WirePacket>, ProtocolError> {
        let features = self.features(version);
        let wire = match packet {
            InternalPacket::StatusResponse { json } => WirePacket::StatusResponse { json: json.clone() },
            InternalPacket::PongResponse { payload } => WirePacket::PongResponse { payload: *payload },
            InternalPacket::Disconnect { reason } => WirePacket::Disconnect {
                reason: reason.clone(),
            },
            InternalPacket::EncryptionRequest {
                server_id,
                public_key,
                verify_token,
            } => WirePacket::EncryptionRequest {
                server_id: server_id.clone(),
                public_key: public_key.clone(),
                verify_token: verify_token.clone(),
                should_authenticate: false,
            },
            InternalPacket::SetCompression { threshold } => WirePacket::SetCompression {
                threshold: *threshold,
            },
            InternalPacket::LoginSuccess { profile } => WirePacket::LoginSuccess {
                uuid: profile.uuid,
                name: profile.name.clone(),
                properties: profile.properties.clone(),
            },
            InternalPacket::LoginPluginRequest {
                message_id,
                channel,
                data,
            } => WirePacket::LoginPluginRequest {
                message_id: *message_id,
                channel: channel.clone(),
                data: data.clone(),
            },
            InternalPacket::PluginMessage { channel, data } => WirePacket::ClientboundPluginMessage {
                channel: channel.clone(),
                data: data.clone(),
            },
            InternalPacket::Registries => {
                return Ok(if features.known_packs {
                    registries::registry_data_packets(version)
                } else if features.configuration_state {
                    vec![WirePacket::RegistryCodec {
                        codec: registries::registry_codec(version),
                    }]
                } else {
                    // Folded into Join Game, or not synchronized at all.
                    Vec::new()
                });
            }
            InternalPacket::RequestKnownPacks => {
                if !features.known_packs {
                    return Ok(Vec::new());
                }
                WirePacket::KnownPacksRequest {
                    packs: vec![core_pack(version)],
                }
            }
            InternalPacket::FinishConfiguration => WirePacket::FinishConfiguration,
            InternalPacket::JoinGame { .. } => match self.join_game(version, packet) {
                Some(data) => WirePacket::JoinGame(Box::new(data)),
                None => return Ok(Vec::new()),
            },
            InternalPacket::PlayerPositionSync {
                position,
                yaw,
                pitch,
                teleport_id,
            } => WirePacket::SynchronizePlayerPosition {
                x: position.x,
                y: position.y,
                z: position.z,
                yaw: *yaw,
                pitch: *pitch,
                flags: 0,
                teleport_id: *teleport_id,
            },
            InternalPacket::SpawnPosition { position, angle } => {
                let location = if version.at_least(ProtocolVersion::V1_14) {
                    position.encode()
                } else {
                    position.encode_legacy()
                };
                WirePacket::SetDefaultSpawnPosition {
                    location,
                    angle: *angle,
                }
            }
            InternalPacket::KeepAlive { id } => WirePacket::ClientboundKeepAlive { id: *id },
            InternalPacket::ServerBrand { brand } => {
                let mut data = BytesMut::new();
                write_string(&mut data, brand);
                WirePacket::ClientboundPluginMessage {
                    channel: brand_channel(version).to_string(),
                    data: data.to_vec(),
                }
            }
            InternalPacket::ChunkData {
                chunk_x,
                chunk_z,
                column,
            } => {
                if !features.chunk_streaming {
                    return Ok(Vec::new());
                }
                chunk_packet(*chunk_x, *chunk_z, column)
            }
            InternalPacket::SetCenterChunk { chunk_x, chunk_z } => {
                if !features.chunk_streaming {
                    return Ok(Vec::new());
                }
                WirePacket::SetCenterChunk {
                    chunk_x: *chunk_x,
                    chunk_z: *chunk_z,
                }
            }
            InternalPacket::StartWaitingForChunks => {
                if !version.at_least(ProtocolVersion::V1_20_3) {
                    return Ok(Vec::new());
                }
                WirePacket::GameEvent {
                    event: START_WAITING_FOR_CHUNKS,
                    value: 0.0,
                }
            }
            InternalPacket::UpdateTime {
                world_age,
                time_of_day,
            } => WirePacket::UpdateTime {
                world_age: *world_age,
                time_of_day: *time_of_day,
            },
            InternalPacket::SystemMessage { content } => {
                if version.at_least(ProtocolVersion::V1_19) {
                    WirePacket::SystemChat {
                        content: content.clone(),
                        overlay: false,
                    }
                } else {
                    WirePacket::LegacyChat {
                        message: content.clone(),
                        position: 1,
                    }
                }
            }
            InternalPacket::ActionBar { content } => {
                if version.at_least(ProtocolVersion::V1_17) {
                    WirePacket::ActionBar {
                        text: content.clone(),
                    }
                } else if version.at_least(ProtocolVersion::V1_11) {
                    WirePacket::LegacyTitle {
                        action: LegacyTitleAction::SetActionBar(content.clone()),
                    }
                } else {
                    WirePacket::LegacyChat {
                        message: content.clone(),
                        position: 2,
                    }
                }
            }
            InternalPacket::TabList { header, footer } => WirePacket::TabList {
                header: header.clone(),
                footer: footer.clone(),
            },
            InternalPacket::BossBar {
                uuid,
                title,
                health,
                color,
                division,
            } => {
                if !features.boss_bar {
                    return Ok(Vec::new());
                }
                WirePacket::BossBar {
                    uuid: *uuid,
                    title: title.clone(),
                    health: *health,
                    color: color.id(),
                    division: division.id(),
                    flags: 0,
                }
            }
            InternalPacket::Title {
                title,
                subtitle,
                fade_in,
                stay,
                fade_out,
            } => return Ok(self.title(version, title, subtitle, (*fade_in, *stay, *fade_out))),
            InternalPacket::PlayerAbilities {
                allow_flying,
                flying,
                flying_speed,
            } => {
                let mut flags = 0;
                if *flying {
                    flags |= ABILITY_FLYING;
                }
                if *allow_flying {
                    flags |= ABILITY_ALLOW_FLYING;
                }
                WirePacket::PlayerAbilities {
                    flags,
                    flying_speed: *flying_speed,
                    field_of_view: DEFAULT_FIELD_OF_VIEW,
                }
            }
            InternalPacket::Transfer { host, port } => {
                if !features.transfer {
                    return Ok(Vec::new());
                }
                WirePacket::Transfer {
                    host: host.clone(),
                    port: i32::from(*port),
                }
            }
            InternalPacket::StartConfiguration => {
                if !features.reconfiguration {
                    return Ok(Vec::new());
                }
                WirePacket::StartConfiguration
            }
            other => return Err(ProtocolError::NotClientbound(other.name())),
        };
        Ok(vec![wire])
    }

    fn required_packets(&self, version: ProtocolVersion) -> Vec<(ConnectionState, PacketKind)> {
        use ConnectionState::{Configuration, Login, Play, Status};
        use PacketKind::*;

        let features = self.features(version);
        let mut required = vec![
            (ConnectionState::Handshake, Handshake),
            (Status, StatusRequest),
            (Status, PingRequest),
            (Status, StatusResponse),
            (Status, PongResponse),
            (Login, LoginStart),
            (Login, EncryptionResponse),
            (Login, Disconnect),
            (Login, EncryptionRequest),
            (Login, LoginSuccess),
            (Login, SetCompression),
            (Play, ServerboundKeepAlive),
            (Play, ChatMessage),
            (Play, PlayerPosition),
            (Play, PlayerPositionAndRotation),
            (Play, ClientboundKeepAlive),
            (Play, JoinGame),
            (Play, Disconnect),
            (Play, SynchronizePlayerPosition),
            (Play, SetDefaultSpawnPosition),
            (Play, UpdateTime),
            (Play, TabList),
            (Play, ClientboundPluginMessage),
            (Play, ServerboundPlayerAbilities),
            (Play, PlayerAbilities),
        ];

        if features.login_plugin {
            required.extend([(Login, LoginPluginRequest), (Login, LoginPluginResponse)]);
        }
        if features.transfer {
            required.push((Play, Transfer));
        }

        if features.configuration_state {
            required.extend([
                (Login, LoginAcknowledged),
                (Configuration, ClientInformation),
                (Configuration, ServerboundPluginMessage),
                (Configuration, FinishConfigurationAck),
                (Configuration, ServerboundKeepAlive),
                (Configuration, ClientboundPluginMessage),
                (Configuration, Disconnect),
                (Configuration, FinishConfiguration),
                (Configuration, ClientboundKeepAlive),
                (Play, ConfigurationAcknowledged),
                (Play, StartConfiguration),
            ]);
            if features.known_packs {
                required.extend([
                    (Configuration, RegistryData),
                    (Configuration, KnownPacksRequest),
                    (Configuration, KnownPacksResponse),
                ]);
            } else {
                required.push((Configuration, RegistryCodec));
            }
        }

        if version.at_least(ProtocolVersion::V1_19) {
            required.extend([(Play, SystemChat), (Play, ChatCommand)]);
        } else {
            required.push((Play, LegacyChat));
        }

        if version.at_least(ProtocolVersion::V1_17) {
            required.extend([
                (Play, TitleText),
                (Play, SubtitleText),
                (Play, TitleAnimation),
                (Play, ActionBar),
            ]);
        } else {
            required.push((Play, LegacyTitle));
        }

        if version.at_least(ProtocolVersion::V1_9) {
            required.push((Play, ConfirmTeleport));
        }
        if features.boss_bar {
            required.push((Play, BossBar));
        }
        if features.chunk_streaming {
            required.extend([(Play, ChunkDataAndUpdateLight), (Play, SetCenterChunk)]);
        }
        if version.at_least(ProtocolVersion::V1_20_3) {
            required.push((Play, GameEvent));
        }
        required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limbo_types::{BlockPos, GameMode};

    const V47: ProtocolVersion = ProtocolVersion::V1_8;
    const V340: ProtocolVersion = ProtocolVersion::V1_12_2;
    const V763: ProtocolVersion = ProtocolVersion::V1_20;
    const V765: ProtocolVersion = ProtocolVersion::V1_20_3;
    const V767: ProtocolVersion = ProtocolVersion::V1_21;

    fn inbound(version: ProtocolVersion, packet: WirePacket) -> InternalPacket {
        MultiVersionAdapter
            .to_internal(VersionedPacket {
                version,
                state: ConnectionState::Play,
                packet,
            })
            .unwrap()
    }

    fn outbound(version: ProtocolVersion, packet: &InternalPacket) -> Vec<WirePacket> {
        MultiVersionAdapter.from_internal(version, packet).unwrap()
    }

    #[test]
    fn test_login_start_without_uuid_gets_offline_uuid() {
        let packet = inbound(
            V47,
            WirePacket::LoginStart {
                name: "Alice".into(),
                uuid: None,
            },
        );
        assert_eq!(
            packet,
            InternalPacket::LoginStart {
                name: "Alice".into(),
                uuid: offline_uuid("Alice"),
            }
        );
    }

    #[test]
    fn test_slash_chat_becomes_command_only_before_1_19() {
        let chat = || WirePacket::ChatMessage {
            message: "/spawn".into(),
        };
        assert_eq!(
            inbound(V340, chat()),
            InternalPacket::ChatCommand {
                command: "spawn".into()
            }
        );
        assert_eq!(
            inbound(V767, chat()),
            InternalPacket::ChatMessage {
                message: "/spawn".into()
            }
        );
    }

    #[test]
    fn test_title_is_split() {
        let title = InternalPacket::Title {
            title: Some(TextComponent::plain("Welcome")),
            subtitle: Some(TextComponent::plain("to limbo")),
            fade_in: 10,
            stay: 70,
            fade_out: 20,
        };
        let modern = outbound(V767, &title);
        let kinds: Vec<PacketKind> = modern.iter().map(WirePacket::kind).collect();
        assert_eq!(
            kinds,
            vec![
                PacketKind::TitleAnimation,
                PacketKind::SubtitleText,
                PacketKind::TitleText
            ]
        );
        let legacy = outbound(V47, &title);
        assert_eq!(legacy.len(), 3);
        assert!(legacy.iter().all(|p| p.kind() == PacketKind::LegacyTitle));
    }

    #[test]
    fn test_subtitle_alone_gets_an_empty_title() {
        let title = InternalPacket::Title {
            title: None,
            subtitle: Some(TextComponent::plain("sub")),
            fade_in: 0,
            stay: 20,
            fade_out: 0,
        };
        let packets = outbound(V767, &title);
        assert_eq!(
            packets.last(),
            Some(&WirePacket::TitleText {
                text: TextComponent::plain("")
            })
        );
    }

    #[test]
    fn test_spawn_position_packing() {
        let spawn = InternalPacket::SpawnPosition {
            position: BlockPos::new(1, 64, -3),
            angle: 0.0,
        };
        let location = |version| match outbound(version, &spawn).remove(0) {
            WirePacket::SetDefaultSpawnPosition { location, .. } => location,
            other => panic!("unexpected {:?}", other.kind()),
        };
        assert_eq!(location(V340), BlockPos::new(1, 64, -3).encode_legacy());
        assert_eq!(location(V767), BlockPos::new(1, 64, -3).encode());
    }

    #[test]
    fn test_action_bar_per_version() {
        let bar = InternalPacket::ActionBar {
            content: TextComponent::plain("hi"),
        };
        assert!(matches!(
            outbound(V47, &bar)[0],
            WirePacket::LegacyChat { position: 2, .. }
        ));
        assert!(matches!(
            outbound(V340, &bar)[0],
            WirePacket::LegacyTitle {
                action: LegacyTitleAction::SetActionBar(_)
            }
        ));
        assert!(matches!(outbound(V767, &bar)[0], WirePacket::ActionBar { .. }));
    }

    #[test]
    fn test_brand_channel() {
        let brand = InternalPacket::ServerBrand {
            brand: "limbo".into(),
        };
        let channel = |version| match outbound(version, &brand).remove(0) {
            WirePacket::ClientboundPluginMessage { channel, .. } => channel,
            other => panic!("unexpected {:?}", other.kind()),
        };
        assert_eq!(channel(V47), "MC|Brand");
        assert_eq!(channel(V767), "minecraft:brand");
    }

    #[test]
    fn test_registries_per_version() {
        assert!(outbound(V763, &InternalPacket::Registries).is_empty());
        assert!(matches!(
            outbound(V765, &InternalPacket::Registries)[..],
            [WirePacket::RegistryCodec { .. }]
        ));
        assert!(outbound(V767, &InternalPacket::Registries).len() > 1);
    }

    #[test]
    fn test_join_game_embeds_codec_only_for_1_20() {
        let join = InternalPacket::JoinGame {
            entity_id: 1,
            game_mode: GameMode::Spectator,
            hardcore: false,
            dimension: Dimension::Overworld,
            max_players: 20,
            view_distance: 2,
            simulation_distance: 2,
            reduced_debug_info: false,
            is_flat: true,
            hashed_seed: 0,
        };
        let codec = |version| match outbound(version, &join).remove(0) {
            WirePacket::JoinGame(data) => {
                assert_eq!(data.game_mode, 3);
                data.registry_codec.is_some()
            }
            other => panic!("unexpected {:?}", other.kind()),
        };
        assert!(!codec(V47));
        assert!(codec(V763));
        assert!(!codec(V767));
    }

    #[test]
    fn test_version_gated_packets_vanish() {
        let waiting = InternalPacket::StartWaitingForChunks;
        assert!(outbound(V763, &waiting).is_empty());
        assert_eq!(outbound(V765, &waiting).len(), 1);
        assert!(outbound(V340, &InternalPacket::SetCenterChunk { chunk_x: 0, chunk_z: 0 }).is_empty());
        assert!(outbound(V763, &InternalPacket::StartConfiguration).is_empty());
    }

    #[test]
    fn test_abilities_flags() {
        let abilities = InternalPacket::PlayerAbilities {
            allow_flying: true,
            flying: false,
            flying_speed: 0.1,
        };
        assert_eq!(
            outbound(V47, &abilities),
            vec![WirePacket::PlayerAbilities {
                flags: 0x04,
                flying_speed: 0.1,
                field_of_view: 0.1,
            }]
        );
        assert_eq!(
            inbound(V767, WirePacket::ServerboundPlayerAbilities { flags: 0x02 }),
            InternalPacket::ClientAbilities { flying: true }
        );
        assert_eq!(
            inbound(V340, WirePacket::ServerboundPlayerAbilities { flags: 0x04 }),
            InternalPacket::ClientAbilities { flying: false }
        );
    }

    #[test]
    fn test_transfer_needs_1_20_5() {
        let transfer = InternalPacket::Transfer {
            host: "lobby.example.net".into(),
            port: 25566,
        };
        assert!(outbound(V765, &transfer).is_empty());
        assert_eq!(
            outbound(V767, &transfer),
            vec![WirePacket::Transfer {
                host: "lobby.example.net".into(),
                port: 25566,
            }]
        );
        assert!(!MultiVersionAdapter.features(V765).transfer);
        assert!(MultiVersionAdapter.features(V763).login_plugin);
        assert!(!MultiVersionAdapter.features(V340).login_plugin);
    }

    #[test]
    fn test_serverbound_packets_cannot_be_sent() {
        assert!(matches!(
            MultiVersionAdapter.from_internal(V767, &InternalPacket::StatusRequest),
            Err(ProtocolError::NotClientbound("StatusRequest"))
        ));
    }
}
