//! Packet id tables: which layout each version uses under which id.

use crate::codecs::{common, configuration, handshake, login, play};
use limbo_protocol_core::{
    ConnectionState, DecodeFn, Direction, EncodeFn, PacketCodec, PacketKind, PacketRegistry,
    PacketRegistryBuilder, ProtocolVersion, RegistryError,
};

use ConnectionState::{Configuration, Handshake, Login, Play, Status};
use Direction::{Clientbound, Serverbound};
use PacketKind as K;

fn sb(kind: PacketKind, decode: DecodeFn) -> PacketCodec {
    PacketCodec::serverbound(kind, decode)
}

fn cb(kind: PacketKind, encode: EncodeFn) -> PacketCodec {
    PacketCodec::clientbound(kind, encode)
}

/// Build the packet registry for `versions`. Versions without a table
/// simply end up with no registrations.
pub fn build_registry(versions: &[ProtocolVersion]) -> Result<PacketRegistry, RegistryError> {
    let mut b = PacketRegistry::builder(versions);
    register_handshake_and_status(&mut b);
    register_login(&mut b);
    register_configuration(&mut b);
    register_play_v47(&mut b);
    register_play_v340(&mut b);
    register_play_modern(&mut b);
    b.build()
}

fn register_handshake_and_status(b: &mut PacketRegistryBuilder) {
    b.register(47..=767, Handshake, Serverbound, 0x00, sb(K::Handshake, handshake::decode_handshake))
        .register(47..=767, Status, Serverbound, 0x00, sb(K::StatusRequest, handshake::decode_status_request))
        .register(47..=767, Status, Serverbound, 0x01, sb(K::PingRequest, handshake::decode_ping))
        .register(47..=767, Status, Clientbound, 0x00, cb(K::StatusResponse, handshake::encode_status_response))
        .register(47..=767, Status, Clientbound, 0x01, cb(K::PongResponse, handshake::encode_pong));
}

fn register_login(b: &mut PacketRegistryBuilder) {
    // serverbound
    b.register(47..=340, Login, Serverbound, 0x00, sb(K::LoginStart, login::decode_login_start_name))
        .register(763..=763, Login, Serverbound, 0x00, sb(K::LoginStart, login::decode_login_start_optional_uuid))
        .register(764..=767, Login, Serverbound, 0x00, sb(K::LoginStart, login::decode_login_start_uuid))
        .register(47..=767, Login, Serverbound, 0x01, sb(K::EncryptionResponse, login::decode_encryption_response))
        .register(763..=767, Login, Serverbound, 0x02, sb(K::LoginPluginResponse, login::decode_login_plugin_response))
        .register(764..=767, Login, Serverbound, 0x03, sb(K::LoginAcknowledged, login::decode_login_acknowledged));

    // clientbound
    b.register(47..=767, Login, Clientbound, 0x00, cb(K::Disconnect, common::encode_disconnect_json))
        .register(47..=765, Login, Clientbound, 0x01, cb(K::EncryptionRequest, login::encode_encryption_request))
        .register(766..=767, Login, Clientbound, 0x01, cb(K::EncryptionRequest, login::encode_encryption_request_authenticate))
        .register(47..=340, Login, Clientbound, 0x02, cb(K::LoginSuccess, login::encode_login_success_string_uuid))
        .register(763..=765, Login, Clientbound, 0x02, cb(K::LoginSuccess, login::encode_login_success_properties))
        .register(766..=767, Login, Clientbound, 0x02, cb(K::LoginSuccess, login::encode_login_success_strict))
        .register(47..=767, Login, Clientbound, 0x03, cb(K::SetCompression, login::encode_set_compression))
        .register(763..=767, Login, Clientbound, 0x04, cb(K::LoginPluginRequest, login::encode_login_plugin_request));
}

fn register_configuration(b: &mut PacketRegistryBuilder) {
    // 1.20.2 - 1.20.4
    b.register(764..=765, Configuration, Serverbound, 0x00, sb(K::ClientInformation, configuration::decode_client_information))
        .register(764..=765, Configuration, Serverbound, 0x01, sb(K::ServerboundPluginMessage, common::decode_plugin_message))
        .register(764..=765, Configuration, Serverbound, 0x02, sb(K::FinishConfigurationAck, configuration::decode_finish_configuration_ack))
        .register(764..=765, Configuration, Serverbound, 0x03, sb(K::ServerboundKeepAlive, common::decode_keep_alive))
        .register(764..=765, Configuration, Clientbound, 0x00, cb(K::ClientboundPluginMessage, common::encode_plugin_message))
        .register(764..=764, Configuration, Clientbound, 0x01, cb(K::Disconnect, common::encode_disconnect_json))
        .register(765..=765, Configuration, Clientbound, 0x01, cb(K::Disconnect, common::encode_disconnect_nbt))
        .register(764..=765, Configuration, Clientbound, 0x02, cb(K::FinishConfiguration, configuration::encode_finish_configuration))
        .register(764..=765, Configuration, Clientbound, 0x03, cb(K::ClientboundKeepAlive, common::encode_keep_alive))
        .register(764..=765, Configuration, Clientbound, 0x05, cb(K::RegistryCodec, configuration::encode_registry_codec));

    // 1.20.5+
    b.register(766..=767, Configuration, Serverbound, 0x00, sb(K::ClientInformation, configuration::decode_client_information))
        .register(766..=767, Configuration, Serverbound, 0x02, sb(K::ServerboundPluginMessage, common::decode_plugin_message))
        .register(766..=767, Configuration, Serverbound, 0x03, sb(K::FinishConfigurationAck, configuration::decode_finish_configuration_ack))
        .register(766..=767, Configuration, Serverbound, 0x04, sb(K::ServerboundKeepAlive, common::decode_keep_alive))
        .register(766..=767, Configuration, Serverbound, 0x07, sb(K::KnownPacksResponse, configuration::decode_known_packs))
        .register(766..=767, Configuration, Clientbound, 0x01, cb(K::ClientboundPluginMessage, common::encode_plugin_message))
        .register(766..=767, Configuration, Clientbound, 0x02, cb(K::Disconnect, common::encode_disconnect_nbt))
        .register(766..=767, Configuration, Clientbound, 0x03, cb(K::FinishConfiguration, configuration::encode_finish_configuration))
        .register(766..=767, Configuration, Clientbound, 0x04, cb(K::ClientboundKeepAlive, common::encode_keep_alive))
        .register(766..=767, Configuration, Clientbound, 0x07, cb(K::RegistryData, configuration::encode_registry_data))
        .register(766..=767, Configuration, Clientbound, 0x0E, cb(K::KnownPacksRequest, configuration::encode_known_packs));
}

/// 1.8.x
fn register_play_v47(b: &mut PacketRegistryBuilder) {
    b.register(47..=47, Play, Serverbound, 0x00, sb(K::ServerboundKeepAlive, common::decode_keep_alive_varint))
        .register(47..=47, Play, Serverbound, 0x01, sb(K::ChatMessage, play::decode_chat_message))
        .register(47..=47, Play, Serverbound, 0x04, sb(K::PlayerPosition, play::decode_player_position))
        .register(47..=47, Play, Serverbound, 0x06, sb(K::PlayerPositionAndRotation, play::decode_player_position_rotation))
        .register(47..=47, Play, Serverbound, 0x13, sb(K::ServerboundPlayerAbilities, play::decode_player_abilities_with_speeds))
        .register(47..=47, Play, Serverbound, 0x17, sb(K::ServerboundPluginMessage, common::decode_plugin_message));

    b.register(47..=47, Play, Clientbound, 0x00, cb(K::ClientboundKeepAlive, common::encode_keep_alive_varint))
        .register(47..=47, Play, Clientbound, 0x01, cb(K::JoinGame, play::encode_join_game_v47))
        .register(47..=47, Play, Clientbound, 0x02, cb(K::LegacyChat, play::encode_legacy_chat))
        .register(47..=47, Play, Clientbound, 0x03, cb(K::UpdateTime, play::encode_update_time))
        .register(47..=47, Play, Clientbound, 0x05, cb(K::SetDefaultSpawnPosition, play::encode_spawn_position_legacy))
        .register(47..=47, Play, Clientbound, 0x08, cb(K::SynchronizePlayerPosition, play::encode_sync_position_v47))
        .register(47..=47, Play, Clientbound, 0x39, cb(K::PlayerAbilities, play::encode_player_abilities))
        .register(47..=47, Play, Clientbound, 0x3F, cb(K::ClientboundPluginMessage, common::encode_plugin_message))
        .register(47..=47, Play, Clientbound, 0x40, cb(K::Disconnect, common::encode_disconnect_json))
        .register(47..=47, Play, Clientbound, 0x45, cb(K::LegacyTitle, play::encode_legacy_title_v47))
        .register(47..=47, Play, Clientbound, 0x47, cb(K::TabList, play::encode_tab_list_json));
}

/// 1.12.2
fn register_play_v340(b: &mut PacketRegistryBuilder) {
    b.register(340..=340, Play, Serverbound, 0x00, sb(K::ConfirmTeleport, play::decode_confirm_teleport))
        .register(340..=340, Play, Serverbound, 0x02, sb(K::ChatMessage, play::decode_chat_message))
        .register(340..=340, Play, Serverbound, 0x09, sb(K::ServerboundPluginMessage, common::decode_plugin_message))
        .register(340..=340, Play, Serverbound, 0x0B, sb(K::ServerboundKeepAlive, common::decode_keep_alive))
        .register(340..=340, Play, Serverbound, 0x0D, sb(K::PlayerPosition, play::decode_player_position))
        .register(340..=340, Play, Serverbound, 0x0E, sb(K::PlayerPositionAndRotation, play::decode_player_position_rotation))
        .register(340..=340, Play, Serverbound, 0x13, sb(K::ServerboundPlayerAbilities, play::decode_player_abilities_with_speeds));

    b.register(340..=340, Play, Clientbound, 0x0C, cb(K::BossBar, play::encode_boss_bar_json))
        .register(340..=340, Play, Clientbound, 0x0F, cb(K::LegacyChat, play::encode_legacy_chat))
        .register(340..=340, Play, Clientbound, 0x18, cb(K::ClientboundPluginMessage, common::encode_plugin_message))
        .register(340..=340, Play, Clientbound, 0x1A, cb(K::Disconnect, common::encode_disconnect_json))
        .register(340..=340, Play, Clientbound, 0x1F, cb(K::ClientboundKeepAlive, common::encode_keep_alive))
        .register(340..=340, Play, Clientbound, 0x23, cb(K::JoinGame, play::encode_join_game_v108))
        .register(340..=340, Play, Clientbound, 0x2C, cb(K::PlayerAbilities, play::encode_player_abilities))
        .register(340..=340, Play, Clientbound, 0x2F, cb(K::SynchronizePlayerPosition, play::encode_sync_position))
        .register(340..=340, Play, Clientbound, 0x46, cb(K::SetDefaultSpawnPosition, play::encode_spawn_position_legacy))
        .register(340..=340, Play, Clientbound, 0x47, cb(K::UpdateTime, play::encode_update_time))
        .register(340..=340, Play, Clientbound, 0x48, cb(K::LegacyTitle, play::encode_legacy_title_v315))
        .register(340..=340, Play, Clientbound, 0x4A, cb(K::TabList, play::encode_tab_list_json));
}

/// Per-version ids for 1.20 through 1.21, in supported-version order:
/// 763, 764, 765, 766..=767.
struct ModernIds {
    kind: PacketKind,
    ids: [Option<i32>; 4],
}

const MODERN_SPANS: [(i32, i32); 4] = [(763, 763), (764, 764), (765, 765), (766, 767)];

const fn ids(kind: PacketKind, ids: [Option<i32>; 4]) -> ModernIds {
    ModernIds { kind, ids }
}

const MODERN_SERVERBOUND: [ModernIds; 9] = [
    ids(K::ConfirmTeleport, [Some(0x00), Some(0x00), Some(0x00), Some(0x00)]),
    ids(K::ChatCommand, [Some(0x04), Some(0x04), Some(0x04), Some(0x04)]),
    ids(K::ChatMessage, [Some(0x05), Some(0x05), Some(0x05), Some(0x06)]),
    ids(K::ConfigurationAcknowledged, [None, Some(0x0B), Some(0x0B), Some(0x0C)]),
    ids(K::ServerboundPluginMessage, [Some(0x0D), Some(0x0F), Some(0x10), Some(0x12)]),
    ids(K::ServerboundKeepAlive, [Some(0x12), Some(0x14), Some(0x15), Some(0x18)]),
    ids(K::PlayerPosition, [Some(0x14), Some(0x16), Some(0x17), Some(0x1A)]),
    ids(K::PlayerPositionAndRotation, [Some(0x15), Some(0x17), Some(0x18), Some(0x1B)]),
    ids(K::ServerboundPlayerAbilities, [Some(0x1C), Some(0x1F), Some(0x20), Some(0x23)]),
];

const MODERN_CLIENTBOUND: [ModernIds; 20] = [
    ids(K::BossBar, [Some(0x0B), Some(0x0A), Some(0x0A), Some(0x0A)]),
    ids(K::ClientboundPluginMessage, [Some(0x17), Some(0x18), Some(0x18), Some(0x19)]),
    ids(K::Disconnect, [Some(0x1A), Some(0x1B), Some(0x1B), Some(0x1D)]),
    ids(K::GameEvent, [Some(0x1F), Some(0x20), Some(0x20), Some(0x22)]),
    ids(K::ClientboundKeepAlive, [Some(0x23), Some(0x24), Some(0x24), Some(0x26)]),
    ids(K::ChunkDataAndUpdateLight, [Some(0x24), Some(0x25), Some(0x25), Some(0x27)]),
    ids(K::JoinGame, [Some(0x28), Some(0x29), Some(0x29), Some(0x2B)]),
    ids(K::PlayerAbilities, [Some(0x34), Some(0x36), Some(0x36), Some(0x38)]),
    ids(K::SynchronizePlayerPosition, [Some(0x3C), Some(0x3E), Some(0x3E), Some(0x40)]),
    ids(K::ActionBar, [Some(0x46), Some(0x48), Some(0x4A), Some(0x4C)]),
    ids(K::SetCenterChunk, [Some(0x4E), Some(0x50), Some(0x52), Some(0x54)]),
    ids(K::SetDefaultSpawnPosition, [Some(0x50), Some(0x52), Some(0x54), Some(0x56)]),
    ids(K::SubtitleText, [Some(0x5D), Some(0x5F), Some(0x61), Some(0x63)]),
    ids(K::UpdateTime, [Some(0x5E), Some(0x60), Some(0x62), Some(0x64)]),
    ids(K::TitleText, [Some(0x5F), Some(0x61), Some(0x63), Some(0x65)]),
    ids(K::TitleAnimation, [Some(0x60), Some(0x62), Some(0x64), Some(0x66)]),
    ids(K::StartConfiguration, [None, Some(0x65), Some(0x67), Some(0x69)]),
    ids(K::SystemChat, [Some(0x64), Some(0x67), Some(0x69), Some(0x6C)]),
    ids(K::TabList, [Some(0x65), Some(0x68), Some(0x6A), Some(0x6D)]),
    ids(K::Transfer, [None, None, None, Some(0x73)]),
];

fn modern_decoder(kind: PacketKind) -> Option<DecodeFn> {
    Some(match kind {
        K::ConfirmTeleport => play::decode_confirm_teleport,
        K::ChatCommand => play::decode_chat_command,
        K::ChatMessage => play::decode_chat_message,
        K::ConfigurationAcknowledged => play::decode_configuration_acknowledged,
        K::ServerboundPluginMessage => common::decode_plugin_message,
        K::ServerboundKeepAlive => common::decode_keep_alive,
        K::PlayerPosition => play::decode_player_position,
        K::PlayerPositionAndRotation => play::decode_player_position_rotation,
        K::ServerboundPlayerAbilities => play::decode_player_abilities,
        _ => return None,
    })
}

/// The encoder for `kind` in `version`. Text switched from JSON to NBT
/// in 1.20.3.
fn modern_encoder(kind: PacketKind, version: i32) -> Option<EncodeFn> {
    let nbt_text = version >= ProtocolVersion::V1_20_3.number();
    let text = |json: EncodeFn, nbt: EncodeFn| if nbt_text { nbt } else { json };
    Some(match kind {
        K::BossBar => text(play::encode_boss_bar_json, play::encode_boss_bar_nbt),
        K::ClientboundPluginMessage => common::encode_plugin_message,
        K::Disconnect => text(common::encode_disconnect_json, common::encode_disconnect_nbt),
        K::GameEvent => play::encode_game_event,
        K::ClientboundKeepAlive => common::encode_keep_alive,
        K::ChunkDataAndUpdateLight if version == 763 => play::encode_chunk_data_named,
        K::ChunkDataAndUpdateLight => play::encode_chunk_data,
        K::JoinGame => match version {
            763 => play::encode_join_game_v763,
            764 | 765 => play::encode_join_game_v764,
            _ => play::encode_join_game_v766,
        },
        K::SynchronizePlayerPosition => play::encode_sync_position,
        K::PlayerAbilities => play::encode_player_abilities,
        K::Transfer => play::encode_transfer,
        K::ActionBar => text(play::encode_action_bar_json, play::encode_action_bar_nbt),
        K::SetCenterChunk => play::encode_set_center_chunk,
        K::SetDefaultSpawnPosition => play::encode_spawn_position,
        K::SubtitleText => text(play::encode_subtitle_text_json, play::encode_subtitle_text_nbt),
        K::UpdateTime => play::encode_update_time,
        K::TitleText => text(play::encode_title_text_json, play::encode_title_text_nbt),
        K::TitleAnimation => play::encode_title_animation,
        K::StartConfiguration => play::encode_start_configuration,
        K::SystemChat => text(play::encode_system_chat_json, play::encode_system_chat_nbt),
        K::TabList => text(play::encode_tab_list_json, play::encode_tab_list_nbt),
        _ => return None,
    })
}

/// 1.20 - 1.21
fn register_play_modern(b: &mut PacketRegistryBuilder) {
    for entry in &MODERN_SERVERBOUND {
        let Some(decode) = modern_decoder(entry.kind) else {
            continue;
        };
        for (&(first, last), id) in MODERN_SPANS.iter().zip(entry.ids) {
            if let Some(id) = id {
                b.register(first..=last, Play, Serverbound, id, sb(entry.kind, decode));
            }
        }
    }
    for entry in &MODERN_CLIENTBOUND {
        for (&(first, last), id) in MODERN_SPANS.iter().zip(entry.ids) {
            let (Some(id), Some(encode)) = (id, modern_encoder(entry.kind, first)) else {
                continue;
            };
            b.register(first..=last, Play, Clientbound, id, cb(entry.kind, encode));
        }
    }
}
