use crate::text::{write_text, TextFormat};
use bytes::{BufMut, BytesMut};
use limbo_nbt::RootStyle;
use limbo_protocol_core::*;

// === Serverbound ===

/// Reads the message text; signature data trailing it in 1.19+ is skipped.
pub fn decode_chat_message(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let message = read_string(buf, 256)?;
    read_remaining(buf);
    Ok(WirePacket::ChatMessage { message })
}

pub fn decode_chat_command(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let command = read_string(buf, 256)?;
    read_remaining(buf);
    Ok(WirePacket::ChatCommand { command })
}

pub fn decode_confirm_teleport(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::ConfirmTeleport {
        teleport_id: read_varint(buf)?,
    })
}

pub fn decode_player_position(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let x = read_f64(buf)?;
    let y = read_f64(buf)?;
    let z = read_f64(buf)?;
    let on_ground = read_bool(buf)?;
    Ok(WirePacket::PlayerPosition { x, y, z, on_ground })
}

pub fn decode_player_position_rotation(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let x = read_f64(buf)?;
    let y = read_f64(buf)?;
    let z = read_f64(buf)?;
    let yaw = read_f32(buf)?;
    let pitch = read_f32(buf)?;
    let on_ground = read_bool(buf)?;
    Ok(WirePacket::PlayerPositionAndRotation {
        x,
        y,
        z,
        yaw,
        pitch,
        on_ground,
    })
}

pub fn decode_configuration_acknowledged(_buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::ConfigurationAcknowledged)
}

/// Flags followed by flying and walking speed (1.8 - 1.15.2).
pub fn decode_player_abilities_with_speeds(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let flags = read_u8(buf)?;
    read_f32(buf)?;
    read_f32(buf)?;
    Ok(WirePacket::ServerboundPlayerAbilities { flags })
}

pub fn decode_player_abilities(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::ServerboundPlayerAbilities {
        flags: read_u8(buf)?,
    })
}

// === Join Game ===

fn join_data(packet: &WirePacket) -> CodecResult<&JoinGameData> {
    match packet {
        WirePacket::JoinGame(data) => Ok(&**data),
        other => Err(mismatch(PacketKind::JoinGame, other)),
    }
}

fn legacy_game_mode(data: &JoinGameData) -> u8 {
    data.game_mode | if data.hardcore { 0x08 } else { 0 }
}

/// 1.8: byte dimension, byte max players.
pub fn encode_join_game_v47(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let data = join_data(packet)?;
    buf.put_i32(data.entity_id);
    buf.put_u8(legacy_game_mode(data));
    buf.put_i8(data.dimension.legacy_id() as i8);
    buf.put_u8(data.difficulty);
    buf.put_u8(data.max_players.clamp(0, 255) as u8);
    write_string(buf, &data.level_type);
    buf.put_u8(data.reduced_debug_info as u8);
    Ok(())
}

/// 1.9.1 - 1.13.2: int dimension.
pub fn encode_join_game_v108(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let data = join_data(packet)?;
    buf.put_i32(data.entity_id);
    buf.put_u8(legacy_game_mode(data));
    buf.put_i32(data.dimension.legacy_id());
    buf.put_u8(data.difficulty);
    buf.put_u8(data.max_players.clamp(0, 255) as u8);
    write_string(buf, &data.level_type);
    buf.put_u8(data.reduced_debug_info as u8);
    Ok(())
}

fn write_dimension_names(buf: &mut BytesMut, data: &JoinGameData) {
    write_varint(buf, data.dimension_names.len() as i32);
    for name in &data.dimension_names {
        write_string(buf, name);
    }
}

/// 1.20 - 1.20.1: registry codec embedded as a named NBT root.
pub fn encode_join_game_v763(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let data = join_data(packet)?;
    let codec = data
        .registry_codec
        .as_ref()
        .ok_or(CodecError::MissingField("registry_codec"))?;
    buf.put_i32(data.entity_id);
    buf.put_u8(data.hardcore as u8);
    buf.put_u8(data.game_mode);
    buf.put_i8(data.previous_game_mode);
    write_dimension_names(buf, data);
    codec.write_root(RootStyle::Named, buf);
    write_string(buf, data.dimension.identifier());
    write_string(buf, data.dimension.identifier());
    buf.put_i64(data.hashed_seed);
    write_varint(buf, data.max_players);
    write_varint(buf, data.view_distance);
    write_varint(buf, data.simulation_distance);
    buf.put_u8(data.reduced_debug_info as u8);
    buf.put_u8(data.enable_respawn_screen as u8);
    buf.put_u8(data.is_debug as u8);
    buf.put_u8(data.is_flat as u8);
    // No death location
    buf.put_u8(0);
    write_varint(buf, data.portal_cooldown);
    Ok(())
}

fn write_join_game_common(buf: &mut BytesMut, data: &JoinGameData, dimension_by_index: bool) {
    buf.put_i32(data.entity_id);
    buf.put_u8(data.hardcore as u8);
    write_dimension_names(buf, data);
    write_varint(buf, data.max_players);
    write_varint(buf, data.view_distance);
    write_varint(buf, data.simulation_distance);
    buf.put_u8(data.reduced_debug_info as u8);
    buf.put_u8(data.enable_respawn_screen as u8);
    buf.put_u8(data.do_limited_crafting as u8);
    if dimension_by_index {
        write_varint(buf, data.dimension.registry_index());
    } else {
        write_string(buf, data.dimension.identifier());
    }
    write_string(buf, data.dimension.identifier());
    buf.put_i64(data.hashed_seed);
    buf.put_u8(data.game_mode);
    buf.put_i8(data.previous_game_mode);
    buf.put_u8(data.is_debug as u8);
    buf.put_u8(data.is_flat as u8);
    // No death location
    buf.put_u8(0);
    write_varint(buf, data.portal_cooldown);
}

/// 1.20.2 - 1.20.4: dimension type by identifier.
pub fn encode_join_game_v764(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let data = join_data(packet)?;
    write_join_game_common(buf, data, false);
    Ok(())
}

/// 1.20.5+: dimension type by registry index, plus secure chat flag.
pub fn encode_join_game_v766(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let data = join_data(packet)?;
    write_join_game_common(buf, data, true);
    buf.put_u8(data.enforces_secure_chat as u8);
    Ok(())
}

// === Position and world ===

fn write_position_look(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<i32> {
    let WirePacket::SynchronizePlayerPosition {
        x,
        y,
        z,
        yaw,
        pitch,
        flags,
        teleport_id,
    } = packet
    else {
        return Err(mismatch(PacketKind::SynchronizePlayerPosition, packet));
    };
    buf.put_f64(*x);
    buf.put_f64(*y);
    buf.put_f64(*z);
    buf.put_f32(*yaw);
    buf.put_f32(*pitch);
    buf.put_u8(*flags);
    Ok(*teleport_id)
}

/// 1.8: no teleport confirmation.
pub fn encode_sync_position_v47(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    write_position_look(packet, buf).map(|_| ())
}

pub fn encode_sync_position(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let teleport_id = write_position_look(packet, buf)?;
    write_varint(buf, teleport_id);
    Ok(())
}

/// Packed position only (before 1.17).
pub fn encode_spawn_position_legacy(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::SetDefaultSpawnPosition { location, .. } = packet else {
        return Err(mismatch(PacketKind::SetDefaultSpawnPosition, packet));
    };
    buf.put_u64(*location);
    Ok(())
}

pub fn encode_spawn_position(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::SetDefaultSpawnPosition { location, angle } = packet else {
        return Err(mismatch(PacketKind::SetDefaultSpawnPosition, packet));
    };
    buf.put_u64(*location);
    buf.put_f32(*angle);
    Ok(())
}

fn write_chunk(packet: &WirePacket, buf: &mut BytesMut, style: RootStyle) -> CodecResult<()> {
    let WirePacket::ChunkDataAndUpdateLight {
        chunk_x,
        chunk_z,
        heightmaps,
        data,
        light,
    } = packet
    else {
        return Err(mismatch(PacketKind::ChunkDataAndUpdateLight, packet));
    };
    buf.put_i32(*chunk_x);
    buf.put_i32(*chunk_z);
    heightmaps.write_root(style, buf);
    write_byte_array(buf, data);
    // No block entities
    write_varint(buf, 0);
    write_light_data(buf, light);
    Ok(())
}

fn write_bitset(buf: &mut BytesMut, longs: &[i64]) {
    write_varint(buf, longs.len() as i32);
    for v in longs {
        buf.put_i64(*v);
    }
}

fn write_light_arrays(buf: &mut BytesMut, arrays: &[Vec<u8>]) {
    write_varint(buf, arrays.len() as i32);
    for arr in arrays {
        write_byte_array(buf, arr);
    }
}

fn write_light_data(buf: &mut BytesMut, light: &ChunkLightData) {
    write_bitset(buf, &light.sky_light_mask);
    write_bitset(buf, &light.block_light_mask);
    write_bitset(buf, &light.empty_sky_light_mask);
    write_bitset(buf, &light.empty_block_light_mask);
    write_light_arrays(buf, &light.sky_light_arrays);
    write_light_arrays(buf, &light.block_light_arrays);
}

/// 1.20 - 1.20.1: heightmaps as a named NBT root.
pub fn encode_chunk_data_named(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    write_chunk(packet, buf, RootStyle::Named)
}

pub fn encode_chunk_data(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    write_chunk(packet, buf, RootStyle::Nameless)
}

pub fn encode_set_center_chunk(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::SetCenterChunk { chunk_x, chunk_z } = packet else {
        return Err(mismatch(PacketKind::SetCenterChunk, packet));
    };
    write_varint(buf, *chunk_x);
    write_varint(buf, *chunk_z);
    Ok(())
}

pub fn encode_game_event(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::GameEvent { event, value } = packet else {
        return Err(mismatch(PacketKind::GameEvent, packet));
    };
    buf.put_u8(*event);
    buf.put_f32(*value);
    Ok(())
}

pub fn encode_update_time(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::UpdateTime {
        world_age,
        time_of_day,
    } = packet
    else {
        return Err(mismatch(PacketKind::UpdateTime, packet));
    };
    buf.put_i64(*world_age);
    buf.put_i64(*time_of_day);
    Ok(())
}

pub fn encode_player_abilities(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::PlayerAbilities {
        flags,
        flying_speed,
        field_of_view,
    } = packet
    else {
        return Err(mismatch(PacketKind::PlayerAbilities, packet));
    };
    buf.put_u8(*flags);
    buf.put_f32(*flying_speed);
    buf.put_f32(*field_of_view);
    Ok(())
}

pub fn encode_transfer(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::Transfer { host, port } = packet else {
        return Err(mismatch(PacketKind::Transfer, packet));
    };
    write_string(buf, host);
    write_varint(buf, *port);
    Ok(())
}

pub fn encode_start_configuration(packet: &WirePacket, _buf: &mut BytesMut) -> CodecResult<()> {
    match packet {
        WirePacket::StartConfiguration => Ok(()),
        other => Err(mismatch(PacketKind::StartConfiguration, other)),
    }
}

// === Chat and overlays ===

/// Pre-1.19 chat with a position byte.
pub fn encode_legacy_chat(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::LegacyChat { message, position } = packet else {
        return Err(mismatch(PacketKind::LegacyChat, packet));
    };
    write_text(buf, message, TextFormat::Json);
    buf.put_i8(*position);
    Ok(())
}

fn encode_system_chat(packet: &WirePacket, buf: &mut BytesMut, format: TextFormat) -> CodecResult<()> {
    let WirePacket::SystemChat { content, overlay } = packet else {
        return Err(mismatch(PacketKind::SystemChat, packet));
    };
    write_text(buf, content, format);
    buf.put_u8(*overlay as u8);
    Ok(())
}

text_encoders!(encode_system_chat_json, encode_system_chat_nbt => encode_system_chat);

fn encode_tab_list(packet: &WirePacket, buf: &mut BytesMut, format: TextFormat) -> CodecResult<()> {
    let WirePacket::TabList { header, footer } = packet else {
        return Err(mismatch(PacketKind::TabList, packet));
    };
    write_text(buf, header, format);
    write_text(buf, footer, format);
    Ok(())
}

text_encoders!(encode_tab_list_json, encode_tab_list_nbt => encode_tab_list);

/// Always the "add" action: a limbo only ever shows one fixed bar.
fn encode_boss_bar(packet: &WirePacket, buf: &mut BytesMut, format: TextFormat) -> CodecResult<()> {
    let WirePacket::BossBar {
        uuid,
        title,
        health,
        color,
        division,
        flags,
    } = packet
    else {
        return Err(mismatch(PacketKind::BossBar, packet));
    };
    write_uuid(buf, uuid);
    write_varint(buf, 0);
    write_text(buf, title, format);
    buf.put_f32(*health);
    write_varint(buf, *color);
    write_varint(buf, *division);
    buf.put_u8(*flags);
    Ok(())
}

text_encoders!(encode_boss_bar_json, encode_boss_bar_nbt => encode_boss_bar);

fn legacy_title_action(packet: &WirePacket) -> CodecResult<&LegacyTitleAction> {
    match packet {
        WirePacket::LegacyTitle { action } => Ok(action),
        other => Err(mismatch(PacketKind::LegacyTitle, other)),
    }
}

fn write_title_times(buf: &mut BytesMut, fade_in: i32, stay: i32, fade_out: i32) {
    buf.put_i32(fade_in);
    buf.put_i32(stay);
    buf.put_i32(fade_out);
}

/// 1.8 - 1.10 numbering: no action bar action.
pub fn encode_legacy_title_v47(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    match legacy_title_action(packet)? {
        LegacyTitleAction::SetTitle(text) => {
            write_varint(buf, 0);
            write_text(buf, text, TextFormat::Json);
        }
        LegacyTitleAction::SetSubtitle(text) => {
            write_varint(buf, 1);
            write_text(buf, text, TextFormat::Json);
        }
        LegacyTitleAction::SetTimes {
            fade_in,
            stay,
            fade_out,
        } => {
            write_varint(buf, 2);
            write_title_times(buf, *fade_in, *stay, *fade_out);
        }
        LegacyTitleAction::Hide => write_varint(buf, 3),
        LegacyTitleAction::Reset => write_varint(buf, 4),
        LegacyTitleAction::SetActionBar(_) => {
            return Err(CodecError::InvalidValue {
                field: "title_action",
                value: 2,
            })
        }
    }
    Ok(())
}

/// 1.11 - 1.16.5 numbering.
pub fn encode_legacy_title_v315(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    match legacy_title_action(packet)? {
        LegacyTitleAction::SetTitle(text) => {
            write_varint(buf, 0);
            write_text(buf, text, TextFormat::Json);
        }
        LegacyTitleAction::SetSubtitle(text) => {
            write_varint(buf, 1);
            write_text(buf, text, TextFormat::Json);
        }
        LegacyTitleAction::SetActionBar(text) => {
            write_varint(buf, 2);
            write_text(buf, text, TextFormat::Json);
        }
        LegacyTitleAction::SetTimes {
            fade_in,
            stay,
            fade_out,
        } => {
            write_varint(buf, 3);
            write_title_times(buf, *fade_in, *stay, *fade_out);
        }
        LegacyTitleAction::Hide => write_varint(buf, 4),
        LegacyTitleAction::Reset => write_varint(buf, 5),
    }
    Ok(())
}

fn encode_title_text(packet: &WirePacket, buf: &mut BytesMut, format: TextFormat) -> CodecResult<()> {
    let WirePacket::TitleText { text } = packet else {
        return Err(mismatch(PacketKind::TitleText, packet));
    };
    write_text(buf, text, format);
    Ok(())
}

text_encoders!(encode_title_text_json, encode_title_text_nbt => encode_title_text);

fn encode_subtitle_text(packet: &WirePacket, buf: &mut BytesMut, format: TextFormat) -> CodecResult<()> {
    let WirePacket::SubtitleText { text } = packet else {
        return Err(mismatch(PacketKind::SubtitleText, packet));
    };
    write_text(buf, text, format);
    Ok(())
}

text_encoders!(encode_subtitle_text_json, encode_subtitle_text_nbt => encode_subtitle_text);

fn encode_action_bar(packet: &WirePacket, buf: &mut BytesMut, format: TextFormat) -> CodecResult<()> {
    let WirePacket::ActionBar { text } = packet else {
        return Err(mismatch(PacketKind::ActionBar, packet));
    };
    write_text(buf, text, format);
    Ok(())
}

text_encoders!(encode_action_bar_json, encode_action_bar_nbt => encode_action_bar);

pub fn encode_title_animation(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::TitleAnimation {
        fade_in,
        stay,
        fade_out,
    } = packet
    else {
        return Err(mismatch(PacketKind::TitleAnimation, packet));
    };
    write_title_times(buf, *fade_in, *stay, *fade_out);
    Ok(())
}
