use bytes::{BufMut, BytesMut};
use limbo_protocol_core::*;
use limbo_types::ProfileProperty;

// === Serverbound ===

/// Name only (1.8 - 1.18.2).
pub fn decode_login_start_name(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::LoginStart {
        name: read_string(buf, 16)?,
        uuid: None,
    })
}

/// Name plus an optional UUID (1.19.3 - 1.20.1).
pub fn decode_login_start_optional_uuid(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let name = read_string(buf, 16)?;
    let uuid = if read_bool(buf)? {
        Some(read_uuid(buf)?)
    } else {
        None
    };
    Ok(WirePacket::LoginStart { name, uuid })
}

/// Name plus a mandatory UUID (1.20.2+).
pub fn decode_login_start_uuid(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let name = read_string(buf, 16)?;
    let uuid = read_uuid(buf)?;
    Ok(WirePacket::LoginStart {
        name,
        uuid: Some(uuid),
    })
}

pub fn decode_encryption_response(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let shared_secret = read_byte_array(buf)?;
    let verify_token = read_byte_array(buf)?;
    Ok(WirePacket::EncryptionResponse {
        shared_secret,
        verify_token,
    })
}

pub fn decode_login_acknowledged(_buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::LoginAcknowledged)
}

/// Message id, a success flag, then the raw answer (1.13+).
pub fn decode_login_plugin_response(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let message_id = read_varint(buf)?;
    let data = if read_bool(buf)? {
        Some(read_remaining(buf))
    } else {
        None
    };
    Ok(WirePacket::LoginPluginResponse { message_id, data })
}

// === Clientbound ===

fn write_encryption_request(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<bool> {
    let WirePacket::EncryptionRequest {
        server_id,
        public_key,
        verify_token,
        should_authenticate,
    } = packet
    else {
        return Err(mismatch(PacketKind::EncryptionRequest, packet));
    };
    write_string(buf, server_id);
    write_byte_array(buf, public_key);
    write_byte_array(buf, verify_token);
    Ok(*should_authenticate)
}

pub fn encode_encryption_request(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    write_encryption_request(packet, buf).map(|_| ())
}

/// 1.20.5+ appends the "should authenticate" flag.
pub fn encode_encryption_request_authenticate(
    packet: &WirePacket,
    buf: &mut BytesMut,
) -> CodecResult<()> {
    let should_authenticate = write_encryption_request(packet, buf)?;
    buf.put_u8(should_authenticate as u8);
    Ok(())
}

/// Hyphenated UUID string and name (1.8 - 1.15.2).
pub fn encode_login_success_string_uuid(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::LoginSuccess { uuid, name, .. } = packet else {
        return Err(mismatch(PacketKind::LoginSuccess, packet));
    };
    write_string(buf, &uuid.hyphenated().to_string());
    write_string(buf, name);
    Ok(())
}

fn write_properties(buf: &mut BytesMut, properties: &[ProfileProperty]) {
    write_varint(buf, properties.len() as i32);
    for prop in properties {
        write_string(buf, &prop.name);
        write_string(buf, &prop.value);
        if let Some(ref sig) = prop.signature {
            buf.put_u8(1);
            write_string(buf, sig);
        } else {
            buf.put_u8(0);
        }
    }
}

/// Binary UUID, name and profile properties (1.19 - 1.20.4).
pub fn encode_login_success_properties(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::LoginSuccess {
        uuid,
        name,
        properties,
    } = packet
    else {
        return Err(mismatch(PacketKind::LoginSuccess, packet));
    };
    write_uuid(buf, uuid);
    write_string(buf, name);
    write_properties(buf, properties);
    Ok(())
}

/// 1.20.5 - 1.21.1 append "strict error handling".
pub fn encode_login_success_strict(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    encode_login_success_properties(packet, buf)?;
    buf.put_u8(0);
    Ok(())
}

pub fn encode_login_plugin_request(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::LoginPluginRequest {
        message_id,
        channel,
        data,
    } = packet
    else {
        return Err(mismatch(PacketKind::LoginPluginRequest, packet));
    };
    write_varint(buf, *message_id);
    write_string(buf, channel);
    buf.put_slice(data);
    Ok(())
}

pub fn encode_set_compression(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::SetCompression { threshold } = packet else {
        return Err(mismatch(PacketKind::SetCompression, packet));
    };
    write_varint(buf, *threshold);
    Ok(())
}
