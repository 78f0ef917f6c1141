//! Layouts shared by more than one connection state.

use crate::text::{write_text, TextFormat};
use bytes::{BufMut, BytesMut};
use limbo_protocol_core::*;

fn encode_disconnect(packet: &WirePacket, buf: &mut BytesMut, format: TextFormat) -> CodecResult<()> {
    let WirePacket::Disconnect { reason } = packet else {
        return Err(mismatch(PacketKind::Disconnect, packet));
    };
    write_text(buf, reason, format);
    Ok(())
}

text_encoders!(encode_disconnect_json, encode_disconnect_nbt => encode_disconnect);

pub fn decode_plugin_message(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let channel = read_string(buf, 32767)?;
    Ok(WirePacket::ServerboundPluginMessage {
        channel,
        data: read_remaining(buf),
    })
}

/// Channel name followed by the raw payload, unprefixed.
pub fn encode_plugin_message(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::ClientboundPluginMessage { channel, data } = packet else {
        return Err(mismatch(PacketKind::ClientboundPluginMessage, packet));
    };
    write_string(buf, channel);
    buf.put_slice(data);
    Ok(())
}

/// Long keep-alive ids (1.12.2+).
pub fn decode_keep_alive(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::ServerboundKeepAlive { id: read_i64(buf)? })
}

/// VarInt keep-alive ids (1.8 - 1.12.1).
pub fn decode_keep_alive_varint(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::ServerboundKeepAlive {
        id: read_varint(buf)? as i64,
    })
}

pub fn encode_keep_alive(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::ClientboundKeepAlive { id } = packet else {
        return Err(mismatch(PacketKind::ClientboundKeepAlive, packet));
    };
    buf.put_i64(*id);
    Ok(())
}

pub fn encode_keep_alive_varint(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::ClientboundKeepAlive { id } = packet else {
        return Err(mismatch(PacketKind::ClientboundKeepAlive, packet));
    };
    let narrow = i32::try_from(*id).map_err(|_| CodecError::InvalidValue {
        field: "keep_alive_id",
        value: *id,
    })?;
    write_varint(buf, narrow);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use limbo_types::TextComponent;

    #[test]
    fn test_disconnect_text_formats() {
        let packet = WirePacket::Disconnect {
            reason: TextComponent::plain("bye"),
        };
        let mut json = BytesMut::new();
        encode_disconnect_json(&packet, &mut json).unwrap();
        assert_eq!(read_string(&mut json, 32767).unwrap(), r#"{"text":"bye"}"#);

        let mut nbt = BytesMut::new();
        encode_disconnect_nbt(&packet, &mut nbt).unwrap();
        // TAG_Compound, then TAG_String named "text"
        assert_eq!(&nbt[..3], &[0x0A, 0x08, 0x00]);
    }

    #[test]
    fn test_varint_keep_alive_refuses_wide_ids() {
        let mut buf = BytesMut::new();
        let wide = WirePacket::ClientboundKeepAlive { id: 1 << 40 };
        assert!(matches!(
            encode_keep_alive_varint(&wide, &mut buf),
            Err(CodecError::InvalidValue { .. })
        ));

        let mut buf = BytesMut::new();
        encode_keep_alive_varint(&WirePacket::ClientboundKeepAlive { id: 300 }, &mut buf).unwrap();
        assert_eq!(
            decode_keep_alive_varint(&mut buf).unwrap(),
            WirePacket::ServerboundKeepAlive { id: 300 }
        );
    }

    #[test]
    fn test_plugin_message_payload_is_raw() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "minecraft:brand");
        buf.put_slice(&[1, 2, 3]);
        assert_eq!(
            decode_plugin_message(&mut buf).unwrap(),
            WirePacket::ServerboundPluginMessage {
                channel: "minecraft:brand".into(),
                data: vec![1, 2, 3],
            }
        );
    }
}
