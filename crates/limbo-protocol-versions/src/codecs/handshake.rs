use bytes::{BufMut, BytesMut};
use limbo_protocol_core::*;

// === Handshake ===

/// Vanilla caps the address at 255 characters, but proxies that forward
/// player data through it need far more.
const MAX_HANDSHAKE_ADDRESS: usize = 32767;

pub fn decode_handshake(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let protocol_version = read_varint(buf)?;
    let server_address = read_string(buf, MAX_HANDSHAKE_ADDRESS)?;
    let server_port = read_u16(buf)?;
    let next_state = read_varint(buf)?;
    Ok(WirePacket::Handshake {
        protocol_version,
        server_address,
        server_port,
        next_state,
    })
}

// === Status ===

pub fn decode_status_request(_buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::StatusRequest)
}

pub fn decode_ping(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::PingRequest {
        payload: read_i64(buf)?,
    })
}

pub fn encode_status_response(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::StatusResponse { json } = packet else {
        return Err(mismatch(PacketKind::StatusResponse, packet));
    };
    write_string(buf, json);
    Ok(())
}

pub fn encode_pong(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::PongResponse { payload } = packet else {
        return Err(mismatch(PacketKind::PongResponse, packet));
    };
    buf.put_i64(*payload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_handshake() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 767);
        write_string(&mut buf, "localhost");
        buf.put_u16(25565);
        write_varint(&mut buf, 2);
        assert_eq!(
            decode_handshake(&mut buf).unwrap(),
            WirePacket::Handshake {
                protocol_version: 767,
                server_address: "localhost".into(),
                server_port: 25565,
                next_state: 2,
            }
        );
    }

    #[test]
    fn test_truncated_handshake_is_a_codec_error() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 47);
        write_string(&mut buf, "host");
        buf.put_u8(0x63);
        assert!(matches!(
            decode_handshake(&mut buf),
            Err(CodecError::NotEnoughData)
        ));
    }

    #[test]
    fn test_pong_rejects_other_packets() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_pong(&WirePacket::StatusRequest, &mut buf),
            Err(CodecError::PacketMismatch { .. })
        ));
    }
}
