use bytes::{BufMut, BytesMut};
use limbo_nbt::RootStyle;
use limbo_protocol_core::*;

// === Serverbound ===

/// Only the locale and view distance matter here; the rest is skipped.
pub fn decode_client_information(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let locale = read_string(buf, 16)?;
    let view_distance = read_i8(buf)?;
    read_remaining(buf);
    Ok(WirePacket::ClientInformation {
        locale,
        view_distance,
    })
}

pub fn decode_finish_configuration_ack(_buf: &mut BytesMut) -> CodecResult<WirePacket> {
    Ok(WirePacket::FinishConfigurationAck)
}

pub fn decode_known_packs(buf: &mut BytesMut) -> CodecResult<WirePacket> {
    let count = read_varint(buf)?;
    if count < 0 {
        return Err(CodecError::NegativeLength(count));
    }
    let mut packs = Vec::with_capacity((count as usize).min(64));
    for _ in 0..count {
        let namespace = read_string(buf, 32767)?;
        let id = read_string(buf, 32767)?;
        let version = read_string(buf, 32767)?;
        packs.push(KnownPack {
            namespace,
            id,
            version,
        });
    }
    Ok(WirePacket::KnownPacksResponse { packs })
}

// === Clientbound ===

pub fn encode_finish_configuration(packet: &WirePacket, _buf: &mut BytesMut) -> CodecResult<()> {
    match packet {
        WirePacket::FinishConfiguration => Ok(()),
        other => Err(mismatch(PacketKind::FinishConfiguration, other)),
    }
}

/// The whole registry codec as one nameless NBT compound (1.20.2 - 1.20.4).
pub fn encode_registry_codec(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::RegistryCodec { codec } = packet else {
        return Err(mismatch(PacketKind::RegistryCodec, packet));
    };
    codec.write_root(RootStyle::Nameless, buf);
    Ok(())
}

/// One registry per packet (1.20.5+).
pub fn encode_registry_data(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::RegistryData {
        registry_id,
        entries,
    } = packet
    else {
        return Err(mismatch(PacketKind::RegistryData, packet));
    };
    write_string(buf, registry_id);
    write_varint(buf, entries.len() as i32);
    for entry in entries {
        write_string(buf, &entry.id);
        if let Some(ref data) = entry.data {
            buf.put_u8(1);
            data.write_root(RootStyle::Nameless, buf);
        } else {
            buf.put_u8(0);
        }
    }
    Ok(())
}

pub fn encode_known_packs(packet: &WirePacket, buf: &mut BytesMut) -> CodecResult<()> {
    let WirePacket::KnownPacksRequest { packs } = packet else {
        return Err(mismatch(PacketKind::KnownPacksRequest, packet));
    };
    write_varint(buf, packs.len() as i32);
    for pack in packs {
        write_string(buf, &pack.namespace);
        write_string(buf, &pack.id);
        write_string(buf, &pack.version);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use limbo_nbt::{nbt_compound, NbtValue};

    #[test]
    fn test_client_information_skips_trailing_fields() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "en_us");
        buf.put_i8(12);
        write_varint(&mut buf, 0);
        buf.put_u8(1);
        buf.put_u8(0x7F);
        assert_eq!(
            decode_client_information(&mut buf).unwrap(),
            WirePacket::ClientInformation {
                locale: "en_us".into(),
                view_distance: 12,
            }
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_known_packs_roundtrip() {
        let packs = vec![KnownPack {
            namespace: "minecraft".into(),
            id: "core".into(),
            version: "1.21".into(),
        }];
        let mut buf = BytesMut::new();
        encode_known_packs(
            &WirePacket::KnownPacksRequest {
                packs: packs.clone(),
            },
            &mut buf,
        )
        .unwrap();
        assert_eq!(
            decode_known_packs(&mut buf).unwrap(),
            WirePacket::KnownPacksResponse { packs }
        );
    }

    #[test]
    fn test_registry_data_layout() {
        let packet = WirePacket::RegistryData {
            registry_id: "minecraft:test".into(),
            entries: vec![
                RegistryEntry {
                    id: "minecraft:a".into(),
                    data: Some(nbt_compound! { "x" => NbtValue::Int(1) }),
                },
                RegistryEntry {
                    id: "minecraft:b".into(),
                    data: None,
                },
            ],
        };
        let mut buf = BytesMut::new();
        encode_registry_data(&packet, &mut buf).unwrap();
        assert_eq!(read_string(&mut buf, 32767).unwrap(), "minecraft:test");
        assert_eq!(read_varint(&mut buf).unwrap(), 2);
        assert_eq!(read_string(&mut buf, 32767).unwrap(), "minecraft:a");
        assert!(read_bool(&mut buf).unwrap());
    }
}
