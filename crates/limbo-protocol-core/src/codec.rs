use crate::packets::{PacketKind, WirePacket};
use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use uuid::Uuid;

/// Failure to read or write the fields of a single packet.
///
/// A codec error never desynchronizes the stream: the frame boundary is
/// already known when a packet body is parsed.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("VarInt too big")]
    VarIntTooBig,
    #[error("Not enough data")]
    NotEnoughData,
    #[error("String too long: {0} > {1}")]
    StringTooLong(usize, usize),
    #[error("String is not valid UTF-8")]
    InvalidUtf8,
    #[error("Negative length prefix: {0}")]
    NegativeLength(i32),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: i64 },
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("codec for {expected:?} was handed a {actual:?} packet")]
    PacketMismatch {
        expected: PacketKind,
        actual: PacketKind,
    },
    #[error("{0:?} cannot travel in this direction")]
    WrongDirection(PacketKind),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Maximum length of a VarInt in bytes.
pub const MAX_VARINT_LEN: usize = 5;

/// Read a VarInt from the buffer.
pub fn read_varint(buf: &mut BytesMut) -> CodecResult<i32> {
    let mut result: i32 = 0;
    let mut shift: u32 = 0;
    loop {
        if !buf.has_remaining() {
            return Err(CodecError::NotEnoughData);
        }
        let byte = buf.get_u8();
        result |= ((byte & 0x7F) as i32) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 32 {
            return Err(CodecError::VarIntTooBig);
        }
    }
}

/// Peek a VarInt at the start of a slice without consuming it.
///
/// Returns `Ok(None)` when the slice ends before the VarInt does, and the
/// decoded value together with its encoded length otherwise.
pub fn peek_varint(data: &[u8]) -> CodecResult<Option<(i32, usize)>> {
    let mut result: i32 = 0;
    for (i, &byte) in data.iter().take(MAX_VARINT_LEN).enumerate() {
        result |= ((byte & 0x7F) as i32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((result, i + 1)));
        }
    }
    if data.len() >= MAX_VARINT_LEN {
        Err(CodecError::VarIntTooBig)
    } else {
        Ok(None)
    }
}

/// Write a VarInt to the buffer.
pub fn write_varint(buf: &mut BytesMut, mut value: i32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Calculate the byte length of a VarInt.
pub fn varint_len(value: i32) -> usize {
    let mut val = value as u32;
    let mut len = 0;
    loop {
        len += 1;
        val >>= 7;
        if val == 0 {
            break;
        }
    }
    len
}

/// Read a VarLong from the buffer.
pub fn read_varlong(buf: &mut BytesMut) -> CodecResult<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    loop {
        if !buf.has_remaining() {
            return Err(CodecError::NotEnoughData);
        }
        let byte = buf.get_u8();
        result |= ((byte & 0x7F) as i64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(CodecError::VarIntTooBig);
        }
    }
}

fn ensure(buf: &BytesMut, len: usize) -> CodecResult<()> {
    if buf.remaining() < len {
        Err(CodecError::NotEnoughData)
    } else {
        Ok(())
    }
}

fn read_length(buf: &mut BytesMut) -> CodecResult<usize> {
    let len = read_varint(buf)?;
    if len < 0 {
        return Err(CodecError::NegativeLength(len));
    }
    Ok(len as usize)
}

pub fn read_u8(buf: &mut BytesMut) -> CodecResult<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn read_i8(buf: &mut BytesMut) -> CodecResult<i8> {
    ensure(buf, 1)?;
    Ok(buf.get_i8())
}

pub fn read_bool(buf: &mut BytesMut) -> CodecResult<bool> {
    Ok(read_u8(buf)? != 0)
}

pub fn read_u16(buf: &mut BytesMut) -> CodecResult<u16> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

pub fn read_i32(buf: &mut BytesMut) -> CodecResult<i32> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

pub fn read_i64(buf: &mut BytesMut) -> CodecResult<i64> {
    ensure(buf, 8)?;
    Ok(buf.get_i64())
}

pub fn read_f32(buf: &mut BytesMut) -> CodecResult<f32> {
    ensure(buf, 4)?;
    Ok(buf.get_f32())
}

pub fn read_f64(buf: &mut BytesMut) -> CodecResult<f64> {
    ensure(buf, 8)?;
    Ok(buf.get_f64())
}

/// Read a protocol string (varint-prefixed UTF-8).
pub fn read_string(buf: &mut BytesMut, max_len: usize) -> CodecResult<String> {
    let len = read_length(buf)?;
    if len > max_len * 4 {
        return Err(CodecError::StringTooLong(len, max_len));
    }
    ensure(buf, len)?;
    let bytes = buf.split_to(len);
    let s = String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)?;
    if s.chars().count() > max_len {
        return Err(CodecError::StringTooLong(s.chars().count(), max_len));
    }
    Ok(s)
}

/// Write a protocol string.
pub fn write_string(buf: &mut BytesMut, s: &str) {
    write_varint(buf, s.len() as i32);
    buf.put_slice(s.as_bytes());
}

/// Read a UUID (128 bits, big endian).
pub fn read_uuid(buf: &mut BytesMut) -> CodecResult<Uuid> {
    ensure(buf, 16)?;
    let mut bytes = [0u8; 16];
    buf.copy_to_slice(&mut bytes);
    Ok(Uuid::from_bytes(bytes))
}

/// Write a UUID.
pub fn write_uuid(buf: &mut BytesMut, uuid: &Uuid) {
    buf.put_slice(uuid.as_bytes());
}

/// Read a byte array with varint length prefix.
pub fn read_byte_array(buf: &mut BytesMut) -> CodecResult<Vec<u8>> {
    let len = read_length(buf)?;
    ensure(buf, len)?;
    let bytes = buf.split_to(len);
    Ok(bytes.to_vec())
}

/// Write a byte array with varint length prefix.
pub fn write_byte_array(buf: &mut BytesMut, data: &[u8]) {
    write_varint(buf, data.len() as i32);
    buf.put_slice(data);
}

/// Error for an encoder handed the wrong kind of packet.
pub fn mismatch(expected: PacketKind, actual: &WirePacket) -> CodecError {
    CodecError::PacketMismatch {
        expected,
        actual: actual.kind(),
    }
}

/// Take everything left in the buffer (plugin message payloads).
pub fn read_remaining(buf: &mut BytesMut) -> Vec<u8> {
    let rest = buf.split();
    rest.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        let test_cases = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (255, vec![0xFF, 0x01]),
            (25565, vec![0xDD, 0xC7, 0x01]),
            (2097151, vec![0xFF, 0xFF, 0x7F]),
            (-1, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];

        for (value, expected_bytes) in test_cases {
            let mut buf = BytesMut::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.to_vec(), expected_bytes, "write_varint({}) failed", value);

            let mut buf = BytesMut::from(&expected_bytes[..]);
            let result = read_varint(&mut buf).unwrap();
            assert_eq!(result, value, "read_varint for {} failed", value);

            assert_eq!(
                peek_varint(&expected_bytes).unwrap(),
                Some((value, expected_bytes.len()))
            );
        }
    }

    #[test]
    fn test_peek_varint_partial_and_overlong() {
        assert_eq!(peek_varint(&[]).unwrap(), None);
        assert_eq!(peek_varint(&[0x80, 0x80]).unwrap(), None);
        assert!(matches!(
            peek_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]),
            Err(CodecError::VarIntTooBig)
        ));
    }

    #[test]
    fn test_varint_len() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(25565), 3);
        assert_eq!(varint_len(-1), 5);
    }

    #[test]
    fn test_string_roundtrip() {
        let test_str = "Hello, Minecraft!";
        let mut buf = BytesMut::new();
        write_string(&mut buf, test_str);
        let result = read_string(&mut buf, 32767).unwrap();
        assert_eq!(result, test_str);
    }

    #[test]
    fn test_string_limit_is_in_characters() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "seventeen_letters");
        assert!(matches!(
            read_string(&mut buf, 16),
            Err(CodecError::StringTooLong(17, 16))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 3);
        buf.put_slice(&[b'a', 0xC3, 0x28]);
        assert!(matches!(read_string(&mut buf, 16), Err(CodecError::InvalidUtf8)));
    }

    #[test]
    fn test_short_reads_fail_cleanly() {
        let mut buf = BytesMut::from(&[0x00, 0x01][..]);
        assert!(matches!(read_i32(&mut buf), Err(CodecError::NotEnoughData)));
        let mut buf = BytesMut::from(&[0x05, b'a'][..]);
        assert!(matches!(read_byte_array(&mut buf), Err(CodecError::NotEnoughData)));
    }

    #[test]
    fn test_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let mut buf = BytesMut::new();
        write_uuid(&mut buf, &uuid);
        let result = read_uuid(&mut buf).unwrap();
        assert_eq!(result, uuid);
    }
}
