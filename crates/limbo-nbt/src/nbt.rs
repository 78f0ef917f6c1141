use bytes::{BufMut, BytesMut};

/// NBT tag type IDs.
pub const TAG_END: u8 = 0;
pub const TAG_BYTE: u8 = 1;
pub const TAG_SHORT: u8 = 2;
pub const TAG_INT: u8 = 3;
pub const TAG_LONG: u8 = 4;
pub const TAG_FLOAT: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_BYTE_ARRAY: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_LIST: u8 = 9;
pub const TAG_COMPOUND: u8 = 10;
pub const TAG_INT_ARRAY: u8 = 11;
pub const TAG_LONG_ARRAY: u8 = 12;

/// An NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<NbtValue>),
    Compound(Vec<(String, NbtValue)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// How the root tag of a network NBT blob is written.
///
/// Clients before 1.20.2 expect a named root (with an empty name); newer
/// clients expect the name to be omitted entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStyle {
    Named,
    Nameless,
}

impl NbtValue {
    pub fn tag_id(&self) -> u8 {
        match self {
            NbtValue::Byte(_) => TAG_BYTE,
            NbtValue::Short(_) => TAG_SHORT,
            NbtValue::Int(_) => TAG_INT,
            NbtValue::Long(_) => TAG_LONG,
            NbtValue::Float(_) => TAG_FLOAT,
            NbtValue::Double(_) => TAG_DOUBLE,
            NbtValue::ByteArray(_) => TAG_BYTE_ARRAY,
            NbtValue::String(_) => TAG_STRING,
            NbtValue::List(_) => TAG_LIST,
            NbtValue::Compound(_) => TAG_COMPOUND,
            NbtValue::IntArray(_) => TAG_INT_ARRAY,
            NbtValue::LongArray(_) => TAG_LONG_ARRAY,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        NbtValue::String(value.into())
    }

    pub fn bool(value: bool) -> Self {
        NbtValue::Byte(value as i8)
    }

    /// Look up a field of a compound by name.
    pub fn get(&self, key: &str) -> Option<&NbtValue> {
        match self {
            NbtValue::Compound(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Append a field to a compound. No-op on other tags.
    pub fn push(&mut self, key: impl Into<String>, value: NbtValue) {
        if let NbtValue::Compound(entries) = self {
            entries.push((key.into(), value));
        }
    }

    /// Write this value as a network root tag in the given style.
    pub fn write_root(&self, style: RootStyle, buf: &mut BytesMut) {
        match style {
            RootStyle::Named => self.write_root_named("", buf),
            RootStyle::Nameless => self.write_root_network(buf),
        }
    }

    /// Write this value as a root tag with type byte but no name (1.20.2+).
    pub fn write_root_network(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tag_id());
        self.write_payload(buf);
    }

    /// Write this value as a full named root tag.
    pub fn write_root_named(&self, name: &str, buf: &mut BytesMut) {
        buf.put_u8(self.tag_id());
        write_nbt_string(name, buf);
        self.write_payload(buf);
    }

    /// Write just the payload (no tag type or name).
    pub fn write_payload(&self, buf: &mut BytesMut) {
        match self {
            NbtValue::Byte(v) => buf.put_i8(*v),
            NbtValue::Short(v) => buf.put_i16(*v),
            NbtValue::Int(v) => buf.put_i32(*v),
            NbtValue::Long(v) => buf.put_i64(*v),
            NbtValue::Float(v) => buf.put_f32(*v),
            NbtValue::Double(v) => buf.put_f64(*v),
            NbtValue::ByteArray(v) => {
                buf.put_i32(v.len() as i32);
                for b in v {
                    buf.put_i8(*b);
                }
            }
            NbtValue::String(v) => write_nbt_string(v, buf),
            NbtValue::List(v) => {
                // Empty lists are written as lists of TAG_End.
                let element_tag = v.first().map_or(TAG_END, NbtValue::tag_id);
                buf.put_u8(element_tag);
                buf.put_i32(v.len() as i32);
                for item in v {
                    item.write_payload(buf);
                }
            }
            NbtValue::Compound(entries) => {
                for (name, value) in entries {
                    buf.put_u8(value.tag_id());
                    write_nbt_string(name, buf);
                    value.write_payload(buf);
                }
                buf.put_u8(TAG_END);
            }
            NbtValue::IntArray(v) => {
                buf.put_i32(v.len() as i32);
                for i in v {
                    buf.put_i32(*i);
                }
            }
            NbtValue::LongArray(v) => {
                buf.put_i32(v.len() as i32);
                for l in v {
                    buf.put_i64(*l);
                }
            }
        }
    }

    /// Serialize into a fresh buffer.
    pub fn to_bytes(&self, style: RootStyle) -> BytesMut {
        let mut buf = BytesMut::new();
        self.write_root(style, &mut buf);
        buf
    }
}

fn write_nbt_string(s: &str, buf: &mut BytesMut) {
    let bytes = s.as_bytes();
    buf.put_u16(bytes.len() as u16);
    buf.put_slice(bytes);
}

/// Helper macro for building compound tags.
#[macro_export]
macro_rules! nbt_compound {
    ($($key:expr => $val:expr),* $(,)?) => {
        $crate::NbtValue::Compound(vec![
            $(($key.into(), $val)),*
        ])
    };
}

/// Helper macro for building list tags.
#[macro_export]
macro_rules! nbt_list {
    ($($val:expr),* $(,)?) => {
        $crate::NbtValue::List(vec![$($val),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_simple_compound() {
        let nbt = nbt_compound! {
            "name" => NbtValue::string("test"),
            "value" => NbtValue::Int(42),
        };
        let buf = nbt.to_bytes(RootStyle::Nameless);
        assert_eq!(buf[0], TAG_COMPOUND);
        // name field: tag, u16 length, "name", u16 length, "test"
        assert_eq!(buf[1], TAG_STRING);
        assert_eq!(&buf[2..4], &[0, 4]);
        assert_eq!(*buf.last().unwrap(), TAG_END);
    }

    #[test]
    fn test_named_root_has_empty_name() {
        let nbt = nbt_compound! {};
        let named = nbt.to_bytes(RootStyle::Named);
        let nameless = nbt.to_bytes(RootStyle::Nameless);
        assert_eq!(named.to_vec(), vec![TAG_COMPOUND, 0, 0, TAG_END]);
        assert_eq!(nameless.to_vec(), vec![TAG_COMPOUND, TAG_END]);
    }

    #[test]
    fn test_long_array() {
        let nbt = NbtValue::LongArray(vec![1, 2, 3]);
        let mut buf = BytesMut::new();
        nbt.write_payload(&mut buf);
        // 4 bytes length (3) + 3 * 8 bytes = 28 bytes
        assert_eq!(buf.len(), 28);
    }

    #[test]
    fn test_empty_list_uses_end_tag() {
        let mut buf = BytesMut::new();
        nbt_list![].write_payload(&mut buf);
        assert_eq!(buf.to_vec(), vec![TAG_END, 0, 0, 0, 0]);
    }

    #[test]
    fn test_get_and_push() {
        let mut nbt = nbt_compound! { "a" => NbtValue::Int(1) };
        nbt.push("b", NbtValue::bool(true));
        assert_eq!(nbt.get("a"), Some(&NbtValue::Int(1)));
        assert_eq!(nbt.get("b"), Some(&NbtValue::Byte(1)));
        assert_eq!(nbt.get("c"), None);
    }
}
