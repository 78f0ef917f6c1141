use bytes::BytesMut;
use limbo_nbt::NbtValue;
use limbo_protocol_core::write_string;
use limbo_types::TextComponent;

/// How a version carries chat components on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// A JSON string (everything before 1.20.3, and Login disconnects).
    Json,
    /// A nameless network NBT compound (1.20.3+).
    Nbt,
}

pub fn write_text(buf: &mut BytesMut, text: &TextComponent, format: TextFormat) {
    match format {
        TextFormat::Json => write_string(buf, &text.to_json()),
        TextFormat::Nbt => text_to_nbt(text).write_root_network(buf),
    }
}

/// NBT form of a text component, with the same keys as the JSON form.
pub fn text_to_nbt(text: &TextComponent) -> NbtValue {
    let mut compound = NbtValue::Compound(vec![("text".into(), NbtValue::string(&text.text))]);
    if let Some(color) = &text.color {
        compound.push("color", NbtValue::string(color));
    }
    if let Some(bold) = text.bold {
        compound.push("bold", NbtValue::bool(bold));
    }
    if let Some(italic) = text.italic {
        compound.push("italic", NbtValue::bool(italic));
    }
    if let Some(underlined) = text.underlined {
        compound.push("underlined", NbtValue::bool(underlined));
    }
    if let Some(strikethrough) = text.strikethrough {
        compound.push("strikethrough", NbtValue::bool(strikethrough));
    }
    if let Some(obfuscated) = text.obfuscated {
        compound.push("obfuscated", NbtValue::bool(obfuscated));
    }
    if !text.extra.is_empty() {
        compound.push(
            "extra",
            NbtValue::List(text.extra.iter().map(text_to_nbt).collect()),
        );
    }
    compound
}
