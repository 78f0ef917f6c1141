//! Per-layout packet body codecs.
//!
//! Each function reads or writes exactly one wire layout. Which versions use
//! which layout is decided in `tables.rs`, never here.

/// Generates a JSON and an NBT flavour of an encoder that takes a
/// [`TextFormat`](crate::text::TextFormat).
macro_rules! text_encoders {
    ($json:ident, $nbt:ident => $inner:ident) => {
        pub fn $json(
            packet: &limbo_protocol_core::WirePacket,
            buf: &mut bytes::BytesMut,
        ) -> limbo_protocol_core::CodecResult<()> {
            $inner(packet, buf, $crate::text::TextFormat::Json)
        }

        pub fn $nbt(
            packet: &limbo_protocol_core::WirePacket,
            buf: &mut bytes::BytesMut,
        ) -> limbo_protocol_core::CodecResult<()> {
            $inner(packet, buf, $crate::text::TextFormat::Nbt)
        }
    };
}

pub mod common;
pub mod configuration;
pub mod handshake;
pub mod login;
pub mod play;
