use crate::blocks::block_state_id;
use bytes::{BufMut, BytesMut};
use limbo_nbt::{nbt_compound, NbtValue};
use limbo_protocol_core::{write_varint, ChunkColumn, ChunkLightData, ChunkSection, WirePacket};
use limbo_types::BlockState;

/// Sections per light mask long.
const LIGHT_SECTIONS_PER_LONG: usize = 64;

/// Encode a column as a Chunk Data and Update Light packet (1.20+ layout).
pub fn chunk_packet(chunk_x: i32, chunk_z: i32, column: &ChunkColumn) -> WirePacket {
    let height = column.sections.len() as i32 * 16;
    let mut data = BytesMut::new();
    for section in &column.sections {
        write_section(&mut data, section);
    }

    WirePacket::ChunkDataAndUpdateLight {
        chunk_x,
        chunk_z,
        heightmaps: nbt_compound! {
            "MOTION_BLOCKING" => NbtValue::LongArray(pack_heights(&column.heights, height))
        },
        data: data.to_vec(),
        light: full_sky_light(column.sections.len()),
    }
}

fn bits_for(palette_len: usize) -> u32 {
    std::cmp::max(4, usize::BITS - (palette_len - 1).leading_zeros())
}

/// Pack values into longs without letting an entry span two longs.
fn pack(values: impl ExactSizeIterator<Item = u64>, bits: u32) -> Vec<i64> {
    let entries_per_long = (64 / bits) as usize;
    let longs_needed = values.len().div_ceil(entries_per_long);
    let mask = (1u64 << bits) - 1;

    let mut data = vec![0i64; longs_needed];
    for (i, value) in values.enumerate() {
        let long_index = i / entries_per_long;
        let bit_index = (i % entries_per_long) * bits as usize;
        data[long_index] |= ((value & mask) << bit_index) as i64;
    }
    data
}

fn write_section(buf: &mut BytesMut, section: &ChunkSection) {
    buf.put_i16(section.non_air_blocks);

    match &section.indices {
        Some(indices) if section.palette.len() > 1 => {
            let bits = bits_for(section.palette.len());
            buf.put_u8(bits as u8);
            write_varint(buf, section.palette.len() as i32);
            for state in &section.palette {
                write_varint(buf, block_state_id(*state));
            }
            let longs = pack(indices.iter().map(|&i| i as u64), bits);
            write_varint(buf, longs.len() as i32);
            for long in longs {
                buf.put_i64(long);
            }
        }
        _ => {
            let state = section.palette.first().copied().unwrap_or(BlockState::Air);
            buf.put_u8(0);
            write_varint(buf, block_state_id(state));
            write_varint(buf, 0);
        }
    }

    // Biomes: single-valued, plains (registry index 0)
    buf.put_u8(0);
    write_varint(buf, 0);
    write_varint(buf, 0);
}

/// MOTION_BLOCKING heightmap. Entry width covers `0..=height`.
fn pack_heights(heights: &[u16], height: i32) -> Vec<i64> {
    let bits = u32::BITS - (height.max(1) as u32).leading_zeros();
    pack(heights.iter().map(|&h| h as u64), bits)
}

/// Sky light 15 everywhere, including the sections above and below the column.
fn full_sky_light(section_count: usize) -> ChunkLightData {
    let light_sections = section_count + 2;
    let longs = light_sections.div_ceil(LIGHT_SECTIONS_PER_LONG);
    let mut sky_light_mask = vec![0i64; longs];
    for i in 0..light_sections {
        sky_light_mask[i / LIGHT_SECTIONS_PER_LONG] |= 1i64 << (i % LIGHT_SECTIONS_PER_LONG);
    }

    ChunkLightData {
        sky_light_mask,
        block_light_mask: vec![0],
        empty_sky_light_mask: vec![0],
        empty_block_light_mask: vec![0],
        sky_light_arrays: vec![vec![0xFF; 2048]; light_sections],
        block_light_arrays: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layer_column() -> ChunkColumn {
        let mut indices = vec![0u16; 4096];
        indices[..256].fill(1);
        let mut sections = vec![ChunkSection {
            non_air_blocks: 256,
            palette: vec![BlockState::Air, BlockState::Stone],
            indices: Some(indices),
        }];
        sections.extend((1..24).map(|_| ChunkSection::single(BlockState::Air)));
        ChunkColumn {
            min_y: -64,
            sections,
            heights: vec![1; 256],
        }
    }

    #[test]
    fn test_bits_for_palette() {
        assert_eq!(bits_for(2), 4);
        assert_eq!(bits_for(16), 4);
        assert_eq!(bits_for(17), 5);
    }

    #[test]
    fn test_heightmap_uses_nine_bits_for_384() {
        let packed = pack_heights(&[4; 256], 384);
        // 7 entries of 9 bits per long
        assert_eq!(packed.len(), 37);
        assert_eq!(packed[0] & 0x1FF, 4);
    }

    #[test]
    fn test_chunk_packet_contents() {
        let packet = chunk_packet(3, -2, &two_layer_column());
        let WirePacket::ChunkDataAndUpdateLight {
            chunk_x,
            chunk_z,
            data,
            light,
            ..
        } = packet
        else {
            panic!("not a chunk packet");
        };
        assert_eq!((chunk_x, chunk_z), (3, -2));
        // First section: 256 non-air blocks, 4 bits per entry
        assert_eq!(i16::from_be_bytes([data[0], data[1]]), 256);
        assert_eq!(data[2], 4);
        assert_eq!(light.sky_light_mask, vec![0x03FF_FFFF]);
        assert_eq!(light.sky_light_arrays.len(), 26);
    }

    #[test]
    fn test_single_valued_section_bytes() {
        let mut buf = BytesMut::new();
        write_section(&mut buf, &ChunkSection::single(BlockState::GrassBlock));
        assert_eq!(buf.to_vec(), vec![0x10, 0x00, 0, 9, 0, 0, 0, 0]);
    }
}
