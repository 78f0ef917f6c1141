use crate::snapshot::WorldSnapshot;
use limbo_protocol_core::{ChunkColumn, ChunkSection};
use limbo_types::{BlockPos, BlockState, ChunkPos};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const SECTION_VOLUME: usize = 16 * 16 * 16;

/// Read one chunk column out of `world` as palettes and height columns.
pub fn build_column(world: &dyn WorldSnapshot, pos: ChunkPos) -> ChunkColumn {
    let min_y = world.metadata().min_y();
    let section_count = (world.metadata().height() / 16) as usize;
    let mut heights = vec![0u16; 256];
    let mut sections = Vec::with_capacity(section_count);

    for section_index in 0..section_count {
        let base_y = min_y + section_index as i32 * 16;
        let mut blocks = [BlockState::Air; SECTION_VOLUME];
        for y in 0..16 {
            for z in 0..16 {
                for x in 0..16 {
                    let state = world.block_at(BlockPos::new(
                        pos.x * 16 + x as i32,
                        base_y + y as i32,
                        pos.z * 16 + z as i32,
                    ));
                    if !state.is_air() {
                        // Sections are visited bottom-up, so the last hit wins.
                        heights[z * 16 + x] = (section_index * 16 + y + 1) as u16;
                    }
                    blocks[y * 256 + z * 16 + x] = state;
                }
            }
        }
        sections.push(section_from_blocks(&blocks));
    }

    ChunkColumn {
        min_y,
        sections,
        heights,
    }
}

/// Palette a section, collapsing uniform sections to a single entry.
fn section_from_blocks(blocks: &[BlockState; SECTION_VOLUME]) -> ChunkSection {
    let mut palette = Vec::new();
    let mut palette_map = HashMap::new();
    let mut indices = vec![0u16; SECTION_VOLUME];
    let mut non_air_blocks: i16 = 0;

    for (i, &state) in blocks.iter().enumerate() {
        if !state.is_air() {
            non_air_blocks += 1;
        }
        let idx = *palette_map.entry(state).or_insert_with(|| {
            palette.push(state);
            palette.len() - 1
        });
        indices[i] = idx as u16;
    }

    if palette.len() == 1 {
        return ChunkSection::single(palette[0]);
    }
    ChunkSection {
        non_air_blocks,
        palette,
        indices: Some(indices),
    }
}

/// Chunk positions within `view_distance` of `center`, nearest first.
pub fn chunks_around(center: ChunkPos, view_distance: i32) -> Vec<ChunkPos> {
    let mut positions = Vec::new();
    for dx in -view_distance..=view_distance {
        for dz in -view_distance..=view_distance {
            positions.push(ChunkPos::new(center.x + dx, center.z + dz));
        }
    }
    positions.sort_by_key(|p| (p.distance_squared(&center), p.x, p.z));
    positions
}

/// The columns around spawn, built once at startup and shared by every
/// session.
#[derive(Debug, Clone)]
pub struct SpawnChunks {
    center: ChunkPos,
    columns: Vec<(ChunkPos, Arc<ChunkColumn>)>,
}

impl SpawnChunks {
    pub fn build(world: &dyn WorldSnapshot, view_distance: i32) -> Self {
        let center = world.metadata().spawn.chunk_pos();
        let columns: Vec<_> = chunks_around(center, view_distance)
            .into_iter()
            .map(|pos| (pos, Arc::new(build_column(world, pos))))
            .collect();
        debug!(
            "Built {} spawn chunks around ({}, {})",
            columns.len(),
            center.x,
            center.z
        );
        Self { center, columns }
    }

    pub fn center(&self) -> ChunkPos {
        self.center
    }

    /// Columns in send order.
    pub fn columns(&self) -> &[(ChunkPos, Arc<ChunkColumn>)] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FlatWorld, VoidWorld};
    use crate::snapshot::WorldMetadata;

    #[test]
    fn test_flat_column() {
        let world = FlatWorld::classic(WorldMetadata::default());
        let column = build_column(&world, ChunkPos::new(3, -2));
        assert_eq!(column.min_y, -64);
        assert_eq!(column.sections.len(), 24);

        let bottom = &column.sections[0];
        assert_eq!(bottom.non_air_blocks, 4 * 256);
        assert_eq!(
            bottom.palette,
            vec![BlockState::Stone, BlockState::Dirt, BlockState::GrassBlock, BlockState::Air]
        );
        let indices = bottom.indices.as_ref().unwrap();
        assert_eq!(indices[0], 0);
        assert_eq!(indices[3 * 256], 2);
        assert_eq!(indices[4 * 256], 3);

        assert_eq!(column.sections[1], ChunkSection::single(BlockState::Air));
        assert!(column.heights.iter().all(|&h| h == 4));
    }

    #[test]
    fn test_void_column_is_empty() {
        let world = VoidWorld::new(WorldMetadata::default());
        let column = build_column(&world, ChunkPos::new(0, 0));
        assert!(column.sections.iter().all(|s| s.non_air_blocks == 0 && s.indices.is_none()));
        assert!(column.heights.iter().all(|&h| h == 0));
    }

    #[test]
    fn test_chunks_around_nearest_first() {
        let center = ChunkPos::new(10, -4);
        let positions = chunks_around(center, 2);
        assert_eq!(positions.len(), 25);
        assert_eq!(positions[0], center);
        let distances: Vec<i64> = positions.iter().map(|p| p.distance_squared(&center)).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*distances.last().unwrap(), 8);
    }

    #[test]
    fn test_spawn_chunks_follow_spawn() {
        let mut metadata = WorldMetadata::default();
        metadata.spawn = limbo_types::Vec3d::new(40.0, 0.0, -1.0);
        let chunks = SpawnChunks::build(&VoidWorld::new(metadata), 1);
        assert_eq!(chunks.center(), ChunkPos::new(2, -1));
        assert_eq!(chunks.columns().len(), 9);
        assert_eq!(chunks.columns()[0].0, ChunkPos::new(2, -1));
    }
}
