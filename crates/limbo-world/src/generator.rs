use crate::snapshot::{WorldMetadata, WorldSnapshot};
use limbo_types::{BlockPos, BlockState};

/// A superflat world: the same stack of layers under every column.
///
/// Layers are listed bottom-up starting at the dimension's minimum Y.
pub struct FlatWorld {
    metadata: WorldMetadata,
    layers: Vec<BlockState>,
}

impl FlatWorld {
    /// Classic flat: stone, two dirt, grass.
    pub const CLASSIC: [BlockState; 4] = [
        BlockState::Stone,
        BlockState::Dirt,
        BlockState::Dirt,
        BlockState::GrassBlock,
    ];

    pub fn new(mut metadata: WorldMetadata, layers: Vec<BlockState>) -> Self {
        metadata.is_flat = true;
        Self { metadata, layers }
    }

    pub fn classic(metadata: WorldMetadata) -> Self {
        Self::new(metadata, Self::CLASSIC.to_vec())
    }

    /// Y of the first air block above the layers.
    pub fn surface_y(&self) -> i32 {
        self.metadata.min_y() + self.layers.len() as i32
    }
}

impl WorldSnapshot for FlatWorld {
    fn block_at(&self, pos: BlockPos) -> BlockState {
        let offset = pos.y - self.metadata.min_y();
        if offset < 0 {
            return BlockState::Air;
        }
        self.layers
            .get(offset as usize)
            .copied()
            .unwrap_or(BlockState::Air)
    }

    fn metadata(&self) -> &WorldMetadata {
        &self.metadata
    }
}

/// Nothing but air. Players float at spawn.
pub struct VoidWorld {
    metadata: WorldMetadata,
}

impl VoidWorld {
    pub fn new(metadata: WorldMetadata) -> Self {
        Self { metadata }
    }
}

impl WorldSnapshot for VoidWorld {
    fn block_at(&self, _pos: BlockPos) -> BlockState {
        BlockState::Air
    }

    fn metadata(&self) -> &WorldMetadata {
        &self.metadata
    }
}
