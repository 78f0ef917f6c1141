use limbo_types::{BlockPos, BlockState, Dimension, GameMode, Vec3d};

/// Everything about a world that is not a block.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldMetadata {
    pub dimension: Dimension,
    pub spawn: Vec3d,
    pub spawn_yaw: f32,
    pub spawn_pitch: f32,
    pub game_mode: GameMode,
    pub hardcore: bool,
    /// Ticks into the day cycle; frozen for the lifetime of the server.
    pub time_of_day: i64,
    pub is_flat: bool,
}

impl WorldMetadata {
    pub fn min_y(&self) -> i32 {
        self.dimension.min_y()
    }

    pub fn height(&self) -> i32 {
        self.dimension.height()
    }
}

impl Default for WorldMetadata {
    fn default() -> Self {
        Self {
            dimension: Dimension::Overworld,
            spawn: Vec3d::new(0.5, 100.0, 0.5),
            spawn_yaw: 0.0,
            spawn_pitch: 0.0,
            game_mode: GameMode::Adventure,
            hardcore: false,
            time_of_day: 6000,
            is_flat: false,
        }
    }
}

/// Read-only world data shared by every connection.
///
/// Implementations must be immutable after construction; the server hands
/// one `Arc<dyn WorldSnapshot>` to all sessions.
pub trait WorldSnapshot: Send + Sync {
    /// Block at `pos`. Positions outside the world are air.
    fn block_at(&self, pos: BlockPos) -> BlockState;

    fn metadata(&self) -> &WorldMetadata;
}
