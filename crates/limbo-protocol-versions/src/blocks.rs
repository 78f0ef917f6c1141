use limbo_types::BlockState;

/// Global palette id of a block state.
///
/// Every state a limbo world is built from has kept the same id from the
/// 1.13 flattening through 1.21.1, and chunks are only streamed to 1.20+
/// clients, so one table serves every version that receives chunks.
pub fn block_state_id(state: BlockState) -> i32 {
    match state {
        BlockState::Air => 0,
        BlockState::Stone => 1,
        BlockState::Granite => 2,
        BlockState::PolishedGranite => 3,
        BlockState::Diorite => 4,
        BlockState::PolishedDiorite => 5,
        BlockState::Andesite => 6,
        BlockState::PolishedAndesite => 7,
        // grass_block[snowy=false]
        BlockState::GrassBlock => 9,
        BlockState::Dirt => 10,
        BlockState::CoarseDirt => 11,
        BlockState::Cobblestone => 14,
        BlockState::OakPlanks => 15,
    }
}
