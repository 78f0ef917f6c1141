//! Static worlds served to players held in limbo.

pub mod chunk;
pub mod generator;
pub mod snapshot;

pub use chunk::{build_column, chunks_around, SpawnChunks};
pub use generator::{FlatWorld, VoidWorld};
pub use snapshot::{WorldMetadata, WorldSnapshot};
