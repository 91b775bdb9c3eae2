//! World management - tiles, chunks, generation, streaming

mod chunk;
mod generation;
mod grid;
mod map;
mod tile;
mod tileset;

pub use chunk::{Chunk, CHUNK_AREA, CHUNK_SIZE};
pub use generation::{ConstantGenerator, Generator, NoiseLayer, OverworldGenerator, TileGrid};
pub use grid::{ChunkGrid, CHUNK_NO, WORLD_TILES};
pub use map::Map;
pub use tile::{AutotileMask, Tile, TileTypeId};
pub use tileset::{TileDef, TileSet, TileSetError};
