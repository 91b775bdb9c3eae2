//! Sparse chunk arena keyed by chunk coordinates

use std::collections::HashMap;

use glam::UVec2;

use super::chunk::{Chunk, CHUNK_SIZE};
use super::tile::Tile;

/// Chunks per axis of the world grid.
pub const CHUNK_NO: u32 = 1024;

/// Tiles per axis of the whole world.
pub const WORLD_TILES: u32 = CHUNK_NO * CHUNK_SIZE as u32;

/// Coordinate-keyed store of generated chunks.
///
/// Most of the 1024x1024 grid stays ungenerated, so chunks live in a sparse
/// map rather than a dense array. Chunk coordinates must lie in
/// `[0, CHUNK_NO)` per axis; that bound is a caller precondition checked
/// only with debug assertions. Chunks are never removed before the grid
/// itself drops, so shared references handed out per frame stay valid for
/// the life of the world.
#[derive(Default)]
pub struct ChunkGrid {
    chunks: HashMap<UVec2, Chunk>,
}

impl ChunkGrid {
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
        }
    }

    /// Split a world tile coordinate into chunk coordinates plus the local
    /// offset inside that chunk.
    #[inline]
    pub fn world_to_chunk(world_x: u32, world_y: u32) -> (UVec2, usize, usize) {
        debug_assert!(world_x < WORLD_TILES && world_y < WORLD_TILES);
        let chunk = UVec2::new(
            world_x / CHUNK_SIZE as u32,
            world_y / CHUNK_SIZE as u32,
        );
        let local_x = (world_x % CHUNK_SIZE as u32) as usize;
        let local_y = (world_y % CHUNK_SIZE as u32) as usize;
        (chunk, local_x, local_y)
    }

    /// Chunk coordinate containing a float world position.
    #[inline]
    pub fn chunk_pos_of(x: f32, y: f32) -> UVec2 {
        UVec2::new(
            (x / CHUNK_SIZE as f32) as u32,
            (y / CHUNK_SIZE as f32) as u32,
        )
    }

    pub fn contains(&self, pos: UVec2) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Chunk at chunk coordinates; `None` when not yet generated.
    pub fn chunk(&self, pos: UVec2) -> Option<&Chunk> {
        debug_assert!(pos.x < CHUNK_NO && pos.y < CHUNK_NO);
        self.chunks.get(&pos)
    }

    pub fn chunk_mut(&mut self, pos: UVec2) -> Option<&mut Chunk> {
        debug_assert!(pos.x < CHUNK_NO && pos.y < CHUNK_NO);
        self.chunks.get_mut(&pos)
    }

    /// Insert a freshly generated chunk. Refuses to replace an existing one
    /// (double generation would orphan tiles other systems may reference)
    /// and returns whether the chunk was stored.
    pub fn insert(&mut self, chunk: Chunk) -> bool {
        let pos = chunk.position();
        debug_assert!(pos.x < CHUNK_NO && pos.y < CHUNK_NO);
        match self.chunks.entry(pos) {
            std::collections::hash_map::Entry::Occupied(_) => {
                log::warn!("chunk ({}, {}) already generated, keeping it", pos.x, pos.y);
                false
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(chunk);
                true
            }
        }
    }

    /// Tile at world coordinates; `None` when its chunk is ungenerated.
    pub fn tile(&self, world_x: u32, world_y: u32) -> Option<&Tile> {
        let (pos, local_x, local_y) = Self::world_to_chunk(world_x, world_y);
        self.chunks.get(&pos).map(|c| c.tile(local_x, local_y))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UVec2, &Chunk)> {
        self.chunks.iter()
    }
}
