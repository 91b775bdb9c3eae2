//! Chunk - 32x32 tile region with a composited render cache

use glam::UVec2;

use super::tile::{AutotileMask, Tile};
use super::tileset::TileSet;
use crate::geom::Rect;
use crate::render::{ChunkSurface, TileAtlas};

pub const CHUNK_SIZE: usize = 32;
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

/// A 32x32 block of tiles, the unit of generation, caching, and streaming.
///
/// The cache contract is two-phase: tile mutations call [`Chunk::mark_dirty`]
/// (directly or through [`Chunk::set_tile`] / [`Chunk::set_autotile`]), and
/// [`Chunk::ensure_composited`] repaints on the render side only when dirty.
pub struct Chunk {
    /// Chunk coordinates (in chunk space, not world space).
    position: UVec2,

    /// Tile data, row-major order. Index = y * CHUNK_SIZE + x.
    tiles: Box<[Tile; CHUNK_AREA]>,

    /// Whether the composited surface is stale.
    dirty: bool,

    surface: ChunkSurface,
}

impl Chunk {
    /// New blank chunk. Starts dirty so the first draw composites it.
    pub fn new(position: UVec2) -> Self {
        Self {
            position,
            tiles: Box::new([Tile::EMPTY; CHUNK_AREA]),
            dirty: true,
            surface: ChunkSurface::new(),
        }
    }

    pub fn position(&self) -> UVec2 {
        self.position
    }

    /// Tile at local coordinates (0-31, 0-31).
    #[inline]
    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        debug_assert!(x < CHUNK_SIZE && y < CHUNK_SIZE);
        &self.tiles[y * CHUNK_SIZE + x]
    }

    /// Overwrite the tile at local coordinates and mark the chunk dirty.
    ///
    /// Collidable tiles get their collision box set here from the chunk's
    /// world position, so a box is valid exactly when `collidable` holds.
    pub fn set_tile(&mut self, x: usize, y: usize, mut tile: Tile) {
        debug_assert!(x < CHUNK_SIZE && y < CHUNK_SIZE);
        tile.collision_box = tile.collidable.then(|| {
            let world_x = self.position.x * CHUNK_SIZE as u32 + x as u32;
            let world_y = self.position.y * CHUNK_SIZE as u32 + y as u32;
            Rect::new(world_x as f32, world_y as f32, 1.0, 1.0)
        });
        self.tiles[y * CHUNK_SIZE + x] = tile;
        self.mark_dirty();
    }

    /// Store a recomputed adjacency mask and mark the chunk dirty.
    pub fn set_autotile(&mut self, x: usize, y: usize, mask: AutotileMask) {
        debug_assert!(x < CHUNK_SIZE && y < CHUNK_SIZE);
        self.tiles[y * CHUNK_SIZE + x].autotile = mask;
        self.mark_dirty();
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Render-side half of the cache contract: repaint the composited image
    /// if any tile changed since the last call, then return the pixels.
    ///
    /// Repaints clear the surface and draw all tiles in row-major order;
    /// there is no partial repaint at this granularity. Void tiles and rows
    /// missing from the atlas leave the cleared background.
    pub fn ensure_composited(&mut self, atlas: &TileAtlas, tileset: &TileSet) -> &[u8] {
        let side_px = CHUNK_SIZE as u32 * atlas.tile_px();
        if self.dirty || !self.surface.matches(side_px) {
            log::trace!(
                "recompositing chunk ({}, {})",
                self.position.x,
                self.position.y
            );
            self.surface.begin(side_px);
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let tile = &self.tiles[y * CHUNK_SIZE + x];
                    if tile.is_void() {
                        continue;
                    }
                    let row = tileset.def(tile.type_id).atlas_row;
                    if !atlas.has_row(row) {
                        continue;
                    }
                    let src = atlas.variant_rect(row, tile.autotile);
                    let px = atlas.tile_px();
                    self.surface
                        .blit(atlas, src, x as u32 * px, y as u32 * px);
                }
            }
            self.surface.finish();
            self.dirty = false;
        }
        self.surface.data()
    }

    /// Number of full recomposites performed, for cache-minimality checks.
    pub fn recomposite_count(&self) -> u64 {
        self.surface.recomposites()
    }

    pub fn surface(&self) -> &ChunkSurface {
        &self.surface
    }
}
