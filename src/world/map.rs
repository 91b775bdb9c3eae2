//! Map - chunk grid orchestration, tile mutation, and world streaming

use bevy_ecs::prelude::{Entity, With, World};
use glam::{UVec2, Vec2};
use smallvec::SmallVec;

use super::chunk::{Chunk, CHUNK_SIZE};
use super::generation::Generator;
use super::grid::{ChunkGrid, CHUNK_NO, WORLD_TILES};
use super::tile::{AutotileMask, Tile, TileTypeId};
use super::tileset::TileSet;
use crate::entity::{Animation, Position, WorldAnchor};

/// Offsets to the 4 direct neighbors, paired with the adjacency bit the
/// neighbor contributes when it has the same type.
const NEIGHBORS: [(AutotileMask, i64, i64); 4] = [
    (AutotileMask::UP, 0, -1),
    (AutotileMask::DOWN, 0, 1),
    (AutotileMask::LEFT, -1, 0),
    (AutotileMask::RIGHT, 1, 0),
];

/// Owner of the chunk grid and the entity registry.
///
/// All chunk generation, tile mutation, and autotile propagation runs
/// through here; the grid and registry are public so physics and external
/// render loops can borrow them side by side.
pub struct Map {
    pub grid: ChunkGrid,
    pub registry: World,
    generator: Option<Box<dyn Generator>>,
    tileset: TileSet,
}

impl Map {
    /// Map without a generator: chunks come up blank.
    pub fn new(tileset: TileSet) -> Self {
        Self {
            grid: ChunkGrid::new(),
            registry: World::new(),
            generator: None,
            tileset,
        }
    }

    pub fn with_generator(tileset: TileSet, generator: impl Generator + 'static) -> Self {
        let mut map = Self::new(tileset);
        map.generator = Some(Box::new(generator));
        map
    }

    pub fn set_generator(&mut self, generator: impl Generator + 'static) {
        self.generator = Some(Box::new(generator));
    }

    pub fn generator(&self) -> Option<&dyn Generator> {
        self.generator.as_deref()
    }

    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    /// Chunk coordinate containing a float world position.
    pub fn chunk_pos(pos: Vec2) -> UVec2 {
        ChunkGrid::chunk_pos_of(pos.x, pos.y)
    }

    /// World position of a tile corner: `chunk * CHUNK_SIZE + local`.
    pub fn world_pos(chunk: UVec2, local: UVec2) -> Vec2 {
        (chunk * CHUNK_SIZE as u32 + local).as_vec2()
    }

    pub fn get_chunk(&self, pos: UVec2) -> Option<&Chunk> {
        self.grid.chunk(pos)
    }

    pub fn get_chunk_mut(&mut self, pos: UVec2) -> Option<&mut Chunk> {
        self.grid.chunk_mut(pos)
    }

    /// Tile at world coordinates, resolved across chunk boundaries.
    /// `None` while the owning chunk is ungenerated.
    pub fn get_tile(&self, world_x: u32, world_y: u32) -> Option<&Tile> {
        self.grid.tile(world_x, world_y)
    }

    /// Generate the chunk at `pos`. A no-op if it already exists.
    ///
    /// With a generator attached the chunk is synthesized, every tile's
    /// autotile code is computed, and the touching edge row/column of each
    /// already generated cardinal neighbor is recomputed so the seam blends.
    pub fn generate_chunk(&mut self, pos: UVec2) {
        debug_assert!(pos.x < CHUNK_NO && pos.y < CHUNK_NO);
        if self.grid.contains(pos) {
            log::trace!("chunk ({}, {}) already generated, skipping", pos.x, pos.y);
            return;
        }

        let mut chunk = Chunk::new(pos);
        let generated = if let Some(generator) = &self.generator {
            let types = generator.synthesize(pos);
            for local_y in 0..CHUNK_SIZE {
                for local_x in 0..CHUNK_SIZE {
                    let tile = self.tileset.make_tile(types.get(local_x, local_y));
                    chunk.set_tile(local_x, local_y, tile);
                }
            }
            true
        } else {
            false
        };
        self.grid.insert(chunk);
        log::debug!("generated chunk ({}, {})", pos.x, pos.y);

        if !generated {
            return;
        }

        let base_x = (pos.x * CHUNK_SIZE as u32) as i64;
        let base_y = (pos.y * CHUNK_SIZE as u32) as i64;
        let size = CHUNK_SIZE as i64;

        // Codes for the new chunk itself
        for local_y in 0..size {
            for local_x in 0..size {
                self.recompute_autotile((base_x + local_x) as u32, (base_y + local_y) as u32);
            }
        }

        // Edge tiles of existing neighbors now border real terrain
        for local in 0..size {
            self.recompute_autotile_checked(base_x + local, base_y - 1); // top row above
            self.recompute_autotile_checked(base_x + local, base_y + size); // bottom
            self.recompute_autotile_checked(base_x - 1, base_y + local); // left column
            self.recompute_autotile_checked(base_x + size, base_y + local); // right
        }
    }

    /// Copy `tile` into the world slot, then refresh autotile codes.
    ///
    /// The owning chunk is marked dirty and gets the tile's world-space
    /// collision box installed when it is collidable. Placement into an
    /// ungenerated chunk is dropped.
    pub fn place_tile(&mut self, tile: Tile, world_x: u32, world_y: u32) {
        let (pos, local_x, local_y) = ChunkGrid::world_to_chunk(world_x, world_y);
        match self.grid.chunk_mut(pos) {
            Some(chunk) => {
                chunk.set_tile(local_x, local_y, tile);
                self.update_tile(world_x, world_y);
            }
            None => {
                log::warn!(
                    "dropped tile placement at ({world_x}, {world_y}): chunk ({}, {}) not generated",
                    pos.x,
                    pos.y
                );
            }
        }
    }

    /// Recompute the autotile code at a world coordinate and propagate one
    /// hop to its 4 direct neighbors. Neighbors of neighbors are left
    /// alone, so diagonal adjacency can go stale after edits; that bounds
    /// the cost of an edit at five recomputes.
    pub fn update_tile(&mut self, world_x: u32, world_y: u32) {
        if !self.recompute_autotile(world_x, world_y) {
            return;
        }
        for (_, dx, dy) in NEIGHBORS {
            self.recompute_autotile_checked(world_x as i64 + dx, world_y as i64 + dy);
        }
    }

    /// Per-frame streaming and entity upkeep.
    ///
    /// Keeps the 3x3 chunk neighborhood around every [`WorldAnchor`] entity
    /// generated (one ring of margin, clamped at the world border), then
    /// advances all [`Animation`] components by `dt`.
    pub fn simulate_world(&mut self, dt: f32) {
        let mut anchors = self
            .registry
            .query_filtered::<&Position, With<WorldAnchor>>();
        let anchors: SmallVec<[Vec2; 4]> =
            anchors.iter(&self.registry).map(|pos| pos.0).collect();

        for anchor in anchors {
            let center = Self::chunk_pos(anchor);
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let x = center.x as i64 + dx;
                    let y = center.y as i64 + dy;
                    if x < 0 || y < 0 || x >= CHUNK_NO as i64 || y >= CHUNK_NO as i64 {
                        continue;
                    }
                    let pos = UVec2::new(x as u32, y as u32);
                    if !self.grid.contains(pos) {
                        self.generate_chunk(pos);
                    }
                }
            }
        }

        let mut animations = self.registry.query::<&mut Animation>();
        for mut animation in animations.iter_mut(&mut self.registry) {
            animation.advance(dt);
        }
    }

    /// Spawn an entity whose position drives chunk streaming.
    pub fn spawn_anchor(&mut self, pos: Vec2) -> Entity {
        self.registry.spawn((Position(pos), WorldAnchor)).id()
    }

    /// Recompute one tile's code if its coordinate is inside the world.
    fn recompute_autotile_checked(&mut self, world_x: i64, world_y: i64) {
        if world_x < 0
            || world_y < 0
            || world_x >= WORLD_TILES as i64
            || world_y >= WORLD_TILES as i64
        {
            return;
        }
        self.recompute_autotile(world_x as u32, world_y as u32);
    }

    /// Recompute the 4-bit code of the tile at a world coordinate from its
    /// current neighbors and mark the owning chunk dirty. Returns false if
    /// the chunk is not generated.
    fn recompute_autotile(&mut self, world_x: u32, world_y: u32) -> bool {
        let Some(type_id) = self.grid.tile(world_x, world_y).map(|t| t.type_id) else {
            return false;
        };
        let mask = self.neighbor_mask(world_x, world_y, type_id);
        let (pos, local_x, local_y) = ChunkGrid::world_to_chunk(world_x, world_y);
        if let Some(chunk) = self.grid.chunk_mut(pos) {
            chunk.set_autotile(local_x, local_y, mask);
        }
        true
    }

    /// Adjacency pattern of same-type direct neighbors. Tiles outside the
    /// world or in ungenerated chunks count as different.
    fn neighbor_mask(&self, world_x: u32, world_y: u32, type_id: TileTypeId) -> AutotileMask {
        let mut mask = AutotileMask::empty();
        for (bit, dx, dy) in NEIGHBORS {
            let x = world_x as i64 + dx;
            let y = world_y as i64 + dy;
            if x < 0 || y < 0 || x >= WORLD_TILES as i64 || y >= WORLD_TILES as i64 {
                continue;
            }
            let same = self
                .grid
                .tile(x as u32, y as u32)
                .is_some_and(|tile| tile.type_id == type_id);
            if same {
                mask |= bit;
            }
        }
        mask
    }
}
