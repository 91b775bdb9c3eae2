//! Single grid cell: type identity, autotile variant, collision geometry

use bitflags::bitflags;

use crate::geom::Rect;

/// Interned tile type, an index into the [`TileSet`](super::TileSet).
///
/// Identity comparisons between ids drive autotile adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileTypeId(pub u16);

impl TileTypeId {
    /// The built-in blank type occupying index 0 of every tile set.
    pub const VOID: TileTypeId = TileTypeId(0);
}

bitflags! {
    /// 4-bit adjacency mask over the direct neighbors of a tile.
    ///
    /// A bit is set when the neighbor in that direction has the same
    /// [`TileTypeId`]. `UP` is the neighbor at `y - 1` (y grows downward).
    /// `bits()` in [0, 15] selects one of the 16 visual variants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AutotileMask: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl AutotileMask {
    /// Variant index in [0, 15] selecting the atlas column.
    #[inline]
    pub fn variant(self) -> u8 {
        self.bits()
    }
}

/// One cell of a chunk.
///
/// Tiles live as long as their chunk; placement overwrites them in place.
/// `collision_box` is present exactly when `collidable` is set, and holds
/// world-unit coordinates (tiles are 1x1 world units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub type_id: TileTypeId,
    pub autotile: AutotileMask,
    pub collidable: bool,
    pub collision_box: Option<Rect>,
}

impl Tile {
    /// Blank void tile, the state of every cell in a freshly built chunk.
    pub const EMPTY: Tile = Tile {
        type_id: TileTypeId::VOID,
        autotile: AutotileMask::empty(),
        collidable: false,
        collision_box: None,
    };

    /// Tile of the given type. The collision box is installed by the chunk
    /// when the tile is placed, once its world position is known.
    pub fn of(type_id: TileTypeId, collidable: bool) -> Self {
        Tile {
            type_id,
            autotile: AutotileMask::empty(),
            collidable,
            collision_box: None,
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.type_id == TileTypeId::VOID
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::EMPTY
    }
}
