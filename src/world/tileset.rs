//! Tile type definitions, the context object injected into map and generators

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tile::{Tile, TileTypeId};

/// Definition of one tile type, as loaded from data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileDef {
    pub name: String,
    /// Row of the tile atlas holding this type's 16 autotile variants.
    pub atlas_row: u16,
    #[serde(default)]
    pub collidable: bool,
}

#[derive(Debug, Error)]
pub enum TileSetError {
    #[error("duplicate tile name {0:?}")]
    DuplicateName(String),
    #[error("unknown tile name {0:?}")]
    UnknownName(String),
    #[error("invalid tile set: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Immutable registry of tile types, indexed by [`TileTypeId`].
///
/// Passed by reference into [`Map`](super::Map) and generator constructors
/// instead of living behind a global accessor. Index 0 is conventionally the
/// blank `void` type; [`TileSet::builtin`] follows that convention.
#[derive(Debug, Clone)]
pub struct TileSet {
    defs: Vec<TileDef>,
    by_name: HashMap<String, TileTypeId>,
}

impl TileSet {
    pub fn new(defs: Vec<TileDef>) -> Result<Self, TileSetError> {
        let mut by_name = HashMap::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            let id = TileTypeId(index as u16);
            if by_name.insert(def.name.clone(), id).is_some() {
                return Err(TileSetError::DuplicateName(def.name.clone()));
            }
        }
        Ok(Self { defs, by_name })
    }

    /// Default set used by the reference generator and tests.
    pub fn builtin() -> Self {
        let defs = vec![
            TileDef {
                name: "void".into(),
                atlas_row: 0,
                collidable: false,
            },
            TileDef {
                name: "sand".into(),
                atlas_row: 1,
                collidable: false,
            },
            TileDef {
                name: "grass".into(),
                atlas_row: 2,
                collidable: false,
            },
            TileDef {
                name: "rock".into(),
                atlas_row: 3,
                collidable: true,
            },
            TileDef {
                name: "water".into(),
                atlas_row: 4,
                collidable: false,
            },
        ];
        Self::new(defs).expect("builtin tile names are distinct")
    }

    /// Parse a RON list of tile definitions.
    pub fn from_ron_str(source: &str) -> Result<Self, TileSetError> {
        let defs: Vec<TileDef> = ron::from_str(source)?;
        Self::new(defs)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading tile set {}", path.display()))?;
        Self::from_ron_str(&source)
            .with_context(|| format!("parsing tile set {}", path.display()))
    }

    #[inline]
    pub fn def(&self, id: TileTypeId) -> &TileDef {
        &self.defs[id.0 as usize]
    }

    pub fn id_of(&self, name: &str) -> Option<TileTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<TileTypeId, TileSetError> {
        self.id_of(name)
            .ok_or_else(|| TileSetError::UnknownName(name.to_string()))
    }

    /// Build a tile of the given type with its collidability taken from the
    /// definition. The world-space collision box is filled in at placement.
    pub fn make_tile(&self, id: TileTypeId) -> Tile {
        Tile::of(id, self.def(id).collidable)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Default for TileSet {
    fn default() -> Self {
        Self::builtin()
    }
}
