//! CPU-side rendering support: sprite atlases and per-chunk composite targets

mod atlas;
mod surface;

pub use atlas::{AtlasError, SpriteRect, TileAtlas, VARIANT_COLUMNS};
pub use surface::ChunkSurface;
