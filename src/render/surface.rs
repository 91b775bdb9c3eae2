//! CPU-side composited render target for one chunk

use super::atlas::{SpriteRect, TileAtlas};

/// Background color of a cleared surface (opaque black).
const CLEAR: [u8; 4] = [0, 0, 0, 255];

/// RGBA pixel buffer a chunk composites its tiles into.
///
/// The buffer is allocated lazily on the first recomposite, so chunks that
/// are generated but never drawn stay cheap. `recomposites` counts full
/// repaints and backs the cache-minimality tests.
#[derive(Debug, Clone, Default)]
pub struct ChunkSurface {
    side_px: u32,
    data: Vec<u8>,
    recomposites: u64,
}

impl ChunkSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repaint: size the buffer for `side_px` pixels per side and
    /// fill it with the clear color.
    pub(crate) fn begin(&mut self, side_px: u32) {
        let len = (side_px * side_px * 4) as usize;
        if self.side_px != side_px {
            self.side_px = side_px;
            self.data.resize(len, 0);
        }
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&CLEAR);
        }
    }

    /// Copy a sprite from the atlas to (dst_x, dst_y). Sprites are opaque;
    /// rows are copied wholesale without blending.
    pub(crate) fn blit(&mut self, atlas: &TileAtlas, src: SpriteRect, dst_x: u32, dst_y: u32) {
        debug_assert!(dst_x + src.w <= self.side_px && dst_y + src.h <= self.side_px);
        for sy in 0..src.h {
            let row = atlas.row_slice(src.x, src.y + sy, src.w);
            let start = (((dst_y + sy) * self.side_px + dst_x) * 4) as usize;
            self.data[start..start + row.len()].copy_from_slice(row);
        }
    }

    pub(crate) fn finish(&mut self) {
        self.recomposites += 1;
    }

    /// Whether the buffer matches the given side length (false before the
    /// first repaint or after an atlas resolution change).
    pub(crate) fn matches(&self, side_px: u32) -> bool {
        self.side_px == side_px && !self.data.is_empty()
    }

    /// Current pixel contents. Empty until the first recomposite.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixels per side of the composited image.
    pub fn side_px(&self) -> u32 {
        self.side_px
    }

    /// Number of full repaints performed so far.
    pub fn recomposites(&self) -> u64 {
        self.recomposites
    }

    /// RGBA value at (x, y), for tests and debug readback.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.side_px + x) * 4) as usize;
        self.data[idx..idx + 4].try_into().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::AutotileMask;

    #[test]
    fn test_blit_places_sprite_pixels() {
        let atlas = TileAtlas::debug_colors(1, 4);
        let mut surface = ChunkSurface::new();
        surface.begin(8);

        let src = atlas.variant_rect(0, AutotileMask::all());
        surface.blit(&atlas, src, 4, 4);
        surface.finish();

        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 255]);
        let expected: [u8; 4] = atlas.row_slice(src.x, src.y, 1).try_into().unwrap();
        assert_eq!(surface.pixel(4, 4), expected);
        assert_eq!(surface.recomposites(), 1);
    }

    #[test]
    fn test_begin_clears_previous_contents() {
        let atlas = TileAtlas::debug_colors(1, 4);
        let mut surface = ChunkSurface::new();
        surface.begin(8);
        surface.blit(&atlas, atlas.variant_rect(0, AutotileMask::all()), 0, 0);

        surface.begin(8);
        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 255]);
    }
}
