//! Tile sprite atlas: one row per tile type, 16 autotile variant columns

use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use crate::world::AutotileMask;

/// Number of autotile variants, one atlas column per 4-bit adjacency code.
pub const VARIANT_COLUMNS: u32 = 16;

/// Pixel-space rectangle inside an atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to decode atlas image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("atlas is {width}x{height} but tiles are {tile_px}px; expected {} columns and whole rows", VARIANT_COLUMNS)]
    Misaligned {
        width: u32,
        height: u32,
        tile_px: u32,
    },
}

/// RGBA sprite sheet holding the autotile variants of every tile type.
///
/// Layout: `atlas_row` from the tile definition selects the row, the tile's
/// [`AutotileMask`] variant selects the column.
#[derive(Debug, Clone)]
pub struct TileAtlas {
    width: u32,
    height: u32,
    tile_px: u32,
    data: Vec<u8>,
}

impl TileAtlas {
    /// Decode an atlas from encoded PNG bytes.
    pub fn from_png_bytes(bytes: &[u8], tile_px: u32) -> Result<Self, AtlasError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = (img.width(), img.height());
        if width != VARIANT_COLUMNS * tile_px || height % tile_px != 0 || height == 0 {
            return Err(AtlasError::Misaligned {
                width,
                height,
                tile_px,
            });
        }
        Ok(Self {
            width,
            height,
            tile_px,
            data: img.into_raw(),
        })
    }

    pub fn load(path: impl AsRef<Path>, tile_px: u32) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("reading atlas {}", path.display()))?;
        let atlas = Self::from_png_bytes(&bytes, tile_px)
            .with_context(|| format!("decoding atlas {}", path.display()))?;
        log::debug!(
            "loaded tile atlas {} ({} rows)",
            path.display(),
            atlas.rows()
        );
        Ok(atlas)
    }

    /// Procedural atlas for tests and headless runs: every (row, variant)
    /// cell is filled with a distinct solid color.
    pub fn debug_colors(rows: u32, tile_px: u32) -> Self {
        let width = VARIANT_COLUMNS * tile_px;
        let height = rows * tile_px;
        let mut data = vec![0u8; (width * height * 4) as usize];
        for y in 0..height {
            for x in 0..width {
                let (row, col) = (y / tile_px, x / tile_px);
                let idx = ((y * width + x) * 4) as usize;
                data[idx] = (row * 40 % 256) as u8;
                data[idx + 1] = (col * 16 % 256) as u8;
                data[idx + 2] = ((row + col) * 23 % 256) as u8;
                data[idx + 3] = 255;
            }
        }
        Self {
            width,
            height,
            tile_px,
            data,
        }
    }

    #[inline]
    pub fn tile_px(&self) -> u32 {
        self.tile_px
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tile type rows in the sheet.
    pub fn rows(&self) -> u32 {
        self.height / self.tile_px
    }

    /// Whether `row` exists in this sheet.
    pub fn has_row(&self, row: u16) -> bool {
        u32::from(row) < self.rows()
    }

    /// Pixel rect of the sprite for a tile type row and adjacency mask.
    #[inline]
    pub fn variant_rect(&self, row: u16, mask: AutotileMask) -> SpriteRect {
        debug_assert!(self.has_row(row));
        SpriteRect {
            x: u32::from(mask.variant()) * self.tile_px,
            y: u32::from(row) * self.tile_px,
            w: self.tile_px,
            h: self.tile_px,
        }
    }

    /// One horizontal run of pixels starting at (x, y), `w` pixels long.
    #[inline]
    pub(crate) fn row_slice(&self, x: u32, y: u32, w: u32) -> &[u8] {
        debug_assert!(x + w <= self.width && y < self.height);
        let start = ((y * self.width + x) * 4) as usize;
        &self.data[start..start + (w * 4) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_rect_layout() {
        let atlas = TileAtlas::debug_colors(4, 8);
        assert_eq!(atlas.rows(), 4);

        let rect = atlas.variant_rect(2, AutotileMask::all());
        assert_eq!(rect, SpriteRect {
            x: 15 * 8,
            y: 2 * 8,
            w: 8,
            h: 8
        });

        let rect = atlas.variant_rect(0, AutotileMask::empty());
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_debug_colors_distinct_between_variants() {
        let atlas = TileAtlas::debug_colors(2, 4);
        let a = atlas.row_slice(0, 0, 4).to_vec();
        let b = atlas.row_slice(4, 0, 4).to_vec();
        assert_ne!(a, b);
    }

    #[test]
    fn test_misaligned_dimensions_rejected() {
        // 1x1 png: valid image, wrong shape for an 8px tile grid
        let img = image::RgbaImage::new(1, 1);
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        assert!(matches!(
            TileAtlas::from_png_bytes(&bytes, 8),
            Err(AtlasError::Misaligned { .. })
        ));
    }

    #[test]
    fn test_png_round_trip() {
        let img = image::RgbaImage::from_pixel(16 * 8, 3 * 8, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let atlas = TileAtlas::from_png_bytes(&bytes, 8).unwrap();
        assert_eq!(atlas.rows(), 3);
        assert_eq!(atlas.row_slice(0, 0, 1), &[10, 20, 30, 255]);
    }
}
