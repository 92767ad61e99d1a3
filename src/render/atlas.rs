use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{MISSING_TEXTURE, TEXTURE_TILE_SIZE};

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read texture directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write texture sheet: {0}")]
    Image(#[from] image::ImageError),
}

/// Rectangle of one texture inside the sheet, in normalised coordinates.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct TextureRegion {
    pub min_u: f32,
    pub max_u: f32,
    pub min_v: f32,
    pub max_v: f32,
}

/// All block textures packed into a square grid of equally sized tiles.
///
/// A `missing` tile is always packed first, and every unknown name resolves to it.
pub struct TextureAtlas {
    image: RgbaImage,
    tile_size: u32,
    grid_side: u32,
    regions: FxHashMap<String, TextureRegion>,
}

impl TextureAtlas {
    /// Pack every decodable image in `dir`, named by file name.
    ///
    /// Files that fail to decode are skipped; the atlas just lacks them.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| AtlasError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut textures = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match image::open(&path) {
                Ok(img) => textures.push((name.to_string(), img.to_rgba8())),
                Err(e) => warn!("Skipping texture {}: {}", path.display(), e),
            }
        }

        Ok(Self::from_images(textures))
    }

    /// Load from `dir` if it exists, otherwise fall back to generated textures.
    pub fn load_or_procedural(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            info!("Texture directory {} not found, using generated textures", dir.display());
            return Self::procedural();
        }
        match Self::load_dir(dir) {
            Ok(atlas) => atlas,
            Err(e) => {
                warn!("{}, using generated textures", e);
                Self::procedural()
            }
        }
    }

    /// Pack named images. Tiles take the largest decoded dimension; smaller
    /// images are scaled up with nearest filtering.
    pub fn from_images(textures: Vec<(String, RgbaImage)>) -> Self {
        let tile_size = textures
            .iter()
            .map(|(_, img)| img.width().max(img.height()))
            .max()
            .unwrap_or(TEXTURE_TILE_SIZE)
            .max(1);

        let count = textures.len() as u32 + 1;
        let mut grid_side = 1;
        while grid_side * grid_side < count {
            grid_side *= 2;
        }

        let sheet_size = grid_side * tile_size;
        let mut atlas = TextureAtlas {
            image: RgbaImage::new(sheet_size, sheet_size),
            tile_size,
            grid_side,
            regions: FxHashMap::default(),
        };

        let missing = missing_tile(tile_size);
        atlas.place(0, MISSING_TEXTURE.to_string(), &missing);

        for (slot, (name, img)) in textures.into_iter().enumerate() {
            let tile = if img.width() == tile_size && img.height() == tile_size {
                img
            } else {
                imageops::resize(&img, tile_size, tile_size, FilterType::Nearest)
            };
            atlas.place(slot as u32 + 1, name, &tile);
        }

        info!(
            "Packed {} textures into a {}x{} sheet",
            atlas.regions.len(),
            sheet_size,
            sheet_size
        );
        atlas
    }

    fn place(&mut self, slot: u32, name: String, tile: &RgbaImage) {
        let (col, row) = (slot % self.grid_side, slot / self.grid_side);
        imageops::replace(
            &mut self.image,
            tile,
            (col * self.tile_size) as i64,
            (row * self.tile_size) as i64,
        );
        let side = self.grid_side as f32;
        let region = TextureRegion {
            min_u: col as f32 / side,
            max_u: (col + 1) as f32 / side,
            min_v: row as f32 / side,
            max_v: (row + 1) as f32 / side,
        };
        debug!("Texture {} at tile ({}, {})", name, col, row);
        self.regions.insert(name, region);
    }

    /// Generated stand-ins for the default block textures.
    pub fn procedural() -> Self {
        let tile = TEXTURE_TILE_SIZE;
        let textures = [
            ("dirt.png", 3u32),
            ("gold_block.png", 5),
            ("grass.png", 0),
            ("grass_side.png", 1),
            ("stone.png", 4),
        ]
        .into_iter()
        .map(|(name, kind)| {
            let img = RgbaImage::from_fn(tile, tile, |x, y| procedural_pixel(kind, x, y));
            (name.to_string(), img)
        })
        .collect();
        Self::from_images(textures)
    }

    pub fn region(&self, name: &str) -> TextureRegion {
        self.regions
            .get(name)
            .or_else(|| self.regions.get(MISSING_TEXTURE))
            .copied()
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn grid_side(&self) -> u32 {
        self.grid_side
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), AtlasError> {
        self.image.save(path.as_ref())?;
        info!("Wrote texture sheet to {}", path.as_ref().display());
        Ok(())
    }
}

fn hash(x: u32, y: u32, seed: u32) -> u8 {
    let n = x
        .wrapping_mul(374761393)
        .wrapping_add(y.wrapping_mul(668265263))
        .wrapping_add(seed);
    let n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    ((n ^ (n >> 16)) & 0xFF) as u8
}

fn missing_tile(size: u32) -> RgbaImage {
    let half = (size / 2).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / half + y / half) % 2 == 0 {
            Rgba([255, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

fn procedural_pixel(kind: u32, x: u32, y: u32) -> Rgba<u8> {
    let noise = hash(x, y, kind) as i32 - 128;
    let dirt = |noise: i32| {
        let base = 139 + noise / 8;
        Rgba([
            base.clamp(100, 170) as u8,
            (base - 40).clamp(60, 130) as u8,
            (base - 80).clamp(20, 70) as u8,
            255,
        ])
    };
    let grass = |noise: i32| {
        let g = (100 + noise / 8).clamp(60, 140) as u8;
        Rgba([50, g, 30, 255])
    };
    match kind {
        0 => grass(noise),
        // Dirt with a green strip along the top edge.
        1 if y < 3 => grass(noise),
        1 | 3 => dirt(noise),
        4 => {
            let v = (128 + noise / 6).clamp(90, 160) as u8;
            Rgba([v, v, v, 255])
        }
        _ => {
            let base = 220 + noise / 10;
            Rgba([
                base.clamp(200, 255) as u8,
                (base - 30).clamp(160, 220) as u8,
                (base - 180).clamp(20, 70) as u8,
                255,
            ])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(size: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([value, value, value, 255]))
    }

    #[test]
    fn grid_is_smallest_power_of_two_square() {
        let textures = (0..4).map(|i| (format!("t{i}.png"), solid(16, i as u8))).collect();
        let atlas = TextureAtlas::from_images(textures);
        // Four textures plus the missing tile need a 4x4 grid.
        assert_eq!(atlas.grid_side(), 4);
        assert_eq!(atlas.dimensions(), (64, 64));
        assert_eq!(atlas.len(), 5);
    }

    #[test]
    fn unknown_names_map_to_missing_tile() {
        let atlas = TextureAtlas::from_images(vec![("a.png".to_string(), solid(16, 10))]);
        assert_eq!(atlas.region("nope.png"), atlas.region(MISSING_TEXTURE));
        assert_ne!(atlas.region("a.png"), atlas.region(MISSING_TEXTURE));
    }

    #[test]
    fn smaller_images_are_scaled_to_the_largest_tile() {
        let atlas = TextureAtlas::from_images(vec![
            ("small.png".to_string(), solid(8, 10)),
            ("big.png".to_string(), solid(32, 20)),
        ]);
        assert_eq!(atlas.tile_size(), 32);
        let region = atlas.region("small.png");
        assert!((region.max_u - region.min_u - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn undecodable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        solid(16, 50).save(dir.path().join("stone.png")).unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();

        let atlas = TextureAtlas::load_dir(dir.path()).unwrap();
        assert!(atlas.contains("stone.png"));
        assert!(!atlas.contains("broken.png"));
    }

    #[test]
    fn procedural_covers_default_blocks() {
        let atlas = TextureAtlas::procedural();
        for name in ["grass.png", "grass_side.png", "dirt.png", "stone.png", "gold_block.png"] {
            assert!(atlas.contains(name), "{name} missing");
        }
    }
}
