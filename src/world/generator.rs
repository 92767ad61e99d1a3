//! Height-map terrain generation using FastNoiseLite
//!
//! Fills a freshly created `World` before any renderer listens to it, so every
//! store goes through the silent path.

use std::time::Instant;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use tracing::info;

use crate::world::grid::World;

/// Frequency and amplitude of each summed noise layer.
const LAYERS: [(f32, f32); 6] = [
    (0.004, 32.0),
    (0.008, 16.0),
    (0.016, 8.0),
    (0.032, 4.0),
    (0.064, 2.0),
    (0.0128, 1.0),
];

/// Depth of the dirt band under the grass surface.
const DIRT_DEPTH: i32 = 3;

pub struct TerrainGenerator {
    layers: Vec<(FastNoiseLite, f32)>,
    pub seed: u32,
}

impl TerrainGenerator {
    pub fn new(seed: u32) -> Self {
        let layers = LAYERS
            .iter()
            .enumerate()
            .map(|(i, &(frequency, amplitude))| {
                (Self::create_noise(seed.wrapping_add(i as u32), frequency), amplitude)
            })
            .collect();
        TerrainGenerator { layers, seed }
    }

    fn create_noise(seed: u32, frequency: f32) -> FastNoiseLite {
        let mut noise = FastNoiseLite::with_seed(seed as i32);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        noise
    }

    /// Surface height of a column, centred on half the world height.
    pub fn column_height(&self, x: i32, z: i32, world_height: u32) -> i32 {
        let mut height = (world_height / 2) as f32;
        for (noise, amplitude) in &self.layers {
            height += noise.get_noise_2d(x as f32, z as f32) * amplitude;
        }
        height as i32
    }

    /// Fill every column of `world`: stone, then a dirt band, grass on top, air above.
    pub fn generate(&self, world: &World) {
        let start = Instant::now();
        let dims = world.dimensions();
        let registry = world.registry().clone();
        let stone = registry.by_name("stone");
        let dirt = registry.by_name("dirt");
        let grass = registry.by_name("grass");

        for z in 0..dims.z as i32 {
            for x in 0..dims.x as i32 {
                let height = self.column_height(x, z, dims.y);
                let mut fill = stone.as_deref();
                for y in 0..dims.y as i32 {
                    if y == height - DIRT_DEPTH {
                        fill = dirt.as_deref();
                    } else if y == height {
                        fill = grass.as_deref();
                    } else if y > height {
                        break;
                    }
                    if fill.is_some() {
                        world.set_block_silent(x, y, z, fill);
                    }
                }
            }
        }

        info!(
            "Generated {}x{}x{} world (seed {}) in {:.2?}",
            dims.x,
            dims.y,
            dims.z,
            self.seed,
            start.elapsed()
        );
    }
}
