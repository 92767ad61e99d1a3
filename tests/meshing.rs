use std::sync::Arc;

use blockview::core::{BlockRegistry, ChunkPos, Vertex};
use blockview::render::{ModelCache, TextureAtlas, build_chunk_mesh};
use blockview::world::{TerrainGenerator, World};
use glam::UVec3;

fn setup(dimensions: UVec3) -> (Arc<World>, ModelCache) {
    let registry = Arc::new(BlockRegistry::with_defaults());
    let world = Arc::new(World::new(dimensions, registry.clone()));
    let models = ModelCache::new(registry, Arc::new(TextureAtlas::procedural()));
    (world, models)
}

fn quads(world: &World, models: &ModelCache, chunk: ChunkPos) -> usize {
    let mut out: Vec<Vertex> = Vec::new();
    let count = build_chunk_mesh(chunk, world, models, &mut out);
    assert_eq!(out.len(), count * 4);
    count
}

#[test]
fn solid_slab_shows_only_its_shell() {
    let (world, models) = setup(UVec3::new(16, 16, 16));
    let stone = world.registry().by_name("stone").unwrap();
    for x in 0..4 {
        for y in 0..2 {
            for z in 0..4 {
                world.set_block(x, y, z, Some(stone.as_ref()));
            }
        }
    }
    // 4x2x4 box: top and bottom 16 each, four sides 8 each.
    assert_eq!(quads(&world, &models, ChunkPos::new(0, 0, 0)), 64);
}

#[test]
fn meshing_is_deterministic_on_generated_terrain() {
    let (world, models) = setup(UVec3::new(32, 64, 32));
    TerrainGenerator::new(7).generate(&world);

    for chunk in [ChunkPos::new(0, 0, 0), ChunkPos::new(1, 1, 1), ChunkPos::new(0, 3, 1)] {
        let mut first = Vec::new();
        let mut second = Vec::new();
        build_chunk_mesh(chunk, &world, &models, &mut first);
        build_chunk_mesh(chunk, &world, &models, &mut second);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&first), bytemuck::cast_slice::<Vertex, u8>(&second));
    }
}

#[test]
fn chunks_outside_the_world_are_empty() {
    let (world, models) = setup(UVec3::new(16, 16, 16));
    assert_eq!(quads(&world, &models, ChunkPos::new(-1, 0, 0)), 0);
    assert_eq!(quads(&world, &models, ChunkPos::new(0, 1, 0)), 0);
}
