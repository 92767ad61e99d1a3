use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use blockview::core::{BlockRegistry, ChunkPos, Vertex};
use blockview::render::{DrawStats, GpuBackend, MeshCache, MeshLoader, ModelCache, TextureAtlas};
use blockview::world::World;
use glam::{UVec3, Vec3};

/// Stands in for the GPU: a mesh is just its vertex count.
#[derive(Default)]
struct RecordingBackend {
    uploads: Vec<usize>,
    draws: Vec<u32>,
}

impl GpuBackend for RecordingBackend {
    type Mesh = usize;

    fn upload(&mut self, vertices: &[Vertex]) -> usize {
        self.uploads.push(vertices.len());
        vertices.len()
    }

    fn draw(&mut self, mesh: &usize, vertex_count: u32) {
        assert_eq!(*mesh as u32, vertex_count);
        self.draws.push(vertex_count);
    }
}

fn cache(world: &Arc<World>, workers: usize, capacity: usize, view: i32) -> MeshCache<usize> {
    let models = Arc::new(ModelCache::new(
        world.registry().clone(),
        Arc::new(TextureAtlas::procedural()),
    ));
    let loader = MeshLoader::new(world.clone(), models, workers, capacity).unwrap();
    let cache = MeshCache::new(world.clone(), loader, view);
    world.add_render_listener(cache.invalidator());
    cache
}

fn world(dimensions: UVec3) -> Arc<World> {
    Arc::new(World::new(dimensions, Arc::new(BlockRegistry::with_defaults())))
}

/// Draw until every tracked chunk has a settled mesh.
fn settle(cache: &mut MeshCache<usize>, backend: &mut RecordingBackend) -> DrawStats {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut total = DrawStats::default();
    loop {
        let stats = cache.draw(backend);
        total.uploaded += stats.uploaded;
        total.drawn = stats.drawn;
        total.pending = stats.pending;
        if cache.is_idle() {
            return total;
        }
        assert!(Instant::now() < deadline, "mesh workers did not settle");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn view_set_tracks_loaded_chunks_in_range() {
    let world = world(UVec3::new(64, 16, 64));
    let mut cache = cache(&world, 0, 64, 1);

    cache.update_view_set(Vec3::new(8.0, 8.0, 8.0));
    // (0..=1) in x and z, only y = 0 is loaded.
    assert_eq!(cache.len(), 4);
    assert!(cache.is_tracked(ChunkPos::new(1, 0, 1)));
    assert!(!cache.is_tracked(ChunkPos::new(2, 0, 0)));

    cache.update_view_set(Vec3::new(40.0, 8.0, 40.0));
    assert!(!cache.is_tracked(ChunkPos::new(0, 0, 0)));
    assert!(cache.is_tracked(ChunkPos::new(3, 0, 3)));
    assert_eq!(cache.len(), 9);
}

#[test]
fn full_queue_spills_into_the_backlog() {
    let world = world(UVec3::new(32, 16, 32));
    let mut cache = cache(&world, 0, 1, 2);

    cache.update_view_set(Vec3::new(8.0, 8.0, 8.0));
    assert_eq!(cache.len(), 4);
    assert_eq!(cache.backlog_len(), 3);

    // Re-dirtying queued chunks coalesces instead of growing the backlog.
    assert_eq!(cache.mark_dirty(20, 4, 20), 1);
    // Face neighbours only: no diagonal chunk is touched.
    assert_eq!(cache.mark_dirty(15, 4, 15), 3);
    assert_eq!(cache.backlog_len(), 3);
}

#[test]
fn edits_reach_the_drawn_meshes() {
    let world = world(UVec3::new(32, 16, 32));
    let stone = world.registry().by_name("stone").unwrap();
    world.set_block(4, 4, 4, Some(stone.as_ref()));

    let mut cache = cache(&world, 2, 64, 2);
    let mut backend = RecordingBackend::default();
    cache.update_view_set(Vec3::new(8.0, 8.0, 8.0));
    let stats = settle(&mut cache, &mut backend);
    assert_eq!(stats.uploaded, 4);
    assert_eq!(stats.drawn, 1);
    assert_eq!(backend.uploads.iter().sum::<usize>(), 24);

    // On the corner of chunk (1, 0, 1): its two face neighbours rebuild as well, still empty.
    world.set_block(16, 4, 16, Some(stone.as_ref()));
    assert_eq!(cache.process_invalidations(), 1);
    backend.uploads.clear();
    let stats = settle(&mut cache, &mut backend);
    assert_eq!(stats.uploaded, 3);
    assert_eq!(stats.drawn, 2);
    assert_eq!(backend.uploads, vec![24]);
}
