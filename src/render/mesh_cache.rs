use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::chunk::{ChunkPos, affected_chunks};
use crate::core::vertex::Vertex;
use crate::render::mesh_loader::{BuildState, ChunkMeshBuffer, MeshJob, MeshLoader};
use crate::world::grid::{RenderListener, World};

/// Uploads chunk meshes and issues their draw calls.
///
/// Dropping a `Mesh` releases its GPU resources.
pub trait GpuBackend {
    type Mesh;

    fn upload(&mut self, vertices: &[Vertex]) -> Self::Mesh;
    fn draw(&mut self, mesh: &Self::Mesh, vertex_count: u32);
}

/// World listener that forwards edited coordinates to the render thread.
pub struct MeshInvalidator {
    tx: Sender<IVec3>,
}

impl RenderListener for MeshInvalidator {
    fn on_render_update(&self, pos: IVec3) {
        let _ = self.tx.send(pos);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DrawStats {
    /// Chunks with a non-empty mesh drawn this frame.
    pub drawn: usize,
    /// Meshes uploaded this frame.
    pub uploaded: usize,
    /// Tracked chunks whose first build has not arrived yet.
    pub pending: usize,
    pub vertices: u64,
}

struct CachedMesh<M> {
    shared: Arc<ChunkMeshBuffer>,
    gpu: Option<M>,
    vertex_count: u32,
    built: bool,
}

/// Per-chunk GPU meshes around the player. Main thread only.
pub struct MeshCache<M> {
    world: Arc<World>,
    loader: MeshLoader,
    entries: FxHashMap<ChunkPos, CachedMesh<M>>,
    backlog: VecDeque<MeshJob>,
    last_stats: DrawStats,
    view_distance: i32,
    invalidation_tx: Sender<IVec3>,
    invalidation_rx: Receiver<IVec3>,
}

impl<M> MeshCache<M> {
    pub fn new(world: Arc<World>, loader: MeshLoader, view_distance: i32) -> Self {
        let (invalidation_tx, invalidation_rx) = unbounded();
        MeshCache {
            world,
            loader,
            entries: FxHashMap::default(),
            backlog: VecDeque::new(),
            last_stats: DrawStats::default(),
            view_distance: view_distance.max(0),
            invalidation_tx,
            invalidation_rx,
        }
    }

    /// Listener to register with the world so edits reach `process_invalidations`.
    pub fn invalidator(&self) -> Arc<MeshInvalidator> {
        Arc::new(MeshInvalidator {
            tx: self.invalidation_tx.clone(),
        })
    }

    /// Turn every edit reported since the last call into rebuild requests.
    pub fn process_invalidations(&mut self) -> usize {
        let mut count = 0;
        while let Ok(pos) = self.invalidation_rx.try_recv() {
            self.mark_dirty(pos.x, pos.y, pos.z);
            count += 1;
        }
        count
    }

    /// Schedule a rebuild of every tracked chunk whose mesh can show the
    /// block at `(x, y, z)`. Returns how many tracked chunks were marked.
    pub fn mark_dirty(&mut self, x: i32, y: i32, z: i32) -> usize {
        let mut marked = 0;
        for chunk in affected_chunks(IVec3::new(x, y, z)) {
            let Some(shared) = self.entries.get(&chunk).map(|e| e.shared.clone()) else {
                continue;
            };
            marked += 1;
            if shared.mark_dirty() {
                self.enqueue(MeshJob { buffer: shared });
            }
        }
        marked
    }

    fn enqueue(&mut self, job: MeshJob) {
        if let Err(job) = self.loader.try_request(job) {
            if self.backlog.is_empty() {
                warn!("Mesh queue full, deferring rebuilds");
            }
            // A buffer is only handed out while Idle, so the backlog never holds it twice.
            self.backlog.push_back(job);
        }
    }

    fn retry_backlog(&mut self) {
        while let Some(job) = self.backlog.pop_front() {
            if job.buffer.is_evicted() {
                continue;
            }
            if let Err(job) = self.loader.try_request(job) {
                self.backlog.push_front(job);
                break;
            }
        }
    }

    /// Track exactly the loaded chunks within `view_distance` of the player.
    pub fn update_view_set(&mut self, player_pos: Vec3) {
        let center = ChunkPos::from_world(player_pos);
        let view_distance = self.view_distance;

        self.entries.retain(|pos, entry| {
            let keep = pos.chebyshev_distance(center) <= view_distance;
            if !keep {
                entry.shared.evict();
                debug!("Evicted chunk mesh {:?}", pos.0);
            }
            keep
        });

        self.retry_backlog();

        let mut missing = Vec::new();
        for dy in -view_distance..=view_distance {
            for dz in -view_distance..=view_distance {
                for dx in -view_distance..=view_distance {
                    let pos = ChunkPos(center.0 + IVec3::new(dx, dy, dz));
                    if self.entries.contains_key(&pos) {
                        continue;
                    }
                    let origin = pos.origin();
                    if !self.world.is_loaded(origin.x, origin.y, origin.z) {
                        continue;
                    }
                    missing.push(pos);
                }
            }
        }
        missing.sort_by_key(|pos| pos.distance_squared(center));

        for pos in missing {
            let shared = ChunkMeshBuffer::new(pos);
            shared.mark_dirty();
            self.entries.insert(
                pos,
                CachedMesh {
                    shared: shared.clone(),
                    gpu: None,
                    vertex_count: 0,
                    built: false,
                },
            );
            self.enqueue(MeshJob { buffer: shared });
        }
    }

    /// Upload finished builds, then draw every tracked chunk with its last uploaded mesh.
    pub fn draw<B>(&mut self, backend: &mut B) -> DrawStats
    where
        B: GpuBackend<Mesh = M>,
    {
        let mut stats = DrawStats::default();
        for entry in self.entries.values_mut() {
            if let Some(vertices) = entry.shared.take_ready() {
                entry.vertex_count = vertices.len() as u32;
                // Replacing the handle drops the previous GPU mesh.
                entry.gpu = (!vertices.is_empty()).then(|| backend.upload(&vertices));
                entry.built = true;
                stats.uploaded += 1;
            }
            if !entry.built {
                stats.pending += 1;
                continue;
            }
            if let Some(mesh) = &entry.gpu {
                backend.draw(mesh, entry.vertex_count);
                stats.drawn += 1;
                stats.vertices += entry.vertex_count as u64;
            }
        }
        self.last_stats = stats;
        stats
    }

    /// Counters from the most recent `draw`.
    pub fn stats(&self) -> DrawStats {
        self.last_stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_tracked(&self, pos: ChunkPos) -> bool {
        self.entries.contains_key(&pos)
    }

    /// True when no chunk is queued, building, or holding an unconsumed build.
    pub fn is_idle(&self) -> bool {
        self.backlog.is_empty()
            && self
                .entries
                .values()
                .all(|e| e.shared.build_state() == BuildState::Idle && !e.shared.is_ready())
    }

    /// Jobs waiting on the main thread because the worker queue was full.
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }
}
