use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;
use tracing::debug;

use crate::core::chunk::ChunkPos;
use crate::core::vertex::Vertex;
use crate::render::chunk_mesh::build_chunk_mesh;
use crate::render::model::ModelCache;
use crate::world::grid::World;

/// Where a chunk sits in the rebuild pipeline.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BuildState {
    #[default]
    Idle,
    /// A job is waiting in the worker queue or the main-thread backlog.
    Queued,
    /// A worker is meshing; `rerun` asks it to mesh once more before publishing.
    Building { rerun: bool },
}

#[derive(Default)]
struct MeshSlot {
    vertices: Vec<Vertex>,
    ready: bool,
    build: BuildState,
    evicted: bool,
}

/// CPU-side mesh of one chunk, shared between the main thread and one worker at a time.
pub struct ChunkMeshBuffer {
    pos: ChunkPos,
    slot: Mutex<MeshSlot>,
}

impl ChunkMeshBuffer {
    pub fn new(pos: ChunkPos) -> Arc<Self> {
        Arc::new(ChunkMeshBuffer {
            pos,
            slot: Mutex::new(MeshSlot::default()),
        })
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// Request a rebuild. Returns true when the caller must queue a job;
    /// a queued chunk absorbs the request and a building one reruns.
    pub fn mark_dirty(&self) -> bool {
        let mut slot = self.slot.lock();
        if slot.evicted {
            return false;
        }
        match slot.build {
            BuildState::Queued => false,
            BuildState::Building { .. } => {
                slot.build = BuildState::Building { rerun: true };
                false
            }
            BuildState::Idle => {
                slot.build = BuildState::Queued;
                true
            }
        }
    }

    /// Take freshly built vertices, if a build finished since the last call.
    pub fn take_ready(&self) -> Option<Vec<Vertex>> {
        let mut slot = self.slot.lock();
        if !slot.ready {
            return None;
        }
        slot.ready = false;
        Some(std::mem::take(&mut slot.vertices))
    }

    pub fn is_ready(&self) -> bool {
        self.slot.lock().ready
    }

    pub fn build_state(&self) -> BuildState {
        self.slot.lock().build
    }

    /// Detach from the cache: pending jobs are dropped and results discarded.
    pub fn evict(&self) {
        let mut slot = self.slot.lock();
        slot.evicted = true;
        slot.vertices = Vec::new();
        slot.ready = false;
    }

    pub fn is_evicted(&self) -> bool {
        self.slot.lock().evicted
    }

    fn begin_build(&self) -> bool {
        let mut slot = self.slot.lock();
        if slot.evicted {
            slot.build = BuildState::Idle;
            return false;
        }
        slot.build = BuildState::Building { rerun: false };
        true
    }

    /// Returns false when the chunk was dirtied mid-build and must be meshed again.
    fn finish_build(&self, vertices: Vec<Vertex>) -> bool {
        let mut slot = self.slot.lock();
        if slot.evicted {
            slot.build = BuildState::Idle;
            return true;
        }
        if slot.build == (BuildState::Building { rerun: true }) {
            slot.build = BuildState::Building { rerun: false };
            return false;
        }
        slot.vertices = vertices;
        slot.ready = true;
        slot.build = BuildState::Idle;
        true
    }

    /// Mesh this chunk on the calling thread until no rerun is pending.
    pub fn rebuild(&self, world: &World, models: &ModelCache) {
        if !self.begin_build() {
            return;
        }
        loop {
            let mut vertices = Vec::new();
            let quads = build_chunk_mesh(self.pos, world, models, &mut vertices);
            if self.finish_build(vertices) {
                debug!("Meshed chunk {:?}: {} quads", self.pos.0, quads);
                break;
            }
        }
    }
}

pub struct MeshJob {
    pub buffer: Arc<ChunkMeshBuffer>,
}

/// Pool of named mesh worker threads fed through a bounded queue.
pub struct MeshLoader {
    request_tx: Sender<MeshJob>,
    worker_count: usize,
}

impl MeshLoader {
    pub fn new(
        world: Arc<World>,
        models: Arc<ModelCache>,
        worker_count: usize,
        queue_capacity: usize,
    ) -> std::io::Result<Self> {
        let (request_tx, request_rx) = bounded::<MeshJob>(queue_capacity.max(1));

        for i in 0..worker_count {
            let rx: Receiver<MeshJob> = request_rx.clone();
            let world = Arc::clone(&world);
            let models = Arc::clone(&models);

            thread::Builder::new()
                .name(format!("mesh-worker-{}", i))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        job.buffer.rebuild(&world, &models);
                    }
                })?;
        }

        Ok(Self {
            request_tx,
            worker_count,
        })
    }

    /// Queue a job without blocking; hands it back if the queue is full.
    pub fn try_request(&self, job: MeshJob) -> Result<(), MeshJob> {
        self.request_tx.try_send(job).map_err(TrySendError::into_inner)
    }

    /// Jobs waiting for a worker.
    pub fn queued(&self) -> usize {
        self.request_tx.len()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}
