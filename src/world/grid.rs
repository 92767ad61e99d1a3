use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use glam::{IVec3, UVec3};
use parking_lot::RwLock;

use crate::core::block::{Block, BlockId};
use crate::core::registry::BlockRegistry;

/// Receives the coordinate of every block mutation.
///
/// Called synchronously on the mutating thread, so implementations must only
/// record the change and return.
pub trait RenderListener: Send + Sync {
    fn on_render_update(&self, pos: IVec3);
}

/// Bounded, dense grid of block ids.
///
/// Ids are stored as relaxed atomics: any number of mesh workers may read while
/// the main thread writes, and each read observes some recent value. No read
/// is atomic with any other.
pub struct World {
    blocks: Box<[AtomicU16]>,
    dimensions: UVec3,
    registry: Arc<BlockRegistry>,
    listeners: RwLock<Vec<Arc<dyn RenderListener>>>,
}

impl World {
    pub fn new(dimensions: UVec3, registry: Arc<BlockRegistry>) -> Self {
        let volume = dimensions.x as usize * dimensions.y as usize * dimensions.z as usize;
        let blocks = (0..volume).map(|_| AtomicU16::new(0)).collect();
        World {
            blocks,
            dimensions,
            registry,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn dimensions(&self) -> UVec3 {
        self.dimensions
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    pub fn add_render_listener(&self, listener: Arc<dyn RenderListener>) {
        self.listeners.write().push(listener);
    }

    pub fn is_valid(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.dimensions.x
            && (y as u32) < self.dimensions.y
            && (z as u32) < self.dimensions.z
    }

    /// Whether the region around a coordinate is available. The grid is fully
    /// resident, so this is the bounds check.
    pub fn is_loaded(&self, x: i32, y: i32, z: i32) -> bool {
        self.is_valid(x, y, z)
    }

    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let (w, d) = (self.dimensions.x as usize, self.dimensions.z as usize);
        (y as usize * d + z as usize) * w + x as usize
    }

    /// Raw id at a coordinate; `None` outside the grid, `Some(AIR)` for in-range air.
    pub fn block_id(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        if !self.is_valid(x, y, z) {
            return None;
        }
        let raw = self.blocks[self.index(x, y, z)].load(Ordering::Relaxed);
        Some(BlockId(raw))
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<Arc<dyn Block>> {
        match self.block_id(x, y, z) {
            Some(id) if !id.is_air() => self.registry.by_id(id),
            _ => None,
        }
    }

    pub fn get_block_at(&self, pos: IVec3) -> Option<Arc<dyn Block>> {
        self.get_block(pos.x, pos.y, pos.z)
    }

    pub fn is_occupied(&self, pos: IVec3) -> bool {
        self.block_id(pos.x, pos.y, pos.z)
            .is_some_and(|id| !id.is_air())
    }

    /// Store a block (or clear it with `None`) and notify every render listener.
    ///
    /// Out-of-range coordinates are ignored without notification. A block whose
    /// name is not registered is stored as air.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Option<&dyn Block>) {
        if !self.store(x, y, z, block) {
            return;
        }
        let pos = IVec3::new(x, y, z);
        for listener in self.listeners.read().iter() {
            listener.on_render_update(pos);
        }
    }

    pub fn set_block_at(&self, pos: IVec3, block: Option<&dyn Block>) {
        self.set_block(pos.x, pos.y, pos.z, block);
    }

    /// Store without notifying listeners. Used while filling a fresh world.
    pub fn set_block_silent(&self, x: i32, y: i32, z: i32, block: Option<&dyn Block>) {
        self.store(x, y, z, block);
    }

    fn store(&self, x: i32, y: i32, z: i32, block: Option<&dyn Block>) -> bool {
        if !self.is_valid(x, y, z) {
            return false;
        }
        let id = block
            .and_then(|b| self.registry.id_of(b))
            .unwrap_or(BlockId::AIR);
        self.blocks[self.index(x, y, z)].store(id.0, Ordering::Relaxed);
        true
    }

    /// Number of non-air cells; walks the whole grid.
    pub fn count_solid(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.load(Ordering::Relaxed) != 0)
            .count()
    }
}
