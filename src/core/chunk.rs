use glam::{IVec3, Vec3};

use crate::constants::CHUNK_SIZE;
use crate::core::direction::Direction;

/// Chunk coordinate: a block coordinate divided by `CHUNK_SIZE` (rounded down) on every axis.
///
/// Chunks are not stored anywhere; they only index the mesh cache.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ChunkPos(pub IVec3);

impl ChunkPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkPos(IVec3::new(x, y, z))
    }

    pub fn from_block(block: IVec3) -> Self {
        ChunkPos(block.div_euclid(IVec3::splat(CHUNK_SIZE)))
    }

    pub fn from_world(position: Vec3) -> Self {
        Self::from_block(position.floor().as_ivec3())
    }

    /// Block coordinate of the chunk's lowest corner.
    pub fn origin(self) -> IVec3 {
        self.0 * CHUNK_SIZE
    }

    /// Position of `block` inside its chunk, each component in `0..CHUNK_SIZE`.
    pub fn local(block: IVec3) -> IVec3 {
        block.rem_euclid(IVec3::splat(CHUNK_SIZE))
    }

    pub fn offset(self, direction: Direction) -> ChunkPos {
        ChunkPos(self.0 + direction.offset())
    }

    pub fn chebyshev_distance(self, other: ChunkPos) -> i32 {
        (self.0 - other.0).abs().max_element()
    }

    /// Squared distance in chunk units, used to build near chunks first.
    pub fn distance_squared(self, other: ChunkPos) -> i32 {
        (self.0 - other.0).length_squared()
    }
}

/// Chunks whose mesh depends on the block at `block`.
///
/// Always the owning chunk; additionally the neighbour across a chunk face when
/// the block lies on that face (local coordinate 0 or 15 on some axis).
pub fn affected_chunks(block: IVec3) -> Vec<ChunkPos> {
    let owner = ChunkPos::from_block(block);
    let local = ChunkPos::local(block);
    let mut chunks = Vec::with_capacity(4);
    chunks.push(owner);

    let faces = [
        (local.x, Direction::Left, Direction::Right),
        (local.y, Direction::Down, Direction::Up),
        (local.z, Direction::Back, Direction::Forward),
    ];
    for (coord, low, high) in faces {
        if coord == 0 {
            chunks.push(owner.offset(low));
        } else if coord == CHUNK_SIZE - 1 {
            chunks.push(owner.offset(high));
        }
    }
    chunks
}
