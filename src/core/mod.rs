//! Core data structures
//! Contains block identities, chunk coordinates, face directions, the block registry and GPU-facing vertex types.

pub mod block;
pub mod chunk;
pub mod direction;
pub mod registry;
pub mod uniforms;
pub mod vertex;

// Re-export commonly used types
pub use block::{Block, BlockId, BoundingBox, SimpleBlock};
pub use chunk::{ChunkPos, affected_chunks};
pub use direction::Direction;
pub use registry::{BlockRegistry, RegistryError};
pub use uniforms::Uniforms;
pub use vertex::{Vertex, quad_indices};
