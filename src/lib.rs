// Core module with block definitions, directions and GPU-facing types
pub mod core;

// Player movement and block targeting
pub mod player;

// Atlas, block models, chunk meshing and the mesh cache
pub mod render;

// Settings and frame timing
pub mod utils;

// Block grid and terrain generation
pub mod world;

pub mod constants;

// Re-exports
pub use constants::*;
pub use core::{Block, BlockId, BlockRegistry, Direction, Uniforms, Vertex};
pub use player::{InputState, Player};
pub use render::{FrameRenderer, GpuBackend, MeshCache, TextureAtlas};
pub use utils::{FrameTimer, GameSettings};
pub use world::{RenderListener, TerrainGenerator, World};
