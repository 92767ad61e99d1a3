//! World state and generation
//! Contains the shared block grid, its change listeners and the terrain generator.

pub mod generator;
pub mod grid;

// Re-export commonly used types
pub use generator::TerrainGenerator;
pub use grid::{RenderListener, World};
