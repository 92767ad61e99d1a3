//! Rendering-related modules
//! Contains the texture atlas, block models, chunk meshing, background mesh workers, the mesh cache and per-frame driving.

pub mod atlas;
pub mod camera;
pub mod chunk_mesh;
pub mod frame;
pub mod highlight;
pub mod mesh_cache;
pub mod mesh_loader;
pub mod model;

// Re-export commonly used types
pub use atlas::{AtlasError, TextureAtlas, TextureRegion};
pub use camera::{Projection, view_matrix};
pub use chunk_mesh::build_chunk_mesh;
pub use frame::{FrameOutput, FrameRenderer, RendererConfig, frame_uniforms};
pub use highlight::highlight_lines;
pub use mesh_cache::{DrawStats, GpuBackend, MeshCache, MeshInvalidator};
pub use mesh_loader::{BuildState, ChunkMeshBuffer, MeshJob, MeshLoader};
pub use model::{BlockModel, ModelCache, Quad, QuadVertex, build_cube_model, quad_direction};
