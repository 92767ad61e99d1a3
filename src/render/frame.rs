use std::sync::Arc;

use glam::IVec3;
use tracing::info;

use crate::constants::{CHUNK_SIZE, CLEAR_COLOR};
use crate::core::uniforms::Uniforms;
use crate::core::vertex::Vertex;
use crate::player::{Player, hover_coords};
use crate::render::atlas::TextureAtlas;
use crate::render::camera::{Projection, view_matrix};
use crate::render::highlight::highlight_lines;
use crate::render::mesh_cache::{DrawStats, GpuBackend, MeshCache};
use crate::render::mesh_loader::MeshLoader;
use crate::render::model::ModelCache;
use crate::utils::settings::GraphicsSettings;
use crate::world::grid::World;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererConfig {
    pub view_distance: i32,
    pub fov_degrees: f32,
    pub mesh_workers: usize,
    pub mesh_queue_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig::from(&GraphicsSettings::default())
    }
}

impl From<&GraphicsSettings> for RendererConfig {
    fn from(graphics: &GraphicsSettings) -> Self {
        RendererConfig {
            view_distance: graphics.view_distance,
            fov_degrees: graphics.fov,
            mesh_workers: graphics.mesh_workers,
            mesh_queue_capacity: graphics.mesh_queue_capacity,
        }
    }
}

/// Everything the backend needs to finish a frame after the chunk draws.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    pub uniforms: Uniforms,
    pub stats: DrawStats,
    pub hover: Option<IVec3>,
    /// Line-list outline of the hovered block.
    pub highlight: Option<Vec<Vertex>>,
}

/// Linear fog that hides chunks popping in at the edge of the view set.
pub fn fog_range(view_distance: i32) -> (f32, f32) {
    let edge = (view_distance * CHUNK_SIZE) as f32;
    ((edge - 32.0).max(0.0), (edge - 8.0).max(1.0))
}

pub fn frame_uniforms(player: &Player, projection: &Projection, view_distance: i32) -> Uniforms {
    let (fog_start, fog_end) = fog_range(view_distance);
    Uniforms {
        view_proj: (projection.matrix() * view_matrix(player)).to_cols_array_2d(),
        camera_pos: player.eye().to_array(),
        fog_start,
        fog_color: CLEAR_COLOR,
        fog_end,
    }
}

/// Per-frame driver: applies world edits to the mesh cache, keeps the view
/// set around the player, draws it, and resolves the hovered block.
pub struct FrameRenderer<M> {
    world: Arc<World>,
    models: Arc<ModelCache>,
    meshes: MeshCache<M>,
    projection: Projection,
}

impl<M> FrameRenderer<M> {
    pub fn new(
        world: Arc<World>,
        atlas: Arc<TextureAtlas>,
        config: RendererConfig,
        width: u32,
        height: u32,
    ) -> std::io::Result<Self> {
        let models = Arc::new(ModelCache::new(world.registry().clone(), atlas));
        let loader = MeshLoader::new(
            world.clone(),
            models.clone(),
            config.mesh_workers,
            config.mesh_queue_capacity,
        )?;
        let meshes = MeshCache::new(world.clone(), loader, config.view_distance);
        world.add_render_listener(meshes.invalidator());

        info!(
            "Renderer ready: view distance {}, {} mesh workers",
            config.view_distance, config.mesh_workers
        );
        Ok(FrameRenderer {
            world,
            models,
            meshes,
            projection: Projection::new(width, height, config.fov_degrees),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn meshes(&self) -> &MeshCache<M> {
        &self.meshes
    }

    pub fn models(&self) -> &Arc<ModelCache> {
        &self.models
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn render_frame<B>(&mut self, player: &Player, backend: &mut B) -> FrameOutput
    where
        B: GpuBackend<Mesh = M>,
    {
        self.meshes.process_invalidations();
        self.meshes.update_view_set(player.position);
        let stats = self.meshes.draw(backend);

        let hover = hover_coords(player, &self.world);
        FrameOutput {
            uniforms: frame_uniforms(player, &self.projection, self.meshes.view_distance()),
            stats,
            hover,
            highlight: hover.map(highlight_lines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_ends_inside_the_view_set() {
        let (start, end) = fog_range(5);
        assert_eq!((start, end), (48.0, 72.0));
        let (start, end) = fog_range(1);
        assert!(start == 0.0 && end > start);
    }
}
