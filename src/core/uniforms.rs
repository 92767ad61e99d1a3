use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    /// Distance at which linear fog starts.
    pub fog_start: f32,
    pub fog_color: [f32; 3],
    /// Distance at which fog is fully opaque.
    pub fog_end: f32,
}
