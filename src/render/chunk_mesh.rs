use glam::{IVec3, Vec3};

use crate::constants::CHUNK_SIZE;
use crate::core::chunk::ChunkPos;
use crate::core::direction::Direction;
use crate::core::vertex::Vertex;
use crate::render::model::{ModelCache, Quad};
use crate::world::grid::World;

/// Append the visible geometry of one chunk to `out` and return the number of quads added.
///
/// Reads the live world: a concurrent edit may or may not be reflected, and a
/// later rebuild picks it up.
pub fn build_chunk_mesh(
    chunk: ChunkPos,
    world: &World,
    models: &ModelCache,
    out: &mut Vec<Vertex>,
) -> usize {
    let origin = chunk.origin();
    let mut quads = 0;

    for y in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let pos = origin + IVec3::new(x, y, z);
                let Some(id) = world.block_id(pos.x, pos.y, pos.z) else {
                    continue;
                };
                if id.is_air() {
                    continue;
                }
                let Some(model) = models.model(id) else {
                    continue;
                };

                let offset = pos.as_vec3();
                for direction in Direction::ALL {
                    if is_face_hidden(world, pos + direction.offset(), direction) {
                        continue;
                    }
                    for quad in model.faces(direction) {
                        push_quad(out, quad, offset, direction.ambient_light());
                        quads += 1;
                    }
                }
                for quad in model.unclassified() {
                    push_quad(out, quad, offset, 1.0);
                    quads += 1;
                }
            }
        }
    }
    quads
}

/// The neighbour at `neighbour` hides our face pointing `direction` when its
/// opposite side is solid.
fn is_face_hidden(world: &World, neighbour: IVec3, direction: Direction) -> bool {
    world
        .get_block_at(neighbour)
        .is_some_and(|block| block.is_side_solid(direction.opposite()))
}

fn push_quad(out: &mut Vec<Vertex>, quad: &Quad, offset: Vec3, light: f32) {
    for v in &quad.vertices {
        out.push(Vertex {
            position: (v.position + offset).to_array(),
            normal: quad.normal,
            color: v.color.map(|c| c * light),
            uv: v.uv,
        });
    }
}
