use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::block::BlockId;
use crate::core::direction::Direction;
use crate::core::registry::BlockRegistry;
use crate::render::atlas::{TextureAtlas, TextureRegion};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct QuadVertex {
    pub position: Vec3,
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl QuadVertex {
    pub fn new(position: Vec3, uv: [f32; 2]) -> Self {
        QuadVertex {
            position,
            uv,
            color: [1.0; 3],
        }
    }
}

/// Four coplanar corners in block-local space, counter-clockwise seen from the front.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Quad {
    pub vertices: [QuadVertex; 4],
    pub normal: [f32; 3],
}

/// Face of the unit cube a quad lies flush on, if exactly one axis pins all
/// four corners to 0 or 1.
pub fn quad_direction(quad: &Quad) -> Option<Direction> {
    let mut found = None;
    let mut matches = 0;
    for axis in 0..3 {
        let first = quad.vertices[0].position[axis];
        let flush = (first == 0.0 || first == 1.0)
            && quad.vertices.iter().all(|v| v.position[axis] == first);
        if flush {
            matches += 1;
            found = Direction::from_axis_boundary(axis, first == 1.0);
        }
    }
    if matches == 1 { found } else { None }
}

/// Renderable geometry of a block type, split by the face it can be culled with.
#[derive(Clone, Debug, Default)]
pub struct BlockModel {
    face_quads: [Vec<Quad>; 6],
    quads: Vec<Quad>,
}

impl BlockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_quad(&mut self, quad: Quad) {
        match quad_direction(&quad) {
            Some(direction) => self.face_quads[direction.index()].push(quad),
            None => self.quads.push(quad),
        }
    }

    pub fn faces(&self, direction: Direction) -> &[Quad] {
        &self.face_quads[direction.index()]
    }

    /// Quads not flush with any cube face; never culled.
    pub fn unclassified(&self) -> &[Quad] {
        &self.quads
    }

    pub fn quad_count(&self) -> usize {
        self.face_quads.iter().map(Vec::len).sum::<usize>() + self.quads.len()
    }
}

/// Unit cube with one textured quad per face, indexed by `Direction`.
pub fn build_cube_model(textures: [TextureRegion; 6]) -> BlockModel {
    let mut model = BlockModel::new();
    for direction in Direction::ALL {
        let t = textures[direction.index()];
        let corners = cube_face(direction);
        // Side faces keep min_v on their top edge; caps map the same way round.
        let uvs = match direction {
            Direction::Up | Direction::Down => [
                [t.min_u, t.min_v],
                [t.min_u, t.max_v],
                [t.max_u, t.max_v],
                [t.max_u, t.min_v],
            ],
            _ => corners.map(|c| {
                let u = match direction {
                    Direction::Left => c.z,
                    Direction::Right => 1.0 - c.z,
                    Direction::Back => 1.0 - c.x,
                    _ => c.x,
                };
                [
                    t.min_u + (t.max_u - t.min_u) * u,
                    t.min_v + (t.max_v - t.min_v) * (1.0 - c.y),
                ]
            }),
        };
        let vertices = [0, 1, 2, 3].map(|i| QuadVertex::new(corners[i], uvs[i]));
        model.add_quad(Quad {
            vertices,
            normal: direction.normal(),
        });
    }
    model
}

fn cube_face(direction: Direction) -> [Vec3; 4] {
    let v = Vec3::new;
    match direction {
        Direction::Up => [v(0., 1., 0.), v(0., 1., 1.), v(1., 1., 1.), v(1., 1., 0.)],
        Direction::Down => [v(0., 0., 0.), v(1., 0., 0.), v(1., 0., 1.), v(0., 0., 1.)],
        Direction::Right => [v(1., 0., 0.), v(1., 1., 0.), v(1., 1., 1.), v(1., 0., 1.)],
        Direction::Left => [v(0., 0., 0.), v(0., 0., 1.), v(0., 1., 1.), v(0., 1., 0.)],
        Direction::Forward => [v(0., 0., 1.), v(1., 0., 1.), v(1., 1., 1.), v(0., 1., 1.)],
        Direction::Back => [v(0., 0., 0.), v(0., 1., 0.), v(1., 1., 0.), v(1., 0., 0.)],
    }
}

/// Lazily built block models, shared between the renderer and mesh workers.
pub struct ModelCache {
    registry: Arc<BlockRegistry>,
    atlas: Arc<TextureAtlas>,
    models: RwLock<FxHashMap<BlockId, Arc<BlockModel>>>,
}

impl ModelCache {
    pub fn new(registry: Arc<BlockRegistry>, atlas: Arc<TextureAtlas>) -> Self {
        ModelCache {
            registry,
            atlas,
            models: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn atlas(&self) -> &Arc<TextureAtlas> {
        &self.atlas
    }

    /// Model for `id`, built on first request. `None` for air and unknown ids.
    pub fn model(&self, id: BlockId) -> Option<Arc<BlockModel>> {
        if let Some(model) = self.models.read().get(&id) {
            return Some(model.clone());
        }
        let block = self.registry.by_id(id)?;
        let built = Arc::new(block.build_model(&self.atlas));
        let mut models = self.models.write();
        Some(models.entry(id).or_insert(built).clone())
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> TextureRegion {
        TextureRegion {
            min_u: 0.25,
            max_u: 0.5,
            min_v: 0.0,
            max_v: 0.25,
        }
    }

    fn quad(points: [[f32; 3]; 4]) -> Quad {
        Quad {
            vertices: points.map(|p| QuadVertex::new(Vec3::from_array(p), [0.0, 0.0])),
            normal: [0.0, 1.0, 0.0],
        }
    }

    #[test]
    fn flush_quads_are_classified() {
        let top = quad([[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]]);
        assert_eq!(quad_direction(&top), Some(Direction::Up));
        let west = quad([[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 1., 0.]]);
        assert_eq!(quad_direction(&west), Some(Direction::Left));
    }

    #[test]
    fn inset_and_diagonal_quads_are_unknown() {
        let inset = quad([[0., 0.5, 0.], [0., 0.5, 1.], [1., 0.5, 1.], [1., 0.5, 0.]]);
        assert_eq!(quad_direction(&inset), None);
        let diagonal = quad([[0., 0., 0.], [1., 0., 1.], [1., 1., 1.], [0., 1., 0.]]);
        assert_eq!(quad_direction(&diagonal), None);
    }

    #[test]
    fn cube_has_one_outward_quad_per_face() {
        let model = build_cube_model([region(); 6]);
        assert_eq!(model.quad_count(), 6);
        assert!(model.unclassified().is_empty());
        for direction in Direction::ALL {
            let faces = model.faces(direction);
            assert_eq!(faces.len(), 1);
            let q = faces[0];
            assert_eq!(q.normal, direction.normal());
            // Counter-clockwise from outside: the winding normal matches the face normal.
            let [a, b, c, _] = q.vertices.map(|v| v.position);
            let winding = (b - a).cross(c - a).normalize();
            assert_eq!(winding, Vec3::from_array(direction.normal()));
        }
    }

    #[test]
    fn side_faces_put_min_v_on_top() {
        let model = build_cube_model([region(); 6]);
        let side = model.faces(Direction::Forward)[0];
        for v in side.vertices {
            let expected = if v.position.y == 1.0 { 0.0 } else { 0.25 };
            assert_eq!(v.uv[1], expected);
        }
    }

    #[test]
    fn models_are_built_once() {
        let registry = Arc::new(BlockRegistry::with_defaults());
        let cache = ModelCache::new(registry.clone(), Arc::new(TextureAtlas::procedural()));
        let stone = registry.id_of_name("stone").unwrap();

        let first = cache.model(stone).unwrap();
        let second = cache.model(stone).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.model(BlockId::AIR).is_none());
        assert_eq!(cache.len(), 1);
    }
}
