use glam::Vec3;

use crate::core::direction::Direction;
use crate::render::atlas::TextureAtlas;
use crate::render::model::{BlockModel, build_cube_model};

/// Numeric block identity as stored in the world grid. Zero is air.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: BlockId = BlockId(0);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const UNIT: BoundingBox = BoundingBox {
        min: Vec3::ZERO,
        max: Vec3::ONE,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        BoundingBox { min, max }
    }

    pub fn translate(&self, offset: Vec3) -> BoundingBox {
        BoundingBox {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Overlap test comparing min corners against the summed extents on each axis.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let distance = (self.min - other.min).abs() * 2.0;
        let extent = self.size() + other.size();
        distance.cmplt(extent).all()
    }
}

/// Behaviour of a block type. Implementations are registered once and then
/// shared read-only between the world, the mesh workers and the renderer.
pub trait Block: Send + Sync {
    /// Globally unique name.
    fn name(&self) -> &str;

    /// Texture name for each face, indexed by `Direction`.
    fn face_textures(&self) -> [&str; 6];

    fn build_model(&self, atlas: &TextureAtlas) -> BlockModel {
        let textures = self.face_textures();
        build_cube_model(Direction::ALL.map(|d| atlas.region(textures[d.index()])))
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::UNIT
    }

    /// Whether this block's `side` fully hides the neighbouring face.
    fn is_side_solid(&self, _side: Direction) -> bool {
        true
    }
}

/// A full opaque cube with one texture per face.
#[derive(Clone, Debug)]
pub struct SimpleBlock {
    name: String,
    textures: [String; 6],
}

impl SimpleBlock {
    pub fn new(name: impl Into<String>, textures: [&str; 6]) -> Self {
        SimpleBlock {
            name: name.into(),
            textures: textures.map(str::to_string),
        }
    }

    pub fn uniform(name: impl Into<String>, texture: &str) -> Self {
        Self::new(name, [texture; 6])
    }
}

impl Block for SimpleBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn face_textures(&self) -> [&str; 6] {
        [
            &self.textures[0],
            &self.textures[1],
            &self.textures[2],
            &self.textures[3],
            &self.textures[4],
            &self.textures[5],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_boxes_overlap_only_when_close() {
        let a = BoundingBox::UNIT;
        assert!(a.intersects(&a.translate(Vec3::new(0.5, 0.0, 0.0))));
        assert!(!a.intersects(&a.translate(Vec3::new(1.0, 0.0, 0.0))));
        assert!(!a.intersects(&a.translate(Vec3::new(0.0, -2.0, 0.0))));
    }

    #[test]
    fn simple_block_faces_follow_direction_order() {
        let grass = SimpleBlock::new(
            "grass",
            ["dirt.png", "grass.png", "side.png", "side.png", "side.png", "side.png"],
        );
        assert_eq!(grass.face_textures()[Direction::Down.index()], "dirt.png");
        assert_eq!(grass.face_textures()[Direction::Up.index()], "grass.png");
        assert!(grass.is_side_solid(Direction::Left));
    }
}
