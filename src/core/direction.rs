use glam::IVec3;

use crate::constants::FACE_LIGHT;

/// One of the six axis-aligned faces of a block.
///
/// The discriminants are stable: opposite faces differ only in the lowest bit,
/// so `Down`/`Up`, `Left`/`Right` and `Back`/`Forward` pair up as `i ^ 1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Down = 0,
    Up = 1,
    Left = 2,
    Right = 3,
    Back = 4,
    Forward = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::Left,
        Direction::Right,
        Direction::Back,
        Direction::Forward,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        Self::ALL[self.index() ^ 1]
    }

    pub fn offset(self) -> IVec3 {
        match self {
            Direction::Down => IVec3::NEG_Y,
            Direction::Up => IVec3::Y,
            Direction::Left => IVec3::NEG_X,
            Direction::Right => IVec3::X,
            Direction::Back => IVec3::NEG_Z,
            Direction::Forward => IVec3::Z,
        }
    }

    pub fn normal(self) -> [f32; 3] {
        self.offset().as_vec3().to_array()
    }

    /// Fixed brightness applied to faces pointing this way.
    pub fn ambient_light(self) -> f32 {
        FACE_LIGHT[self.index()]
    }

    /// Face lying on the unit-cube boundary `value` (0 or 1) of `axis` (0=x, 1=y, 2=z).
    pub fn from_axis_boundary(axis: usize, upper: bool) -> Option<Direction> {
        let direction = match (axis, upper) {
            (0, false) => Direction::Left,
            (0, true) => Direction::Right,
            (1, false) => Direction::Down,
            (1, true) => Direction::Up,
            (2, false) => Direction::Back,
            (2, true) => Direction::Forward,
            _ => return None,
        };
        Some(direction)
    }
}
