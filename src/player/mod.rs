//! Player-related modules
//! Contains the player body, input state, and the look raycast used for editing.

pub mod input;
pub mod raycast;

use std::f32::consts::FRAC_PI_2;

use glam::{IVec3, Vec2, Vec3};

use crate::constants::{
    EYE_HEIGHT, PLAYER_GRAVITY, PLAYER_HEIGHT, PLAYER_JUMP_VELOCITY, PLAYER_MAX_FALL_SPEED,
    PLAYER_SPEED,
};
use crate::world::grid::World;

// Re-export commonly used types
pub use input::InputState;
pub use raycast::{break_block, hover_coords, look_step, place_block};

/// Longest vertical move checked against the grid in one go.
const MAX_VERTICAL_STEP: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    /// Feet position.
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub vertical_velocity: f32,
}

impl Player {
    pub fn new(position: Vec3) -> Self {
        Player {
            position,
            yaw: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
        }
    }

    /// Above the world's top at the corner, so the player drops onto the terrain.
    pub fn spawn(world: &World) -> Self {
        Self::new(Vec3::new(8.0, world.dimensions().y as f32 + 16.0, 8.0))
    }

    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * EYE_HEIGHT
    }

    /// Yaw-relative unit vectors on the ground plane: (forward, right) as (x, z).
    pub fn ground_axes(&self) -> (Vec2, Vec2) {
        let (sin, cos) = self.yaw.sin_cos();
        (Vec2::new(sin, -cos), Vec2::new(cos, sin))
    }

    /// Grid cells occupied by the player's feet and head.
    pub fn body_cells(&self) -> [IVec3; 2] {
        let feet = self.position.floor().as_ivec3();
        [feet, feet + IVec3::Y]
    }

    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw += dx * sensitivity;
        self.pitch = (self.pitch + dy * sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    fn is_standing(&self, world: &World) -> bool {
        let below = IVec3::new(
            self.position.x.floor() as i32,
            self.position.y.ceil() as i32 - 1,
            self.position.z.floor() as i32,
        );
        world.is_occupied(below)
    }

    /// Advance the player by `dt` seconds: gravity, jumping, then walking.
    pub fn update(&mut self, world: &World, dt: f32, input: &InputState) {
        let standing = self.is_standing(world);
        if standing {
            if self.vertical_velocity < 0.0 {
                self.vertical_velocity = 0.0;
            }
            if input.jump {
                self.vertical_velocity = PLAYER_JUMP_VELOCITY;
            }
        } else {
            self.vertical_velocity =
                (self.vertical_velocity - PLAYER_GRAVITY * dt).max(-PLAYER_MAX_FALL_SPEED);
        }

        self.move_vertically(world, self.vertical_velocity * dt);

        let (forward, right) = input.axes();
        if forward != 0.0 || right != 0.0 {
            let (fwd, side) = self.ground_axes();
            let delta = (fwd * forward + side * right).normalize_or_zero() * PLAYER_SPEED * dt;
            let target = self.position + Vec3::new(delta.x, 0.0, delta.y);
            if self.fits_at(world, target) {
                self.position = target;
            }
        }

        self.position.y = self.position.y.max(0.0);
    }

    fn move_vertically(&mut self, world: &World, mut distance: f32) {
        while distance != 0.0 {
            let step = distance.clamp(-MAX_VERTICAL_STEP, MAX_VERTICAL_STEP);
            let target = self.position + Vec3::Y * step;
            if step < 0.0 {
                let floor = target.floor().as_ivec3();
                if world.is_occupied(floor) {
                    self.position.y = (floor.y + 1) as f32;
                    self.vertical_velocity = 0.0;
                    return;
                }
            } else {
                let head = (target + Vec3::Y * PLAYER_HEIGHT).floor().as_ivec3();
                if world.is_occupied(head) {
                    self.vertical_velocity = 0.0;
                    return;
                }
            }
            self.position = target;
            distance -= step;
        }
    }

    fn fits_at(&self, world: &World, feet: Vec3) -> bool {
        let cell = feet.floor().as_ivec3();
        !world.is_occupied(cell) && !world.is_occupied(cell + IVec3::Y)
    }
}
