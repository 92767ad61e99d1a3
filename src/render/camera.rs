use glam::{Mat4, Vec3};

use crate::constants::{EYE_HEIGHT, FAR_PLANE, NEAR_PLANE};
use crate::player::Player;

/// World-to-view transform: pitch, then yaw, around the player's eye.
pub fn view_matrix(player: &Player) -> Mat4 {
    Mat4::from_rotation_x(player.pitch)
        * Mat4::from_rotation_y(player.yaw)
        * Mat4::from_translation(-(player.position + Vec3::Y * EYE_HEIGHT))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fov_y_degrees: f32) -> Self {
        Projection {
            width: width.max(1),
            height: height.max(1),
            fov_y: fov_y_degrees.to_radians(),
            near: NEAR_PLANE,
            far: FAR_PLANE,
        }
    }

    /// Zero-sized surfaces (minimised windows) keep the last valid size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }
}
