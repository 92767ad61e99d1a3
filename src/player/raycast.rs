use glam::{IVec3, Vec3};

use crate::constants::{RAYCAST_MAX_STEPS, RAYCAST_STEP};
use crate::core::block::Block;
use crate::player::Player;
use crate::world::grid::World;

/// One raycast increment along the look direction.
pub fn look_step(yaw: f32, pitch: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    Vec3::new(sin_yaw * cos_pitch, -sin_pitch, -cos_yaw * cos_pitch) * RAYCAST_STEP
}

/// Sample the look ray from the eye; returns the first occupied cell and the
/// sample position that hit it. Cells are the sample coordinates truncated
/// toward zero.
fn march(player: &Player, world: &World) -> Option<(IVec3, Vec3)> {
    let step = look_step(player.yaw, player.pitch);
    let mut sample = player.eye();
    for _ in 0..RAYCAST_MAX_STEPS {
        let cell = sample.as_ivec3();
        if world.get_block_at(cell).is_some() {
            return Some((cell, sample));
        }
        sample += step;
    }
    None
}

/// The block the player is looking at, within reach.
pub fn hover_coords(player: &Player, world: &World) -> Option<IVec3> {
    march(player, world).map(|(cell, _)| cell)
}

/// Remove the hovered block. Returns the cleared cell.
pub fn break_block(player: &Player, world: &World) -> Option<IVec3> {
    let cell = hover_coords(player, world)?;
    world.set_block_at(cell, None);
    Some(cell)
}

/// Put `block` in the cell just before the hovered one along the ray.
///
/// Refused outside the world and inside the player's own body.
pub fn place_block(player: &Player, world: &World, block: &dyn Block) -> Option<IVec3> {
    let (_, sample) = march(player, world)?;
    let cell = (sample - look_step(player.yaw, player.pitch)).as_ivec3();
    if !world.is_valid(cell.x, cell.y, cell.z) || player.body_cells().contains(&cell) {
        return None;
    }
    world.set_block_at(cell, Some(block));
    Some(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EYE_HEIGHT;
    use crate::core::registry::BlockRegistry;
    use glam::UVec3;
    use std::f32::consts::FRAC_PI_2;
    use std::sync::Arc;

    #[test]
    fn step_follows_yaw_and_pitch() {
        let ahead = look_step(0.0, 0.0);
        assert!((ahead - Vec3::new(0.0, 0.0, -0.2)).length() < 1e-6);
        let down = look_step(0.0, FRAC_PI_2);
        assert!((down - Vec3::new(0.0, -0.2, 0.0)).length() < 1e-6);
        let right = look_step(FRAC_PI_2, 0.0);
        assert!((right - Vec3::new(0.2, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn looking_down_hits_the_floor_and_places_above_it() {
        let world = World::new(UVec3::new(16, 16, 16), Arc::new(BlockRegistry::with_defaults()));
        let stone = world.registry().by_name("stone").unwrap();
        world.set_block(8, 2, 8, Some(stone.as_ref()));

        // Eye at y = 9.7, straight down.
        let mut player = Player::new(Vec3::new(8.5, 8.0, 8.5));
        player.pitch = FRAC_PI_2;
        assert_eq!(hover_coords(&player, &world), Some(IVec3::new(8, 2, 8)));

        let gold = world.registry().by_name("gold_block").unwrap();
        assert_eq!(place_block(&player, &world, gold.as_ref()), Some(IVec3::new(8, 3, 8)));
        assert_eq!(world.get_block(8, 3, 8).unwrap().name(), "gold_block");
        assert_eq!(break_block(&player, &world), Some(IVec3::new(8, 3, 8)));
        assert!(world.get_block(8, 3, 8).is_none());
    }

    #[test]
    fn nothing_in_reach_is_a_miss() {
        let world = World::new(UVec3::new(16, 16, 16), Arc::new(BlockRegistry::with_defaults()));
        let player = Player::new(Vec3::new(8.5, 8.0, 8.5));
        assert_eq!(hover_coords(&player, &world), None);
        assert_eq!(break_block(&player, &world), None);
    }

    #[test]
    fn cells_truncate_toward_zero_past_the_world_edge() {
        let world = World::new(UVec3::new(16, 16, 16), Arc::new(BlockRegistry::with_defaults()));
        let stone = world.registry().by_name("stone").unwrap();
        world.set_block(0, 0, 8, Some(stone.as_ref()));

        // x = -0.5 lies in cell 0, not -1.
        let mut player = Player::new(Vec3::new(-0.5, 3.0, 8.5));
        player.pitch = FRAC_PI_2;
        assert_eq!(hover_coords(&player, &world), Some(IVec3::new(0, 0, 8)));
    }

    #[test]
    fn reach_ends_after_one_hundred_steps() {
        let world = World::new(UVec3::new(16, 32, 16), Arc::new(BlockRegistry::with_defaults()));
        let stone = world.registry().by_name("stone").unwrap();
        world.set_block(8, 0, 8, Some(stone.as_ref()));

        let looking_down_from = |eye_y: f32| {
            let mut player = Player::new(Vec3::new(8.5, eye_y - EYE_HEIGHT, 8.5));
            player.pitch = FRAC_PI_2;
            player
        };
        // The last sample sits 19.8 below the eye.
        assert_eq!(
            hover_coords(&looking_down_from(20.5), &world),
            Some(IVec3::new(8, 0, 8))
        );
        assert_eq!(hover_coords(&looking_down_from(21.5), &world), None);
        assert_eq!(hover_coords(&looking_down_from(25.0), &world), None);
    }

    #[test]
    fn never_places_inside_the_player() {
        let world = World::new(UVec3::new(16, 16, 16), Arc::new(BlockRegistry::with_defaults()));
        let stone = world.registry().by_name("stone").unwrap();
        world.set_block(8, 0, 8, Some(stone.as_ref()));

        let mut player = Player::new(Vec3::new(8.5, 1.0, 8.5));
        player.pitch = FRAC_PI_2;
        assert_eq!(place_block(&player, &world, stone.as_ref()), None);
        assert!(world.get_block(8, 1, 8).is_none());
    }
}
