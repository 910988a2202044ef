//! Player kinematics and platform collision
//!
//! Velocities are in pixels per tick: the frame clock is clamped upstream,
//! so integration does not scale by the frame delta.

use super::state::{Facing, Platform, Player};
use crate::tuning::MovementTuning;

/// Movement part of the tick input
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    /// Edge-triggered
    pub jump: bool,
}

/// Apply input, friction, gravity and integrate position.
///
/// Returns the player's y before integration, used to classify collisions.
pub fn integrate(
    player: &mut Player,
    intent: MoveIntent,
    tuning: &MovementTuning,
    speed_tier: u8,
    suffocating: bool,
    stage_length: f32,
) -> f32 {
    if intent.left {
        player.facing = Facing::Left;
    }
    if intent.right {
        player.facing = Facing::Right;
    }

    let suffocation_scale = if suffocating {
        tuning.suffocation_speed_scale
    } else {
        1.0
    };
    let accel = tuning.accel * suffocation_scale;
    let max_speed = tuning.max_speed * tuning.speed_multiplier(speed_tier) * suffocation_scale;

    if intent.left {
        player.vel.x -= accel;
    }
    if intent.right {
        player.vel.x += accel;
    }

    let near_ground = player.rect().bottom() > tuning.near_ground_y;
    player.vel.x *= if near_ground {
        tuning.ground_friction
    } else {
        tuning.air_friction
    };
    player.vel.x = player.vel.x.clamp(-max_speed, max_speed);

    if intent.jump {
        if player.grounded {
            player.vel.y = tuning.jump_velocity;
            player.grounded = false;
            player.extra_jump_used = false;
        } else if player.jumps_max >= 2 && !player.extra_jump_used {
            player.vel.y = tuning.extra_jump_velocity;
            player.extra_jump_used = true;
        }
    }

    player.vel.y = (player.vel.y + tuning.gravity).clamp(tuning.min_vy, tuning.max_vy);

    let prev_y = player.pos.y;
    player.pos += player.vel;
    let max_x = (stage_length - player.rect().w).max(0.0);
    player.pos.x = player.pos.x.clamp(0.0, max_x);

    prev_y
}

/// Push the player out of every overlapping platform.
///
/// Each overlap is classified against the pre-motion vertical extent: a
/// falling player that started above the top lands, a rising player that
/// started below the bottom bumps its head, anything else is a side hit.
pub fn resolve_platforms(
    player: &mut Player,
    prev_y: f32,
    platforms: &[Platform],
    tuning: &MovementTuning,
) {
    player.grounded = false;
    let height = player.rect().h;
    let width = player.rect().w;
    let tolerance = tuning.collision_tolerance;

    for platform in platforms {
        let rect = platform.rect;
        if !player.rect().overlaps(&rect) {
            continue;
        }

        if prev_y + height <= rect.y + tolerance && player.vel.y >= 0.0 {
            player.pos.y = rect.y - height;
            player.vel.y = 0.0;
            player.grounded = true;
            player.extra_jump_used = false;
        } else if prev_y >= rect.bottom() - tolerance && player.vel.y < 0.0 {
            player.pos.y = rect.bottom();
            player.vel.y = 0.0;
        } else {
            if player.vel.x > 0.0 {
                player.pos.x = rect.x - width;
            } else if player.vel.x < 0.0 {
                player.pos.x = rect.right();
            }
            player.vel.x *= tuning.side_damping;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::rect::Rect;
    use crate::sim::state::PlatformKind;
    use crate::tuning::ResourceTuning;
    use glam::Vec2;

    fn ground() -> Platform {
        Platform {
            rect: Rect::new(0.0, GROUND_Y, 2000.0, GROUND_DEPTH),
            kind: PlatformKind::Ground,
        }
    }

    fn player_at(x: f32, y: f32) -> Player {
        let mut player = Player::new(&ResourceTuning::default());
        player.pos = Vec2::new(x, y);
        player
    }

    fn step(player: &mut Player, intent: MoveIntent, platforms: &[Platform]) {
        let tuning = MovementTuning::default();
        let prev_y = integrate(player, intent, &tuning, 0, false, 2000.0);
        resolve_platforms(player, prev_y, platforms, &tuning);
    }

    #[test]
    fn test_falls_and_lands_on_ground() {
        let mut player = player_at(100.0, 300.0);
        for _ in 0..60 {
            step(&mut player, MoveIntent::default(), &[ground()]);
        }
        assert!(player.grounded);
        assert_eq!(player.pos.y, GROUND_Y - PLAYER_HEIGHT);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_grounded_recomputed_each_tick() {
        let mut player = player_at(100.0, GROUND_Y - PLAYER_HEIGHT);
        step(&mut player, MoveIntent::default(), &[ground()]);
        assert!(player.grounded);
        // same position, no platforms: nothing re-grounds the player
        step(&mut player, MoveIntent::default(), &[]);
        assert!(!player.grounded);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let tuning = MovementTuning::default();
        let mut player = player_at(100.0, GROUND_Y - PLAYER_HEIGHT);
        step(&mut player, MoveIntent::default(), &[ground()]);

        let jump = MoveIntent {
            jump: true,
            ..Default::default()
        };
        step(&mut player, jump, &[ground()]);
        assert_eq!(player.vel.y, tuning.jump_velocity + tuning.gravity);
        assert!(!player.grounded);

        // airborne without double jump: ignored
        let vy = player.vel.y;
        step(&mut player, jump, &[ground()]);
        assert_eq!(player.vel.y, vy + tuning.gravity);
    }

    #[test]
    fn test_double_jump_once_per_flight() {
        let tuning = MovementTuning::default();
        let mut player = player_at(100.0, 100.0);
        player.jumps_max = 2;
        let jump = MoveIntent {
            jump: true,
            ..Default::default()
        };
        step(&mut player, jump, &[]);
        assert!(player.extra_jump_used);
        assert_eq!(player.vel.y, tuning.extra_jump_velocity + tuning.gravity);

        let vy = player.vel.y;
        step(&mut player, jump, &[]);
        assert_eq!(player.vel.y, vy + tuning.gravity);
    }

    #[test]
    fn test_speed_clamped_by_tier_and_suffocation() {
        let tuning = MovementTuning::default();
        let right = MoveIntent {
            right: true,
            ..Default::default()
        };
        let mut player = player_at(100.0, 100.0);
        for _ in 0..30 {
            integrate(&mut player, right, &tuning, 3, false, 5000.0);
        }
        assert!((player.vel.x - 5.0 * 1.3).abs() < 1e-4);
        assert_eq!(player.facing, Facing::Right);

        let mut player = player_at(100.0, 100.0);
        for _ in 0..30 {
            integrate(&mut player, right, &tuning, 0, true, 5000.0);
        }
        assert!(player.vel.x <= 5.0 * 0.72 + 1e-4);
    }

    #[test]
    fn test_horizontal_bounds() {
        let tuning = MovementTuning::default();
        let left = MoveIntent {
            left: true,
            ..Default::default()
        };
        let mut player = player_at(1.0, 100.0);
        integrate(&mut player, left, &tuning, 0, false, 1000.0);
        assert_eq!(player.pos.x, 0.0);
        assert_eq!(player.facing, Facing::Left);

        let mut player = player_at(995.0, 100.0);
        player.vel.x = 5.0;
        integrate(&mut player, MoveIntent::default(), &tuning, 0, false, 1000.0);
        assert_eq!(player.pos.x, 1000.0 - PLAYER_WIDTH);
    }

    #[test]
    fn test_head_bump() {
        let ceiling = Platform {
            rect: Rect::new(0.0, 100.0, 400.0, 20.0),
            kind: PlatformKind::Elevated,
        };
        let mut player = player_at(100.0, 125.0);
        player.vel.y = -10.0;
        step(&mut player, MoveIntent::default(), &[ceiling]);
        assert_eq!(player.pos.y, 120.0);
        assert_eq!(player.vel.y, 0.0);
        assert!(!player.grounded);
    }

    #[test]
    fn test_side_collision_pushes_out_and_damps() {
        let wall = Platform {
            rect: Rect::new(200.0, 200.0, 100.0, 200.0),
            kind: PlatformKind::Elevated,
        };
        let mut player = player_at(158.0, 250.0);
        player.vel.x = 4.0;
        let tuning = MovementTuning::default();
        let prev_y = player.pos.y;
        player.pos.x += player.vel.x;
        resolve_platforms(&mut player, prev_y, &[wall], &tuning);
        assert_eq!(player.pos.x, 200.0 - PLAYER_WIDTH);
        assert!((player.vel.x - 0.8).abs() < 1e-6);
    }
}
