//! Oxygen decay, suffocation and the periodic oxygen upgrade

use super::cards::UpgradeState;
use super::state::{GameEvent, Player};
use crate::tuning::ResourceTuning;

/// Run the oxygen generator cycle, if owned
pub fn periodic(
    player: &mut Player,
    upgrades: &mut UpgradeState,
    dt_ms: f32,
    tuning: &ResourceTuning,
    events: &mut Vec<GameEvent>,
) {
    if !upgrades.periodic_oxygen {
        return;
    }
    upgrades.periodic_timer_ms += dt_ms;
    if upgrades.periodic_timer_ms >= tuning.periodic_oxygen_ms {
        upgrades.periodic_timer_ms -= tuning.periodic_oxygen_ms;
        player.add_oxygen(tuning.periodic_oxygen_amount);
        player.score += tuning.periodic_oxygen_score;
        events.push(GameEvent::PeriodicOxygen {
            amount: tuning.periodic_oxygen_amount,
        });
    }
}

/// Drain oxygen and chip health while empty. Returns whether the player is
/// suffocating this tick.
pub fn breathe(
    player: &mut Player,
    dt_ms: f32,
    tuning: &ResourceTuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    player.set_oxygen(player.oxygen - tuning.oxygen_decay_per_sec * dt_ms / 1000.0);

    let suffocating = player.oxygen <= tuning.suffocation_threshold;
    let started = suffocating && !player.suffocating;
    player.suffocating = suffocating;
    if !suffocating {
        player.suffocating_ms = 0.0;
        return false;
    }

    if started {
        events.push(GameEvent::Suffocating);
    }
    player.suffocating_ms += dt_ms;
    if player.suffocating_ms > tuning.suffocation_period_ms {
        player.damage(tuning.suffocation_damage);
        player.suffocating_ms = 0.0;
        log::debug!("Suffocating, health {}", player.health);
    }
    true
}
