//! Seeds, plots and the oxygen they give back
//!
//! A plot moves through planted, watered and oxygen-given. Planting and
//! watering are edge-triggered actions with their own cooldowns; the oxygen
//! reward comes from standing next to a watered plot for the hold time.

use super::cards::UpgradeState;
use super::rect::Rect;
use super::state::{GameEvent, Player, Plot, Seed};
use crate::tuning::PlantingTuning;

fn reach(plot: &Plot, inset: [f32; 2]) -> Rect {
    plot.rect.inflate(inset[0], inset[1])
}

/// Pick up every seed the player touches
pub fn collect_seeds(
    player: &mut Player,
    seeds: &mut [Seed],
    stage: usize,
    tuning: &PlantingTuning,
    events: &mut Vec<GameEvent>,
) {
    let hitbox = player.rect();
    for seed in seeds.iter_mut().filter(|s| !s.taken) {
        if hitbox.overlaps(&seed.rect) {
            seed.taken = true;
            player.seeds += 1;
            player.score += tuning.seed_score_at(stage);
            events.push(GameEvent::SeedCollected);
        }
    }
}

/// Plant into the first empty plot in reach. Returns whether a seed was used.
pub fn plant(
    player: &mut Player,
    plots: &mut [Plot],
    stage: usize,
    tuning: &PlantingTuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    if player.plant_cooldown_ms > 0.0 {
        return false;
    }
    let hitbox = player.rect();
    let Some(plot) = plots
        .iter_mut()
        .find(|p| !p.planted && hitbox.overlaps(&reach(p, tuning.plant_reach)))
    else {
        return false;
    };

    if player.seeds == 0 {
        events.push(GameEvent::NoSeeds);
        return false;
    }

    plot.planted = true;
    plot.watered = false;
    plot.oxygen_given = false;
    plot.hold_ms = 0.0;
    plot.grow_ms = 0.0;

    player.seeds -= 1;
    player.planted += 1;
    player.score += tuning.plant_score_at(stage);
    player.plant_cooldown_ms = tuning.plant_cooldown_ms;
    events.push(GameEvent::Planted);
    true
}

/// Water the first grown plot in reach. Returns whether a plot was watered.
pub fn water(
    player: &mut Player,
    plots: &mut [Plot],
    upgrades: &UpgradeState,
    tuning: &PlantingTuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    if player.water_cooldown_ms > 0.0 {
        return false;
    }
    let hitbox = player.rect();
    let Some(plot) = plots.iter_mut().find(|p| {
        p.planted
            && !p.watered
            && p.grow_ms >= tuning.grow_gate_ms
            && hitbox.overlaps(&reach(p, tuning.water_reach))
    }) else {
        return false;
    };

    plot.watered = true;
    plot.hold_ms = 0.0;
    events.push(GameEvent::Watered);

    if upgrades.instant_oxygen && !plot.oxygen_given {
        let amount = tuning.oxygen_grant + upgrades.oxygen_bonus;
        player.add_oxygen(amount);
        player.score += tuning.instant_oxygen_score;
        plot.oxygen_given = true;
        events.push(GameEvent::OxygenGranted {
            amount,
            instant: true,
        });
    }
    player.water_cooldown_ms = tuning.water_cooldown_ms;
    true
}

/// Count down action cooldowns and grow planted, unwatered plots
pub fn advance_timers(player: &mut Player, plots: &mut [Plot], dt_ms: f32) {
    player.plant_cooldown_ms = (player.plant_cooldown_ms - dt_ms).max(0.0);
    player.water_cooldown_ms = (player.water_cooldown_ms - dt_ms).max(0.0);
    for plot in plots.iter_mut().filter(|p| p.planted && !p.watered) {
        plot.grow_ms += dt_ms;
    }
}

/// Accrue the hold timer on watered plots the player stands next to, and pay
/// out once it reaches the hold time. Leaving the reach resets the timer.
pub fn hold(
    player: &mut Player,
    plots: &mut [Plot],
    upgrades: &UpgradeState,
    dt_ms: f32,
    tuning: &PlantingTuning,
    events: &mut Vec<GameEvent>,
) {
    let hitbox = player.rect();
    for plot in plots.iter_mut().filter(|p| p.planted) {
        if !plot.watered {
            plot.hold_ms = 0.0;
            continue;
        }
        if plot.oxygen_given {
            continue;
        }

        if !hitbox.overlaps(&reach(plot, tuning.hold_reach)) {
            plot.hold_ms = 0.0;
            continue;
        }

        plot.hold_ms += dt_ms;
        if plot.hold_ms >= upgrades.heal_hold_ms {
            let amount = tuning.oxygen_grant + upgrades.oxygen_bonus;
            player.add_oxygen(amount);
            player.score += tuning.hold_score;
            plot.oxygen_given = true;
            plot.hold_ms = 0.0;
            log::debug!("Plot yielded {amount} oxygen");
            events.push(GameEvent::OxygenGranted {
                amount,
                instant: false,
            });
        }
    }
}
