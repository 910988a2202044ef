//! Hazard motion and contact damage

use super::cards::Deck;
use super::state::{GameEvent, Hazard, HazardKind, Player};
use crate::tuning::HazardTuning;

/// Advance orb oscillation. Spikes never move.
pub fn animate(hazards: &mut [Hazard], stage: usize, dt_ms: f32, tuning: &HazardTuning) {
    let rate = tuning.orb_phase_rate_at(stage);
    let amplitude = tuning.orb_amplitude_at(stage);
    for hazard in hazards.iter_mut().filter(|h| h.kind == HazardKind::Orb) {
        hazard.phase += dt_ms * rate;
        hazard.rect.y = hazard.base_y + hazard.phase.sin() * amplitude;
    }
}

/// Resolve player contact with every hazard.
///
/// Invulnerability is checked per hazard, so the first contact of a tick
/// shields the player from the rest.
pub fn collide(
    player: &mut Player,
    hazards: &[Hazard],
    deck: &mut Deck,
    stage: usize,
    tuning: &HazardTuning,
    events: &mut Vec<GameEvent>,
) {
    for hazard in hazards {
        if player.invuln_ms > 0.0 || !player.rect().overlaps(&hazard.rect) {
            continue;
        }

        if deck.consume_shield(hazard.kind) {
            log::debug!("Shield absorbed {:?} hit", hazard.kind);
            player.invuln_ms = tuning.shield_invuln_ms;
            events.push(GameEvent::ShieldUsed { kind: hazard.kind });
            continue;
        }

        let damage = match hazard.kind {
            HazardKind::Spike => tuning.spike_damage_at(stage),
            HazardKind::Orb => tuning.orb_damage_at(stage),
        };
        player.damage(damage);
        player.invuln_ms = tuning.hit_invuln_ms;
        player.vel.x += if player.pos.x < hazard.rect.x {
            -tuning.knockback_vx
        } else {
            tuning.knockback_vx
        };
        player.vel.y = tuning.knockback_vy;
        log::debug!(
            "{:?} hit for {damage}, health {}",
            hazard.kind,
            player.health
        );
        events.push(GameEvent::HazardHit {
            kind: hazard.kind,
            damage,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cards::CardId;
    use crate::tuning::ResourceTuning;
    use glam::Vec2;

    fn player_on(hazard: &Hazard) -> Player {
        let mut player = Player::new(&ResourceTuning::default());
        player.pos = Vec2::new(hazard.rect.x + 10.0, hazard.rect.y - 20.0);
        player
    }

    #[test]
    fn test_orb_oscillates_around_base() {
        let tuning = HazardTuning::default();
        let mut hazards = vec![Hazard::orb(100.0, 200.0), Hazard::spike(300.0)];
        let spike_y = hazards[1].rect.y;
        let amplitude = tuning.orb_amplitude_at(2);
        for _ in 0..200 {
            animate(&mut hazards, 2, 16.0, &tuning);
            assert!((hazards[0].rect.y - 200.0).abs() <= amplitude + 1e-3);
        }
        assert!(hazards[0].phase > 0.0);
        assert_eq!(hazards[1].rect.y, spike_y);
    }

    #[test]
    fn test_hit_damages_and_knocks_back() {
        let tuning = HazardTuning::default();
        let hazards = [Hazard::spike(200.0)];
        let mut player = player_on(&hazards[0]);
        let mut deck = Deck::new(900.0);
        let mut events = Vec::new();

        collide(&mut player, &hazards, &mut deck, 1, &tuning, &mut events);
        assert_eq!(player.health, 100.0 - 21.0);
        assert_eq!(player.invuln_ms, 650.0);
        assert_eq!(player.vel, Vec2::new(5.0, -6.0));
        assert_eq!(
            events,
            vec![GameEvent::HazardHit {
                kind: HazardKind::Spike,
                damage: 21.0
            }]
        );
    }

    #[test]
    fn test_invulnerability_blocks_damage() {
        let tuning = HazardTuning::default();
        let hazards = [Hazard::orb(200.0, 300.0)];
        let mut player = player_on(&hazards[0]);
        player.invuln_ms = 10.0;
        let mut deck = Deck::new(900.0);
        deck.add(CardId::ShieldPoison);
        let mut events = Vec::new();

        collide(&mut player, &hazards, &mut deck, 0, &tuning, &mut events);
        assert_eq!(player.health, 100.0);
        assert_eq!(deck.upgrades.shields.orb, 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_shield_absorbs_one_hit() {
        let tuning = HazardTuning::default();
        let hazards = [Hazard::orb(200.0, 300.0)];
        let mut player = player_on(&hazards[0]);
        let mut deck = Deck::new(900.0);
        deck.add(CardId::ShieldPoison);
        let mut events = Vec::new();

        collide(&mut player, &hazards, &mut deck, 0, &tuning, &mut events);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.invuln_ms, 450.0);
        assert!(deck.is_spent(CardId::ShieldPoison));

        player.invuln_ms = 0.0;
        collide(&mut player, &hazards, &mut deck, 0, &tuning, &mut events);
        assert_eq!(player.health, 88.0);
        assert_eq!(events.len(), 2);
    }
}
