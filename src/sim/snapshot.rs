//! Read-only view of the game for the renderer and HUD

use serde::Serialize;

use super::cards::{CardId, Rarity, Shields, card_def};
use super::dialogue::Speaker;
use super::rect::Rect;
use super::state::{Facing, HazardKind, Palette, Platform, PlotPhase};
use super::tick::{Game, Phase};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub rect: Rect,
    pub facing: Facing,
    /// Blink while hits are ignored
    pub invulnerable: bool,
    pub grounded: bool,
    pub suffocating: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HazardView {
    pub kind: HazardKind,
    /// Current position, including orb oscillation
    pub rect: Rect,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotView {
    pub rect: Rect,
    pub phase: PlotPhase,
    /// 0..1 progress of the hold reward on a watered plot
    pub hold_progress: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    /// 1-based stage number
    pub stage: usize,
    pub stage_count: usize,
    pub stage_name: String,
    pub health: f32,
    pub max_health: f32,
    pub oxygen: f32,
    pub max_oxygen: f32,
    pub seeds: u32,
    pub planted: u32,
    pub total_plots: usize,
    pub score: u64,
    pub shields: Shields,
    pub equipped: Option<CardId>,
    pub ability_ready: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
}

impl CardView {
    fn of(id: CardId) -> Option<Self> {
        card_def(id).map(|def| Self {
            id,
            name: def.name,
            description: def.description,
            rarity: def.rarity,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnedCardView {
    pub card: CardView,
    pub one_time: bool,
    /// One-time card already used up
    pub spent: bool,
}

/// Modal layer drawn over the world
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Overlay {
    None,
    Dialogue {
        speaker: Speaker,
        name: &'static str,
        role: &'static str,
        /// Revealed part of the line
        text: String,
        line: usize,
        lines: usize,
        revealing: bool,
        auto: bool,
    },
    Loading {
        quote: &'static str,
    },
    CardPick {
        options: Vec<CardView>,
        seconds_left: f32,
    },
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// RNG seed of the run, for replaying it
    pub seed: u64,
    pub time_ms: f64,
    pub cam_x: f32,
    pub stage_length: f32,
    pub palette: Palette,
    pub player: PlayerView,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<HazardView>,
    /// Seeds still waiting to be picked up
    pub seeds: Vec<Rect>,
    pub plots: Vec<PlotView>,
    pub hud: Hud,
    pub overlay: Overlay,
    pub owned_cards: Vec<OwnedCardView>,
}

impl Snapshot {
    pub fn capture(game: &Game) -> Self {
        let stage = &game.stage;
        let player = &game.player;
        let upgrades = &game.deck.upgrades;
        let planting = &game.tuning.planting;

        let plots = stage
            .plots
            .iter()
            .map(|plot| PlotView {
                rect: plot.rect,
                phase: plot.phase(planting.grow_gate_ms),
                hold_progress: (plot.hold_ms / upgrades.heal_hold_ms).clamp(0.0, 1.0),
            })
            .collect();

        let ability_ready = upgrades
            .equipped
            .is_some_and(|id| game.deck.owns(id) && !game.deck.is_spent(id));

        let overlay = match &game.phase {
            Phase::ActivePlay => Overlay::None,
            Phase::Dialogue { cursor, .. } => match cursor.current() {
                Some(line) => Overlay::Dialogue {
                    speaker: line.speaker,
                    name: line.speaker.name(),
                    role: line.speaker.role(),
                    text: cursor.visible_text().to_string(),
                    line: cursor.index(),
                    lines: cursor.len(),
                    revealing: cursor.is_revealing(),
                    auto: cursor.is_auto(),
                },
                None => Overlay::None,
            },
            Phase::Loading { quote, .. } => Overlay::Loading { quote: *quote },
            Phase::CardPick {
                options,
                remaining_ms,
            } => Overlay::CardPick {
                options: options.iter().filter_map(|&id| CardView::of(id)).collect(),
                seconds_left: (remaining_ms / 1000.0).max(0.0),
            },
        };

        let owned_cards = game
            .deck
            .owned()
            .filter_map(|owned| {
                let def = card_def(owned.id)?;
                Some(OwnedCardView {
                    card: CardView::of(owned.id)?,
                    one_time: def.one_time,
                    spent: game.deck.is_spent(owned.id),
                })
            })
            .collect();

        Self {
            seed: game.seed,
            time_ms: game.time_ms,
            cam_x: stage.cam_x,
            stage_length: stage.length,
            palette: stage.palette,
            player: PlayerView {
                rect: player.rect(),
                facing: player.facing,
                invulnerable: player.invuln_ms > 0.0,
                grounded: player.grounded,
                suffocating: player.oxygen <= game.tuning.resources.suffocation_threshold,
            },
            platforms: stage.platforms.clone(),
            hazards: stage
                .hazards
                .iter()
                .map(|h| HazardView {
                    kind: h.kind,
                    rect: h.rect,
                })
                .collect(),
            seeds: stage
                .seeds
                .iter()
                .filter(|s| !s.taken)
                .map(|s| s.rect)
                .collect(),
            plots,
            hud: Hud {
                stage: stage.index + 1,
                stage_count: game.stages.len(),
                stage_name: stage.name.clone(),
                health: player.health,
                max_health: player.max_health(),
                oxygen: player.oxygen,
                max_oxygen: player.max_oxygen(),
                seeds: player.seeds,
                planted: player.planted,
                total_plots: stage.total_plots(),
                score: player.score,
                shields: upgrades.shields,
                equipped: upgrades.equipped,
                ability_ready,
            },
            overlay,
            owned_cards,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Game {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::{TickInput, tick};

    #[test]
    fn test_boot_snapshot_shows_dialogue() {
        let game = Game::new(1);
        let snap = game.snapshot();
        match &snap.overlay {
            Overlay::Dialogue {
                speaker,
                text,
                line,
                ..
            } => {
                assert_eq!(*speaker, Speaker::Lab01);
                assert_eq!(text, "C");
                assert_eq!(*line, 0);
            }
            other => panic!("expected dialogue, got {other:?}"),
        }
        assert!(snap.to_json().is_ok());
    }

    #[test]
    fn test_active_snapshot_lists_world() {
        let mut game = Game::new(3);
        game.start_stage(0, false);
        game.deck.add(CardId::ShieldSpike);
        tick(&mut game, &TickInput::default(), 16.0);

        let snap = game.snapshot();
        assert!(matches!(snap.overlay, Overlay::None));
        assert_eq!(snap.seed, 3);
        assert_eq!(snap.hud.stage, 1);
        assert_eq!(snap.hud.total_plots, 7);
        assert_eq!(snap.seeds.len(), 7);
        assert_eq!(snap.plots.len(), 7);
        assert!(snap.plots.iter().all(|p| p.phase == PlotPhase::Empty));
        assert_eq!(snap.platforms.len(), 12);
        assert_eq!(snap.hud.shields.spike, 1);
        assert_eq!(snap.owned_cards.len(), 1);
        assert!(snap.owned_cards[0].one_time);
        assert!(!snap.owned_cards[0].spent);

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"shield_spike\""));
    }
}
