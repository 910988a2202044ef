//! Simulation entity types
//!
//! The player persists for the whole run; everything else belongs to a
//! [`Stage`] that is rebuilt wholesale whenever a stage starts or restarts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::{Ability, CardId, UpgradeState};
use super::rect::Rect;
use crate::consts::*;
use crate::tuning::{CardTuning, ResourceTuning};

/// Which way the player sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player robot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the hitbox
    pub pos: Vec2,
    /// Velocity in pixels per tick
    pub vel: Vec2,
    pub facing: Facing,
    /// Set only by a landing resolved this tick
    pub grounded: bool,
    pub extra_jump_used: bool,
    /// 1 normally, 2 with the double-jump card
    pub jumps_max: u8,

    pub health: f32,
    pub base_max_health: f32,
    pub max_health_bonus: f32,
    pub oxygen: f32,
    pub base_max_oxygen: f32,
    pub max_oxygen_bonus: f32,

    /// Seeds carried, not yet planted
    pub seeds: u32,
    /// Plots planted this stage attempt
    pub planted: u32,
    pub score: u64,

    pub invuln_ms: f32,
    pub plant_cooldown_ms: f32,
    pub water_cooldown_ms: f32,
    /// Time spent suffocating since the last chip of damage
    pub suffocating_ms: f32,
    /// Oxygen was empty on the last breath
    pub suffocating: bool,
}

impl Player {
    pub fn new(resources: &ResourceTuning) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            facing: Facing::Right,
            grounded: false,
            extra_jump_used: false,
            jumps_max: 1,
            health: resources.base_max_health,
            base_max_health: resources.base_max_health,
            max_health_bonus: 0.0,
            oxygen: resources.base_max_oxygen,
            base_max_oxygen: resources.base_max_oxygen,
            max_oxygen_bonus: 0.0,
            seeds: 0,
            planted: 0,
            score: 0,
            invuln_ms: 0.0,
            plant_cooldown_ms: 0.0,
            water_cooldown_ms: 0.0,
            suffocating_ms: 0.0,
            suffocating: false,
        };
        player.reset_for_stage();
        player
    }

    pub fn size() -> Vec2 {
        Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, Self::size())
    }

    pub fn max_health(&self) -> f32 {
        self.base_max_health + self.max_health_bonus
    }

    pub fn max_oxygen(&self) -> f32 {
        self.base_max_oxygen + self.max_oxygen_bonus
    }

    /// Set health, clamped to `[0, max_health]`
    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health());
    }

    /// Set oxygen, clamped to `[0, max_oxygen]`
    pub fn set_oxygen(&mut self, oxygen: f32) {
        self.oxygen = oxygen.clamp(0.0, self.max_oxygen());
    }

    pub fn damage(&mut self, amount: f32) {
        self.set_health(self.health - amount);
    }

    pub fn add_oxygen(&mut self, amount: f32) {
        self.set_oxygen(self.oxygen + amount);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Mirror the upgrades that change the player's own limits. Pools are
    /// clamped to the new maximums but never topped up.
    pub fn apply_upgrades(&mut self, upgrades: &UpgradeState, cards: &CardTuning) {
        self.max_health_bonus = cards.hp_bonus(upgrades.hp_tier);
        self.jumps_max = if upgrades.double_jump { 2 } else { 1 };
        self.set_health(self.health);
        self.set_oxygen(self.oxygen);
    }

    /// Respawn with full pools; score and upgrades are kept
    pub fn reset_for_stage(&mut self) {
        self.pos = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.extra_jump_used = false;

        self.health = self.max_health();
        self.oxygen = self.max_oxygen();
        self.seeds = 0;
        self.planted = 0;

        self.invuln_ms = 0.0;
        self.plant_cooldown_ms = 0.0;
        self.water_cooldown_ms = 0.0;
        self.suffocating_ms = 0.0;
        self.suffocating = false;
    }
}

/// Platform surface type (visual only, collision is identical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    Ground,
    Elevated,
}

/// A solid box the player can stand on or bump into
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

/// Hazard types; shields and removal abilities target one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    /// Static ground spike
    Spike,
    /// Oscillating poison orb
    Orb,
}

/// A damaging box
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub rect: Rect,
    /// Resting y for orbs
    pub base_y: f32,
    /// Orb oscillation phase in radians
    pub phase: f32,
}

impl Hazard {
    pub fn spike(x: f32) -> Self {
        Self {
            kind: HazardKind::Spike,
            rect: Rect::new(x, GROUND_Y - SPIKE_HEIGHT, SPIKE_WIDTH, SPIKE_HEIGHT),
            base_y: GROUND_Y - SPIKE_HEIGHT,
            phase: 0.0,
        }
    }

    pub fn orb(x: f32, base_y: f32) -> Self {
        Self {
            kind: HazardKind::Orb,
            rect: Rect::new(x, base_y, ORB_SIZE, ORB_SIZE),
            base_y,
            phase: 0.0,
        }
    }
}

/// A one-shot seed pickup
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Seed {
    pub rect: Rect,
    pub taken: bool,
}

/// Visible progression of a plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotPhase {
    Empty,
    /// Planted, grow gate not yet satisfied
    Growing,
    /// Planted and ready for water
    Thirsty,
    /// Watered, waiting for the player to hold nearby
    Watered,
    /// Oxygen granted
    Complete,
}

/// A planting site
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plot {
    pub rect: Rect,
    pub planted: bool,
    pub watered: bool,
    pub oxygen_given: bool,
    /// Continuous proximity time after watering
    pub hold_ms: f32,
    /// Grow time since planting (stops once watered)
    pub grow_ms: f32,
}

impl Plot {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            planted: false,
            watered: false,
            oxygen_given: false,
            hold_ms: 0.0,
            grow_ms: 0.0,
        }
    }

    pub fn phase(&self, grow_gate_ms: f32) -> PlotPhase {
        match (self.planted, self.watered, self.oxygen_given) {
            (false, _, _) => PlotPhase::Empty,
            (true, false, _) if self.grow_ms < grow_gate_ms => PlotPhase::Growing,
            (true, false, _) => PlotPhase::Thirsty,
            (true, true, false) => PlotPhase::Watered,
            (true, true, true) => PlotPhase::Complete,
        }
    }
}

/// Background palette (RGB triples), passed through to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Palette {
    pub sky_top: [u8; 3],
    pub sky_bottom: [u8; 3],
    pub haze: [u8; 3],
}

/// Mutable per-stage world, rebuilt from a descriptor on every (re)start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub index: usize,
    pub name: String,
    pub length: f32,
    pub palette: Palette,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub seeds: Vec<Seed>,
    pub plots: Vec<Plot>,
    /// Horizontal camera offset
    pub cam_x: f32,
}

impl Stage {
    /// Placeholder world shown before the first stage is built
    pub fn empty() -> Self {
        Self {
            index: 0,
            name: String::new(),
            length: 0.0,
            palette: Palette::default(),
            platforms: Vec::new(),
            hazards: Vec::new(),
            seeds: Vec::new(),
            plots: Vec::new(),
            cam_x: 0.0,
        }
    }

    pub fn total_plots(&self) -> usize {
        self.plots.len()
    }

    /// Remove every hazard of one kind, returning how many were removed
    pub fn clear_hazards(&mut self, kind: HazardKind) -> usize {
        let before = self.hazards.len();
        self.hazards.retain(|h| h.kind != kind);
        before - self.hazards.len()
    }
}

/// Things that happened during a tick, drained by the host for hints/audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum GameEvent {
    SeedCollected,
    Planted,
    /// Plant pressed next to an empty plot without seeds
    NoSeeds,
    Watered,
    OxygenGranted { amount: f32, instant: bool },
    PeriodicOxygen { amount: f32 },
    ShieldUsed { kind: HazardKind },
    HazardHit { kind: HazardKind, damage: f32 },
    AbilityUsed { ability: Ability, removed: usize },
    /// An activatable card is equipped and ready
    AbilityReady { card: CardId },
    CardChosen { card: CardId, auto: bool },
    Suffocating,
    StageCleared { stage: usize },
    StageFailed { stage: usize },
    RunComplete { score: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_clamps_pools() {
        let mut player = Player::new(&ResourceTuning::default());
        player.damage(250.0);
        assert_eq!(player.health, 0.0);
        assert!(player.is_dead());

        player.add_oxygen(1000.0);
        assert_eq!(player.oxygen, player.max_oxygen());
        player.set_oxygen(-5.0);
        assert_eq!(player.oxygen, 0.0);
    }

    #[test]
    fn test_reset_for_stage_keeps_score() {
        let mut player = Player::new(&ResourceTuning::default());
        player.score = 900;
        player.seeds = 2;
        player.max_health_bonus = 15.0;
        player.health = 3.0;
        player.reset_for_stage();
        assert_eq!(player.score, 900);
        assert_eq!(player.seeds, 0);
        assert_eq!(player.health, 115.0);
        assert_eq!(player.pos, Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y));
    }

    #[test]
    fn test_apply_upgrades_raises_cap_only() {
        let mut player = Player::new(&ResourceTuning::default());
        let mut upgrades = UpgradeState::new(900.0);
        upgrades.hp_tier = 2;
        upgrades.double_jump = true;
        player.apply_upgrades(&upgrades, &CardTuning::default());
        assert_eq!(player.max_health(), 130.0);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.jumps_max, 2);

        player.apply_upgrades(&UpgradeState::new(900.0), &CardTuning::default());
        assert_eq!(player.max_health(), 100.0);
        assert_eq!(player.jumps_max, 1);
    }

    #[test]
    fn test_plot_phases() {
        let mut plot = Plot::new(Rect::new(0.0, 0.0, PLOT_WIDTH, PLOT_HEIGHT));
        assert_eq!(plot.phase(800.0), PlotPhase::Empty);
        plot.planted = true;
        assert_eq!(plot.phase(800.0), PlotPhase::Growing);
        plot.grow_ms = 800.0;
        assert_eq!(plot.phase(800.0), PlotPhase::Thirsty);
        plot.watered = true;
        assert_eq!(plot.phase(800.0), PlotPhase::Watered);
        plot.oxygen_given = true;
        assert_eq!(plot.phase(800.0), PlotPhase::Complete);
    }

    #[test]
    fn test_clear_hazards() {
        let mut stage = Stage::empty();
        stage.hazards = vec![Hazard::spike(10.0), Hazard::orb(50.0, 200.0), Hazard::spike(90.0)];
        assert_eq!(stage.clear_hazards(HazardKind::Spike), 2);
        assert_eq!(stage.hazards.len(), 1);
        assert_eq!(stage.hazards[0].kind, HazardKind::Orb);
    }
}
