//! Data-driven game balance
//!
//! Every number the simulation depends on lives here so a host can ship an
//! alternative balance as JSON. Missing fields fall back to the reference
//! values, so a tuning file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading tuning or stage data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("stage data contains no stages")]
    NoStages,
}

/// Player movement and collision response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Horizontal acceleration per tick while a direction is held
    pub accel: f32,
    /// Horizontal speed cap before tier/suffocation scaling
    pub max_speed: f32,
    /// Velocity multiplier applied every tick near the ground
    pub ground_friction: f32,
    /// Velocity multiplier applied every tick in the air
    pub air_friction: f32,
    /// Feet below this line count as "near the ground" for friction
    pub near_ground_y: f32,
    pub gravity: f32,
    pub min_vy: f32,
    pub max_vy: f32,
    pub jump_velocity: f32,
    pub extra_jump_velocity: f32,
    /// Speed scale while suffocating
    pub suffocation_speed_scale: f32,
    /// Speed multiplier per speed tier (index = tier)
    pub speed_tiers: [f32; 4],
    /// Vertical slack when classifying a landing or a head bump
    pub collision_tolerance: f32,
    /// Horizontal velocity kept after a side collision
    pub side_damping: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            accel: 1.65,
            max_speed: 5.0,
            ground_friction: 0.84,
            air_friction: 0.90,
            near_ground_y: 390.0,
            gravity: 0.85,
            min_vy: -30.0,
            max_vy: 20.0,
            jump_velocity: -15.8,
            extra_jump_velocity: -15.0,
            suffocation_speed_scale: 0.72,
            speed_tiers: [1.00, 1.10, 1.20, 1.30],
            collision_tolerance: 8.0,
            side_damping: 0.2,
        }
    }
}

impl MovementTuning {
    /// Speed multiplier for a tier, saturating at the highest defined tier
    pub fn speed_multiplier(&self, tier: u8) -> f32 {
        let idx = (tier as usize).min(self.speed_tiers.len() - 1);
        self.speed_tiers[idx]
    }
}

/// Hazard damage, invulnerability and orb motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    pub spike_damage: f32,
    pub orb_damage: f32,
    /// Extra damage per stage index, both kinds
    pub damage_per_stage: f32,
    pub hit_invuln_ms: f32,
    pub shield_invuln_ms: f32,
    pub knockback_vx: f32,
    pub knockback_vy: f32,
    /// Orb phase advance in radians per millisecond at stage 0
    pub orb_phase_rate: f32,
    /// Orb phase speed-up per stage index
    pub orb_speed_per_stage: f32,
    pub orb_amplitude: f32,
    pub orb_amplitude_per_stage: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            spike_damage: 18.0,
            orb_damage: 12.0,
            damage_per_stage: 3.0,
            hit_invuln_ms: 650.0,
            shield_invuln_ms: 450.0,
            knockback_vx: 5.0,
            knockback_vy: -6.0,
            orb_phase_rate: 0.0042,
            orb_speed_per_stage: 0.18,
            orb_amplitude: 16.0,
            orb_amplitude_per_stage: 5.0,
        }
    }
}

impl HazardTuning {
    pub fn spike_damage_at(&self, stage: usize) -> f32 {
        self.spike_damage + stage as f32 * self.damage_per_stage
    }

    pub fn orb_damage_at(&self, stage: usize) -> f32 {
        self.orb_damage + stage as f32 * self.damage_per_stage
    }

    pub fn orb_phase_rate_at(&self, stage: usize) -> f32 {
        self.orb_phase_rate * (1.0 + stage as f32 * self.orb_speed_per_stage)
    }

    pub fn orb_amplitude_at(&self, stage: usize) -> f32 {
        self.orb_amplitude + stage as f32 * self.orb_amplitude_per_stage
    }
}

/// Health/oxygen pools and suffocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceTuning {
    pub base_max_health: f32,
    pub base_max_oxygen: f32,
    /// Oxygen lost per second
    pub oxygen_decay_per_sec: f32,
    /// Oxygen at or below this counts as suffocating
    pub suffocation_threshold: f32,
    /// Suffocation time before each chip of damage
    pub suffocation_period_ms: f32,
    pub suffocation_damage: f32,
    pub periodic_oxygen_ms: f32,
    pub periodic_oxygen_amount: f32,
    pub periodic_oxygen_score: u64,
}

impl Default for ResourceTuning {
    fn default() -> Self {
        Self {
            base_max_health: 100.0,
            base_max_oxygen: 50.0,
            oxygen_decay_per_sec: 2.0,
            suffocation_threshold: 0.01,
            suffocation_period_ms: 1000.0,
            suffocation_damage: 1.0,
            periodic_oxygen_ms: 3000.0,
            periodic_oxygen_amount: 5.0,
            periodic_oxygen_score: 10,
        }
    }
}

/// Seed, plot and oxygen-reward timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantingTuning {
    pub plant_cooldown_ms: f32,
    pub water_cooldown_ms: f32,
    /// Minimum grow time before a plot accepts water
    pub grow_gate_ms: f32,
    /// Hold time next to a watered plot before it yields oxygen
    pub hold_gate_ms: f32,
    pub oxygen_grant: f32,
    /// Proximity rect inflation (x, y) for planting
    pub plant_reach: [f32; 2],
    pub water_reach: [f32; 2],
    pub hold_reach: [f32; 2],
    pub seed_score: u64,
    pub seed_score_per_stage: u64,
    pub plant_score: u64,
    pub plant_score_per_stage: u64,
    pub instant_oxygen_score: u64,
    pub hold_score: u64,
}

impl Default for PlantingTuning {
    fn default() -> Self {
        Self {
            plant_cooldown_ms: 1000.0,
            water_cooldown_ms: 1000.0,
            grow_gate_ms: 800.0,
            hold_gate_ms: 900.0,
            oxygen_grant: 10.0,
            plant_reach: [14.0, 28.0],
            water_reach: [18.0, 36.0],
            hold_reach: [22.0, 48.0],
            seed_score: 120,
            seed_score_per_stage: 25,
            plant_score: 260,
            plant_score_per_stage: 35,
            instant_oxygen_score: 80,
            hold_score: 60,
        }
    }
}

impl PlantingTuning {
    pub fn seed_score_at(&self, stage: usize) -> u64 {
        self.seed_score + stage as u64 * self.seed_score_per_stage
    }

    pub fn plant_score_at(&self, stage: usize) -> u64 {
        self.plant_score + stage as u64 * self.plant_score_per_stage
    }
}

/// Rarity weights, in catalog order common/rare/epic/legendary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    pub common: f32,
    pub rare: f32,
    pub epic: f32,
    pub legendary: f32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 0.60,
            rare: 0.27,
            epic: 0.08,
            legendary: 0.05,
        }
    }
}

impl RarityWeights {
    pub fn total(&self) -> f32 {
        self.common + self.rare + self.epic + self.legendary
    }
}

/// Card pick phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTuning {
    pub weights: RarityWeights,
    /// Options offered per pick
    pub options: usize,
    /// Weighted rolls before falling back to a priority scan
    pub roll_attempts: u32,
    /// Countdown before a random option is chosen automatically
    pub pick_ms: f32,
    /// Max health bonus per hp tier (index = tier)
    pub hp_tier_bonus: [f32; 3],
}

impl Default for CardTuning {
    fn default() -> Self {
        Self {
            weights: RarityWeights::default(),
            options: 3,
            roll_attempts: 80,
            pick_ms: 5000.0,
            hp_tier_bonus: [0.0, 15.0, 30.0],
        }
    }
}

impl CardTuning {
    pub fn hp_bonus(&self, tier: u8) -> f32 {
        let idx = (tier as usize).min(self.hp_tier_bonus.len() - 1);
        self.hp_tier_bonus[idx]
    }
}

/// Frame clock, transitions and dialogue pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTuning {
    /// Largest step a single tick may simulate
    pub max_step_ms: f32,
    /// Loading pause between stages
    pub loading_ms: f32,
    /// Reveal time per character used to schedule dialogue auto-advance
    pub reveal_ms_per_char: f32,
    pub auto_advance_ms: f32,
    /// Auto-advance delay after a reveal is cut short
    pub auto_after_skip_ms: f32,
    /// Camera leads the player by this fraction of the viewport
    pub camera_lead: f32,
    pub viewport_width: f32,
}

impl Default for FlowTuning {
    fn default() -> Self {
        Self {
            max_step_ms: 32.0,
            loading_ms: 1100.0,
            reveal_ms_per_char: 18.0,
            auto_advance_ms: 520.0,
            auto_after_skip_ms: 420.0,
            camera_lead: 0.35,
            viewport_width: 960.0,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementTuning,
    pub hazards: HazardTuning,
    pub resources: ResourceTuning,
    pub planting: PlantingTuning,
    pub cards: CardTuning,
    pub flow: FlowTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("flow.max_step_ms", self.flow.max_step_ms),
            ("flow.viewport_width", self.flow.viewport_width),
            ("resources.base_max_health", self.resources.base_max_health),
            ("resources.base_max_oxygen", self.resources.base_max_oxygen),
            (
                "resources.suffocation_period_ms",
                self.resources.suffocation_period_ms,
            ),
            ("resources.periodic_oxygen_ms", self.resources.periodic_oxygen_ms),
            ("cards.pick_ms", self.cards.pick_ms),
            ("planting.hold_gate_ms", self.planting.hold_gate_ms),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }

        let total = self.cards.weights.total();
        if (total - 1.0).abs() > 1e-3 {
            return Err(TuningError::Invalid {
                field: "cards.weights",
                reason: format!("rarity weights must sum to 1, got {total}"),
            });
        }

        if self.cards.options == 0 {
            return Err(TuningError::Invalid {
                field: "cards.options",
                reason: "at least one option must be offered".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "planting": { "grow_gate_ms": 500.0 } }"#).unwrap();
        assert_eq!(tuning.planting.grow_gate_ms, 500.0);
        assert_eq!(tuning.planting.plant_cooldown_ms, 1000.0);
        assert_eq!(tuning.movement, MovementTuning::default());
    }

    #[test]
    fn test_dumped_tuning_loads_back() {
        let mut tuning = Tuning::default();
        tuning.flow.loading_ms = 750.0;
        let loaded = Tuning::from_json(&tuning.to_json().unwrap()).unwrap();
        assert_eq!(loaded.flow.loading_ms, 750.0);
        assert_eq!(loaded.planting.grow_gate_ms, tuning.planting.grow_gate_ms);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let err = Tuning::from_json(r#"{ "cards": { "weights": { "common": 0.9 } } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "cards.weights",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_step() {
        let err = Tuning::from_json(r#"{ "flow": { "max_step_ms": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_tier_lookups() {
        let tuning = Tuning::default();
        assert_eq!(tuning.movement.speed_multiplier(0), 1.0);
        assert_eq!(tuning.movement.speed_multiplier(3), 1.3);
        assert_eq!(tuning.movement.speed_multiplier(9), 1.3);
        assert_eq!(tuning.cards.hp_bonus(1), 15.0);
        assert_eq!(tuning.cards.hp_bonus(2), 30.0);
        assert_eq!(tuning.hazards.spike_damage_at(2), 24.0);
        assert_eq!(tuning.hazards.orb_damage_at(0), 12.0);
    }
}
