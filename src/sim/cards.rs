//! Upgrade cards
//!
//! A static catalog of cards, the run-level [`Deck`] that tracks what the
//! player owns, and the rarity-weighted roll that builds each pick.
//!
//! Card effects are a closed sum type; [`CardEffect::apply`] and
//! [`CardEffect::is_superseded`] are total over it, so adding an effect forces
//! both the stacking rule and the eligibility rule to be written.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::HazardKind;
use crate::tuning::{CardTuning, RarityWeights};

/// Card rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Weighted-roll order
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Scan order when the rolled rarity has nothing left to offer
    pub const FALLBACK_ORDER: [Rarity; 4] = [
        Rarity::Legendary,
        Rarity::Epic,
        Rarity::Rare,
        Rarity::Common,
    ];

    pub fn weight(&self, weights: &RarityWeights) -> f32 {
        match self {
            Rarity::Common => weights.common,
            Rarity::Rare => weights.rare,
            Rarity::Epic => weights.epic,
            Rarity::Legendary => weights.legendary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Catalog identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardId {
    #[serde(rename = "hp_15")]
    Hp15,
    #[serde(rename = "shield_poison")]
    ShieldPoison,
    #[serde(rename = "shield_spike")]
    ShieldSpike,
    #[serde(rename = "o2_plus3")]
    O2Plus3,
    #[serde(rename = "speed_10")]
    Speed10,
    #[serde(rename = "heal_fast")]
    HealFast,
    #[serde(rename = "hp_30")]
    Hp30,
    #[serde(rename = "speed_20")]
    Speed20,
    #[serde(rename = "o2_plus6")]
    O2Plus6,
    #[serde(rename = "instant_o2")]
    InstantO2,
    #[serde(rename = "spike_remove")]
    SpikeRemove,
    #[serde(rename = "poison_remove")]
    PoisonRemove,
    #[serde(rename = "o2_generator")]
    O2Generator,
    #[serde(rename = "speed_30")]
    Speed30,
    #[serde(rename = "double_jump")]
    DoubleJump,
}

/// One-shot world effects triggered by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    ClearSpikes,
    ClearOrbs,
}

impl Ability {
    /// Hazard kind removed by this ability
    pub fn target(&self) -> HazardKind {
        match self {
            Ability::ClearSpikes => HazardKind::Spike,
            Ability::ClearOrbs => HazardKind::Orb,
        }
    }
}

/// What owning a card does
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardEffect {
    /// Max health tier
    HpTier(u8),
    /// Movement speed tier
    SpeedTier(u8),
    /// Extra oxygen per plant reward
    OxygenBonus(f32),
    /// Shorter hold time next to watered plots
    HealHold(f32),
    /// Watering grants the plot's oxygen immediately
    InstantOxygen,
    /// Oxygen trickle on a fixed cycle
    PeriodicOxygen,
    DoubleJump,
    /// Absorbs one hit from a hazard kind
    Shield(HazardKind),
    /// Equips a player-triggered ability
    Ability(Ability),
}

impl CardEffect {
    /// Fold this effect into the upgrade state. Stacking is idempotent:
    /// tiers and bonuses keep the best value, flags only turn on.
    pub fn apply(&self, id: CardId, upgrades: &mut UpgradeState) {
        match *self {
            CardEffect::HpTier(tier) => upgrades.hp_tier = upgrades.hp_tier.max(tier),
            CardEffect::SpeedTier(tier) => upgrades.speed_tier = upgrades.speed_tier.max(tier),
            CardEffect::OxygenBonus(value) => {
                upgrades.oxygen_bonus = upgrades.oxygen_bonus.max(value)
            }
            CardEffect::HealHold(ms) => upgrades.heal_hold_ms = upgrades.heal_hold_ms.min(ms),
            CardEffect::InstantOxygen => upgrades.instant_oxygen = true,
            CardEffect::PeriodicOxygen => upgrades.periodic_oxygen = true,
            CardEffect::DoubleJump => upgrades.double_jump = true,
            CardEffect::Shield(kind) => *upgrades.shields.get_mut(kind) += 1,
            CardEffect::Ability(_) => upgrades.equipped = Some(id),
        }
    }

    /// Whether the current upgrades already make this effect pointless
    pub fn is_superseded(&self, upgrades: &UpgradeState) -> bool {
        match *self {
            CardEffect::HpTier(tier) => upgrades.hp_tier >= tier,
            CardEffect::SpeedTier(tier) => upgrades.speed_tier >= tier,
            CardEffect::OxygenBonus(value) => upgrades.oxygen_bonus >= value,
            CardEffect::Ability(_) => upgrades.equipped.is_some(),
            CardEffect::HealHold(_)
            | CardEffect::InstantOxygen
            | CardEffect::PeriodicOxygen
            | CardEffect::DoubleJump
            | CardEffect::Shield(_) => false,
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardDef {
    pub id: CardId,
    pub rarity: Rarity,
    pub name: &'static str,
    pub description: &'static str,
    pub effect: CardEffect,
    /// Card that must be owned before this one is offered
    pub requires: Option<CardId>,
    /// Consumed on first use, never replenished
    pub one_time: bool,
}

const fn card(
    id: CardId,
    rarity: Rarity,
    name: &'static str,
    description: &'static str,
    effect: CardEffect,
) -> CardDef {
    CardDef {
        id,
        rarity,
        name,
        description,
        effect,
        requires: None,
        one_time: false,
    }
}

const fn upgrade_of(def: CardDef, requires: CardId) -> CardDef {
    CardDef {
        requires: Some(requires),
        ..def
    }
}

const fn one_time(def: CardDef) -> CardDef {
    CardDef {
        one_time: true,
        ..def
    }
}

/// Every card in the game
pub static CATALOG: [CardDef; 15] = [
    card(
        CardId::Hp15,
        Rarity::Common,
        "Reinforced Frame",
        "Max health +15",
        CardEffect::HpTier(1),
    ),
    one_time(card(
        CardId::ShieldPoison,
        Rarity::Common,
        "Toxin Shield",
        "Blocks one poison orb hit (single use)",
        CardEffect::Shield(HazardKind::Orb),
    )),
    one_time(card(
        CardId::ShieldSpike,
        Rarity::Common,
        "Spike Guard",
        "Blocks one spike hit (single use)",
        CardEffect::Shield(HazardKind::Spike),
    )),
    card(
        CardId::O2Plus3,
        Rarity::Common,
        "Oxygen Feed",
        "Plant oxygen reward +3",
        CardEffect::OxygenBonus(3.0),
    ),
    card(
        CardId::Speed10,
        Rarity::Common,
        "Quick Step",
        "Move speed +10%",
        CardEffect::SpeedTier(1),
    ),
    card(
        CardId::HealFast,
        Rarity::Common,
        "Accelerant",
        "Plant hold time drops to 0.5s",
        CardEffect::HealHold(500.0),
    ),
    upgrade_of(
        card(
            CardId::Hp30,
            Rarity::Rare,
            "Reinforced Frame+",
            "Max health +30 (upgrade)",
            CardEffect::HpTier(2),
        ),
        CardId::Hp15,
    ),
    upgrade_of(
        card(
            CardId::Speed20,
            Rarity::Rare,
            "Quicker Step",
            "Move speed +20% (upgrade)",
            CardEffect::SpeedTier(2),
        ),
        CardId::Speed10,
    ),
    upgrade_of(
        card(
            CardId::O2Plus6,
            Rarity::Rare,
            "Oxygen Feed+",
            "Plant oxygen reward +6 (upgrade)",
            CardEffect::OxygenBonus(6.0),
        ),
        CardId::O2Plus3,
    ),
    card(
        CardId::InstantO2,
        Rarity::Epic,
        "Super Accelerant",
        "Watering grants oxygen immediately",
        CardEffect::InstantOxygen,
    ),
    one_time(card(
        CardId::SpikeRemove,
        Rarity::Epic,
        "Spike Sweeper",
        "Activate: remove every spike (single use)",
        CardEffect::Ability(Ability::ClearSpikes),
    )),
    one_time(card(
        CardId::PoisonRemove,
        Rarity::Epic,
        "Toxin Scrubber",
        "Activate: remove every poison orb (single use)",
        CardEffect::Ability(Ability::ClearOrbs),
    )),
    card(
        CardId::O2Generator,
        Rarity::Epic,
        "Oxygen Generator",
        "Oxygen +5 every 3 seconds",
        CardEffect::PeriodicOxygen,
    ),
    upgrade_of(
        card(
            CardId::Speed30,
            Rarity::Epic,
            "Quickest Step",
            "Move speed +30% (upgrade)",
            CardEffect::SpeedTier(3),
        ),
        CardId::Speed20,
    ),
    card(
        CardId::DoubleJump,
        Rarity::Legendary,
        "Double Jump!",
        "One extra jump in mid-air",
        CardEffect::DoubleJump,
    ),
];

/// Look up a catalog entry
pub fn card_def(id: CardId) -> Option<&'static CardDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Remaining shield charges per hazard kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shields {
    pub spike: u32,
    pub orb: u32,
}

impl Shields {
    pub fn get(&self, kind: HazardKind) -> u32 {
        match kind {
            HazardKind::Spike => self.spike,
            HazardKind::Orb => self.orb,
        }
    }

    pub fn get_mut(&mut self, kind: HazardKind) -> &mut u32 {
        match kind {
            HazardKind::Spike => &mut self.spike,
            HazardKind::Orb => &mut self.orb,
        }
    }
}

/// Aggregate effect of every owned card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeState {
    pub hp_tier: u8,
    pub speed_tier: u8,
    pub oxygen_bonus: f32,
    /// Hold time next to a watered plot before it yields oxygen
    pub heal_hold_ms: f32,
    pub instant_oxygen: bool,
    pub periodic_oxygen: bool,
    /// Progress through the current periodic-oxygen cycle
    pub periodic_timer_ms: f32,
    pub double_jump: bool,
    pub shields: Shields,
    /// The single activatable card slot
    pub equipped: Option<CardId>,
}

impl UpgradeState {
    pub fn new(heal_hold_ms: f32) -> Self {
        Self {
            hp_tier: 0,
            speed_tier: 0,
            oxygen_bonus: 0.0,
            heal_hold_ms,
            instant_oxygen: false,
            periodic_oxygen: false,
            periodic_timer_ms: 0.0,
            double_jump: false,
            shields: Shields::default(),
            equipped: None,
        }
    }
}

/// An owned card instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCard {
    pub id: CardId,
    /// 1 for an unused one-time card, 0 otherwise
    pub uses_left: u8,
}

/// Cards owned during a run plus their aggregated upgrades
#[derive(Debug, Clone)]
pub struct Deck {
    owned: BTreeMap<CardId, OwnedCard>,
    picked: BTreeSet<CardId>,
    spent: BTreeSet<CardId>,
    pub upgrades: UpgradeState,
    default_hold_ms: f32,
}

impl Deck {
    pub fn new(default_hold_ms: f32) -> Self {
        Self {
            owned: BTreeMap::new(),
            picked: BTreeSet::new(),
            spent: BTreeSet::new(),
            upgrades: UpgradeState::new(default_hold_ms),
            default_hold_ms,
        }
    }

    /// Forget every card (full game restart)
    pub fn reset(&mut self) {
        *self = Self::new(self.default_hold_ms);
    }

    pub fn owns(&self, id: CardId) -> bool {
        self.owned.contains_key(&id)
    }

    pub fn is_spent(&self, id: CardId) -> bool {
        self.spent.contains(&id)
    }

    /// Owned cards in catalog order
    pub fn owned(&self) -> impl Iterator<Item = &OwnedCard> {
        self.owned.values()
    }

    pub fn is_eligible(&self, def: &CardDef) -> bool {
        if self.picked.contains(&def.id) || self.owned.contains_key(&def.id) {
            return false;
        }
        if def.one_time && self.spent.contains(&def.id) {
            return false;
        }
        if def.requires.is_some_and(|required| !self.owned.contains_key(&required)) {
            return false;
        }
        !def.effect.is_superseded(&self.upgrades)
    }

    fn eligible_of(&self, rarity: Rarity, exclude: &[CardId]) -> Vec<&'static CardDef> {
        CATALOG
            .iter()
            .filter(|def| def.rarity == rarity && !exclude.contains(&def.id))
            .filter(|def| self.is_eligible(def))
            .collect()
    }

    /// Uniform draw from the rolled rarity, else the first non-empty rarity
    /// in [`Rarity::FALLBACK_ORDER`]
    fn draw<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        rarity: Rarity,
        exclude: &[CardId],
    ) -> Option<CardId> {
        std::iter::once(rarity)
            .chain(Rarity::FALLBACK_ORDER)
            .map(|r| self.eligible_of(r, exclude))
            .find(|pool| !pool.is_empty())
            .map(|pool| pool[rng.random_range(0..pool.len())].id)
    }

    /// Build the options for a card pick. Options are unique and may number
    /// fewer than requested (or zero) once the catalog runs dry.
    pub fn roll_options<R: Rng + ?Sized>(&self, rng: &mut R, tuning: &CardTuning) -> Vec<CardId> {
        let mut options = Vec::with_capacity(tuning.options);

        let mut attempts = 0;
        while options.len() < tuning.options && attempts < tuning.roll_attempts {
            attempts += 1;
            let rarity = roll_rarity(rng, &tuning.weights);
            match self.draw(rng, rarity, &options) {
                Some(id) => options.push(id),
                None => break,
            }
        }

        while options.len() < tuning.options {
            let Some(id) = self.draw(rng, Rarity::Legendary, &options) else {
                break;
            };
            options.push(id);
        }

        options
    }

    /// Take ownership of a card and apply its effect. Unknown ids are inert.
    pub fn add(&mut self, id: CardId) -> Option<&'static CardDef> {
        let Some(def) = card_def(id) else {
            log::warn!("Ignoring card {:?} with no catalog entry", id);
            return None;
        };
        self.picked.insert(id);
        self.owned.insert(
            id,
            OwnedCard {
                id,
                uses_left: u8::from(def.one_time),
            },
        );
        def.effect.apply(id, &mut self.upgrades);
        Some(def)
    }

    fn spend(&mut self, id: CardId) {
        if let Some(card) = self.owned.get_mut(&id) {
            if card.uses_left > 0 {
                card.uses_left = 0;
                self.spent.insert(id);
            }
        }
    }

    /// Use a shield charge against `kind`, if one is left
    pub fn consume_shield(&mut self, kind: HazardKind) -> bool {
        let charges = self.upgrades.shields.get_mut(kind);
        if *charges == 0 {
            return false;
        }
        *charges -= 1;

        let backing = self
            .owned
            .values()
            .filter_map(|card| card_def(card.id).map(|def| (card, def)))
            .find(|(card, def)| card.uses_left > 0 && def.effect == CardEffect::Shield(kind))
            .map(|(card, _)| card.id);
        if let Some(id) = backing {
            self.spend(id);
        }
        true
    }

    /// Fire the equipped ability once. The slot stays occupied afterwards.
    pub fn activate(&mut self) -> Option<Ability> {
        let id = self.upgrades.equipped?;
        let uses_left = self.owned.get(&id)?.uses_left;
        if uses_left == 0 || self.spent.contains(&id) {
            return None;
        }
        let CardEffect::Ability(ability) = card_def(id)?.effect else {
            return None;
        };
        self.spend(id);
        Some(ability)
    }
}

/// Weighted draw over [`Rarity::ALL`]
pub fn roll_rarity<R: Rng + ?Sized>(rng: &mut R, weights: &RarityWeights) -> Rarity {
    let roll: f32 = rng.random::<f32>() * weights.total();
    let mut acc = 0.0;
    for rarity in Rarity::ALL {
        acc += rarity.weight(weights);
        if roll < acc {
            return rarity;
        }
    }
    Rarity::Common
}
