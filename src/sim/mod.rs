//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame deltas clamped to the maximum step
//! - Seeded RNG only
//! - Stable iteration order (stage lists, catalog order for cards)
//! - No rendering or platform dependencies

pub mod cards;
pub mod dialogue;
pub mod hazard;
pub mod kinematics;
pub mod level;
pub mod oxygen;
pub mod planting;
pub mod rect;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use cards::{Ability, CATALOG, CardDef, CardEffect, CardId, Deck, Rarity, UpgradeState};
pub use dialogue::{DialogueCursor, DialogueLine, Speaker};
pub use level::{StageDescriptor, builtin_stages, stages_from_json};
pub use rect::Rect;
pub use snapshot::{Overlay, Snapshot};
pub use state::{
    Facing, GameEvent, Hazard, HazardKind, Platform, PlatformKind, Player, Plot, PlotPhase, Seed,
    Stage,
};
pub use tick::{AfterDialogue, Game, Phase, StageStart, TickInput, tick};
