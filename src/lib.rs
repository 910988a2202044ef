//! Plant Back Earth - a side-scrolling planting platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, hazards, oxygen, planting, cards, stage flow)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, DOM HUD, asset loading and raw input capture live in the host
//! (`main.rs`); the core only consumes a [`sim::TickInput`] and produces a
//! [`sim::Snapshot`] every frame.

pub mod sim;
pub mod tuning;

pub use sim::{Game, Snapshot, TickInput, tick};
pub use tuning::{Tuning, TuningError};

/// Fixed geometry shared by stage building and the simulation
pub mod consts {
    /// Top of the ground slab (screen space, y grows downward)
    pub const GROUND_Y: f32 = 440.0;
    /// Ground slab depth
    pub const GROUND_DEPTH: f32 = 120.0;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    /// Spawn point at the start of every stage attempt
    pub const PLAYER_SPAWN_X: f32 = 120.0;
    pub const PLAYER_SPAWN_Y: f32 = 250.0;

    /// Spikes sit on the ground line
    pub const SPIKE_WIDTH: f32 = 46.0;
    pub const SPIKE_HEIGHT: f32 = 18.0;
    pub const ORB_SIZE: f32 = 34.0;

    pub const SEED_SIZE: f32 = 24.0;
    /// Seeds float this far above the surface under them
    pub const SEED_LIFT: f32 = 35.0;

    pub const PLOT_WIDTH: f32 = 28.0;
    pub const PLOT_HEIGHT: f32 = 18.0;
    /// Horizontal distance from a seed to the plot it feeds
    pub const PLOT_OFFSET_X: f32 = 90.0;
}
