//! Per-frame simulation tick
//!
//! The host calls [`tick`] once per frame. A single [`Phase`] decides what
//! the frame does: dialogue, the loading pause and the card pick freeze the
//! world, and only [`Phase::ActivePlay`] runs physics, hazards, oxygen and
//! planting.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::cards::{CardEffect, CardId, Deck};
use super::dialogue::{self, DialogueCursor};
use super::kinematics::{self, MoveIntent};
use super::level::{StageDescriptor, builtin_stages};
use super::state::{GameEvent, Player, Stage};
use super::{hazard, oxygen, planting};
use crate::tuning::{Tuning, TuningError};

/// Input commands for a single tick
///
/// Direction flags are held state; everything else is edge-triggered and
/// should be set for exactly one tick per key press.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub plant: bool,
    pub water: bool,
    /// Restart the current stage without a card pick
    pub restart: bool,
    /// Fire the equipped ability card
    pub activate: bool,
    /// Card pick slot chosen this tick
    pub choose_card: Option<usize>,
    pub advance_dialogue: bool,
    pub skip_dialogue: bool,
    pub toggle_auto: bool,
}

/// Where a finished dialogue leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterDialogue {
    /// Reset the run and play the briefing
    Intro,
    /// Load stage 1
    FirstStage,
    /// Load the next stage
    NextStage,
    /// Reload the current stage without a card pick
    Retry,
    /// Report the final score
    Finale,
}

/// A stage waiting behind the loading pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStart {
    pub index: usize,
    pub card_pick: bool,
}

/// Simulation phase
#[derive(Debug, Clone)]
pub enum Phase {
    Dialogue {
        cursor: DialogueCursor,
        then: AfterDialogue,
    },
    Loading {
        remaining_ms: f32,
        quote: &'static str,
        next: StageStart,
    },
    CardPick {
        options: Vec<CardId>,
        remaining_ms: f32,
    },
    ActivePlay,
}

/// Complete game state: one run of the campaign
#[derive(Debug, Clone)]
pub struct Game {
    pub tuning: Tuning,
    pub stages: Vec<StageDescriptor>,
    pub stage: Stage,
    pub player: Player,
    pub deck: Deck,
    pub rng: Pcg32,
    pub seed: u64,
    pub phase: Phase,
    /// Events since the last [`Game::drain_events`]
    pub events: Vec<GameEvent>,
    /// Simulated time, including frozen phases
    pub time_ms: f64,
}

impl Game {
    /// New game with the reference balance and the built-in campaign,
    /// starting at the boot dialogue
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default(), builtin_stages())
    }

    /// New game with host-supplied balance and stages
    pub fn with_tuning(
        seed: u64,
        tuning: Tuning,
        stages: Vec<StageDescriptor>,
    ) -> Result<Self, TuningError> {
        tuning.validate()?;
        if stages.is_empty() {
            return Err(TuningError::NoStages);
        }
        Ok(Self::build(seed, tuning, stages))
    }

    fn build(seed: u64, tuning: Tuning, stages: Vec<StageDescriptor>) -> Self {
        let player = Player::new(&tuning.resources);
        let deck = Deck::new(tuning.planting.hold_gate_ms);
        let phase = Phase::Dialogue {
            cursor: DialogueCursor::new(dialogue::boot(), &tuning.flow),
            then: AfterDialogue::Intro,
        };
        log::info!("New game with seed {seed}, {} stages", stages.len());
        Self {
            tuning,
            stages,
            stage: Stage::empty(),
            player,
            deck,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            phase,
            events: Vec::new(),
            time_ms: 0.0,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_final_stage(&self) -> bool {
        self.stage.index + 1 >= self.stages.len()
    }

    /// Clear every run-level upgrade and the score
    pub fn reset_run(&mut self) {
        self.deck.reset();
        self.player
            .apply_upgrades(&self.deck.upgrades, &self.tuning.cards);
        self.player.score = 0;
        log::info!("Run reset");
    }

    /// Rebuild a stage from its descriptor and respawn the player, then
    /// either open a card pick or go straight to play
    pub fn start_stage(&mut self, index: usize, card_pick: bool) {
        let index = index.min(self.stages.len().saturating_sub(1));
        let Some(descriptor) = self.stages.get(index) else {
            log::warn!("No stage data, staying in place");
            self.phase = Phase::ActivePlay;
            return;
        };
        self.stage = descriptor.build(index);
        self.player.reset_for_stage();
        self.update_camera();
        log::info!(
            "Starting {} ({} plots, card pick: {card_pick})",
            self.stage.name,
            self.stage.total_plots()
        );

        if !card_pick {
            self.phase = Phase::ActivePlay;
            return;
        }
        let options = self.deck.roll_options(&mut self.rng, &self.tuning.cards);
        if options.is_empty() {
            log::warn!("No eligible cards left, skipping card pick");
            self.phase = Phase::ActivePlay;
            return;
        }
        self.phase = Phase::CardPick {
            options,
            remaining_ms: self.tuning.cards.pick_ms,
        };
    }

    /// Take a card and enter play
    fn choose_card(&mut self, id: CardId, auto: bool) {
        if let Some(def) = self.deck.add(id) {
            log::info!("Picked {} ({})", def.name, def.rarity.as_str());
            if matches!(def.effect, CardEffect::Ability(_)) {
                self.events.push(GameEvent::AbilityReady { card: id });
            }
        }
        self.player
            .apply_upgrades(&self.deck.upgrades, &self.tuning.cards);
        self.events.push(GameEvent::CardChosen { card: id, auto });
        self.phase = Phase::ActivePlay;
    }

    fn open_dialogue(&mut self, lines: Vec<dialogue::DialogueLine>, then: AfterDialogue) {
        self.phase = Phase::Dialogue {
            cursor: DialogueCursor::new(lines, &self.tuning.flow),
            then,
        };
    }

    fn begin_loading(&mut self, next: StageStart) {
        let quote =
            dialogue::LOADING_QUOTES[self.rng.random_range(0..dialogue::LOADING_QUOTES.len())];
        self.phase = Phase::Loading {
            remaining_ms: self.tuning.flow.loading_ms,
            quote,
            next,
        };
    }

    fn finish_dialogue(&mut self, then: AfterDialogue) {
        match then {
            AfterDialogue::Intro => {
                self.reset_run();
                self.open_dialogue(dialogue::intro(), AfterDialogue::FirstStage);
            }
            AfterDialogue::FirstStage => self.begin_loading(StageStart {
                index: 0,
                card_pick: true,
            }),
            AfterDialogue::NextStage => self.begin_loading(StageStart {
                index: self.stage.index + 1,
                card_pick: true,
            }),
            AfterDialogue::Retry => self.begin_loading(StageStart {
                index: self.stage.index,
                card_pick: false,
            }),
            AfterDialogue::Finale => {
                let score = self.player.score;
                self.open_dialogue(dialogue::finale(score), AfterDialogue::Intro);
            }
        }
    }

    fn update_camera(&mut self) {
        let flow = &self.tuning.flow;
        let max_cam = (self.stage.length - flow.viewport_width).max(0.0);
        self.stage.cam_x =
            (self.player.pos.x - flow.viewport_width * flow.camera_lead).clamp(0.0, max_cam);
    }
}

/// Advance the game by one frame of `dt_ms` milliseconds (clamped to the
/// maximum step)
pub fn tick(game: &mut Game, input: &TickInput, dt_ms: f32) {
    let dt = if dt_ms.is_finite() {
        dt_ms.clamp(0.0, game.tuning.flow.max_step_ms)
    } else {
        0.0
    };
    game.time_ms += f64::from(dt);

    match &mut game.phase {
        Phase::Dialogue { cursor, then } => {
            if input.toggle_auto {
                cursor.toggle_auto();
            }
            if input.skip_dialogue {
                cursor.skip();
            } else if input.advance_dialogue {
                cursor.advance();
            }
            cursor.update(dt);
            if cursor.is_complete() {
                let then = *then;
                game.finish_dialogue(then);
            }
        }
        Phase::Loading {
            remaining_ms, next, ..
        } => {
            *remaining_ms -= dt;
            if *remaining_ms <= 0.0 {
                let next = *next;
                game.start_stage(next.index, next.card_pick);
            }
        }
        Phase::CardPick {
            options,
            remaining_ms,
        } => {
            *remaining_ms -= dt;
            let manual = input.choose_card.and_then(|slot| options.get(slot).copied());
            if let Some(id) = manual {
                game.choose_card(id, false);
            } else if *remaining_ms <= 0.0 {
                let id = options[game.rng.random_range(0..options.len())];
                log::info!("Card pick timed out");
                game.choose_card(id, true);
            }
        }
        Phase::ActivePlay => play(game, input, dt),
    }
}

/// One step of active play
fn play(game: &mut Game, input: &TickInput, dt: f32) {
    if input.restart {
        log::info!("Manual restart of {}", game.stage.name);
        game.begin_loading(StageStart {
            index: game.stage.index,
            card_pick: false,
        });
        return;
    }

    let Game {
        tuning,
        stage,
        player,
        deck,
        events,
        ..
    } = game;
    let stage_index = stage.index;

    if input.activate {
        if let Some(ability) = deck.activate() {
            let removed = stage.clear_hazards(ability.target());
            log::info!("{ability:?} removed {removed} hazards");
            events.push(GameEvent::AbilityUsed { ability, removed });
        }
    }

    // Resources
    oxygen::periodic(player, &mut deck.upgrades, dt, &tuning.resources, events);
    let suffocating = oxygen::breathe(player, dt, &tuning.resources, events);

    // Movement
    let intent = MoveIntent {
        left: input.left,
        right: input.right,
        jump: input.jump,
    };
    let prev_y = kinematics::integrate(
        player,
        intent,
        &tuning.movement,
        deck.upgrades.speed_tier,
        suffocating,
        stage.length,
    );
    kinematics::resolve_platforms(player, prev_y, &stage.platforms, &tuning.movement);

    // Seeds and plots
    planting::collect_seeds(player, &mut stage.seeds, stage_index, &tuning.planting, events);
    if input.plant {
        planting::plant(player, &mut stage.plots, stage_index, &tuning.planting, events);
    }
    if input.water {
        planting::water(
            player,
            &mut stage.plots,
            &deck.upgrades,
            &tuning.planting,
            events,
        );
    }

    player.invuln_ms = (player.invuln_ms - dt).max(0.0);
    planting::advance_timers(player, &mut stage.plots, dt);

    // Hazards
    hazard::animate(&mut stage.hazards, stage_index, dt, &tuning.hazards);
    hazard::collide(player, &stage.hazards, deck, stage_index, &tuning.hazards, events);

    if player.is_dead() {
        log::info!("Failed {}", stage.name);
        events.push(GameEvent::StageFailed { stage: stage_index });
        game.open_dialogue(dialogue::retry(), AfterDialogue::Retry);
        return;
    }

    game.update_camera();

    let Game {
        tuning,
        stage,
        player,
        deck,
        events,
        ..
    } = game;
    planting::hold(
        player,
        &mut stage.plots,
        &deck.upgrades,
        dt,
        &tuning.planting,
        events,
    );

    if player.planted as usize >= stage.total_plots() {
        log::info!("Cleared {} with score {}", stage.name, player.score);
        events.push(GameEvent::StageCleared { stage: stage_index });
        if game.is_final_stage() {
            let score = game.player.score;
            game.events.push(GameEvent::RunComplete { score });
            game.open_dialogue(dialogue::ending(), AfterDialogue::Finale);
        } else {
            let lines = dialogue::stage_clear(&game.stage.name);
            game.open_dialogue(lines, AfterDialogue::NextStage);
        }
    }
}
