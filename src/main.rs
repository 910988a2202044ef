//! Plant Back Earth entry point
//!
//! In the browser this drives the simulation from `requestAnimationFrame` and
//! hands a JSON snapshot to the page's canvas renderer. Natively it runs a
//! headless scripted session, which is handy for balance checks.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use plant_back_earth::sim::{Game, GameEvent, Phase, TickInput, tick};

    // The page owns drawing and the DOM HUD; it exposes `window.plantBackEarth`.
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            const host = window.plantBackEarth;
            if (host && host.render) host.render(JSON.parse(json));
        }

        export function show_hint(text) {
            const host = window.plantBackEarth;
            if (host && host.hint) host.hint(text);
        }
    ")]
    extern "C" {
        fn render_frame(json: &str);
        fn show_hint(text: &str);
    }

    struct Session {
        game: Game,
        input: TickInput,
        last_time: f64,
    }

    impl Session {
        fn new(seed: u64) -> Self {
            Self {
                game: Game::new(seed),
                input: TickInput::default(),
                last_time: 0.0,
            }
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                0.0
            };
            self.last_time = time;

            tick(&mut self.game, &self.input, dt);
            self.clear_pressed();

            for event in self.game.drain_events() {
                if let Some(text) = hint_for(&event) {
                    show_hint(&text);
                }
            }

            match self.game.snapshot().to_json() {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Snapshot encode failed: {e}"),
            }
        }

        /// Edge-triggered actions last exactly one tick
        fn clear_pressed(&mut self) {
            let held = (self.input.left, self.input.right);
            self.input = TickInput::default();
            (self.input.left, self.input.right) = held;
        }

        fn key_down(&mut self, code: &str) {
            let in_dialogue = matches!(self.game.phase, Phase::Dialogue { .. });
            match code {
                "ArrowLeft" | "KeyA" => self.input.left = true,
                "ArrowRight" | "KeyD" => self.input.right = true,
                "Space" if in_dialogue => self.input.advance_dialogue = true,
                "Space" | "ArrowUp" | "KeyW" => self.input.jump = true,
                "Enter" => self.input.advance_dialogue = true,
                "Escape" => self.input.skip_dialogue = true,
                "ShiftLeft" | "ShiftRight" => self.input.toggle_auto = true,
                "KeyE" => self.input.plant = true,
                "KeyF" => self.input.water = true,
                "KeyQ" => self.input.restart = true,
                "KeyR" => self.input.activate = true,
                "Digit1" => self.input.choose_card = Some(0),
                "Digit2" => self.input.choose_card = Some(1),
                "Digit3" => self.input.choose_card = Some(2),
                _ => {}
            }
        }

        fn key_up(&mut self, code: &str) {
            match code {
                "ArrowLeft" | "KeyA" => self.input.left = false,
                "ArrowRight" | "KeyD" => self.input.right = false,
                _ => {}
            }
        }
    }

    fn hint_for(event: &GameEvent) -> Option<String> {
        let text = match event {
            GameEvent::SeedCollected => "Seed collected! Press E at a planting spot".to_string(),
            GameEvent::Planted => "Planted! Now water it with F.".to_string(),
            GameEvent::NoSeeds => "Not enough seeds.".to_string(),
            GameEvent::Watered => {
                "Watered! Stay next to the plant for a moment to get O2.".to_string()
            }
            GameEvent::OxygenGranted { amount, instant } => {
                if *instant {
                    format!("Instant O2 +{amount}!")
                } else {
                    format!("O2 +{amount} (plant)")
                }
            }
            GameEvent::ShieldUsed { kind } => format!("Shield blocked a {kind:?} hit!"),
            GameEvent::AbilityUsed { ability, removed } => {
                format!("{ability:?} used, {removed} hazards removed")
            }
            GameEvent::AbilityReady { .. } => "Ability card equipped: press R to use".to_string(),
            GameEvent::Suffocating => "O2 is empty. Recover oxygen with plants!".to_string(),
            GameEvent::CardChosen { .. } => {
                "Arrows move, Space jumps, E plants, F waters, Q restarts, R uses a card".to_string()
            }
            GameEvent::PeriodicOxygen { .. }
            | GameEvent::HazardHit { .. }
            | GameEvent::StageCleared { .. }
            | GameEvent::StageFailed { .. }
            | GameEvent::RunComplete { .. } => return None,
        };
        Some(text)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        let seed = js_sys::Date::now() as u64;
        let session = Rc::new(RefCell::new(Session::new(seed)));
        log::info!("Plant Back Earth starting with seed {seed}");

        let Some(window) = web_sys::window() else {
            log::error!("No window, cannot start");
            return;
        };
        setup_keyboard(&window, session.clone());
        request_animation_frame(session);
    }

    fn setup_keyboard(window: &web_sys::Window, session: Rc<RefCell<Session>>) {
        {
            let session = session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                if matches!(event.code().as_str(), "Space" | "ArrowUp" | "ArrowDown") {
                    event.prevent_default();
                }
                session.borrow_mut().key_down(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let session = session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                session.borrow_mut().key_up(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Releasing focus drops held directions so the robot doesn't run away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut s = session.borrow_mut();
                s.input.left = false;
                s.input.right = false;
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(session: Rc<RefCell<Session>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            session.borrow_mut().frame(time);
            request_animation_frame(session);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless session: `plant-back-earth [seed] [frames] [tuning.json] [stages.json]`
#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use plant_back_earth::sim::{Game, Phase, TickInput, builtin_stages, stages_from_json, tick};
    use plant_back_earth::tuning::Tuning;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(1);
    let frames = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(3600);
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };
    let stages = match args.next() {
        Some(path) => stages_from_json(&std::fs::read_to_string(path)?)?,
        None => builtin_stages(),
    };
    log::debug!("Effective tuning:\n{}", tuning.to_json()?);

    let mut game = Game::with_tuning(seed, tuning, stages)?;
    log::info!(
        "Headless run: seed {}, {frames} frames, {} stages",
        game.seed,
        game.stages.len()
    );

    for frame in 0..frames {
        let input = match game.phase {
            Phase::Dialogue { .. } => TickInput {
                skip_dialogue: true,
                ..Default::default()
            },
            Phase::CardPick { .. } => TickInput {
                choose_card: Some(0),
                ..Default::default()
            },
            Phase::Loading { .. } | Phase::ActivePlay => TickInput {
                right: true,
                jump: frame % 40 == 0,
                plant: frame % 10 == 0,
                water: frame % 10 == 5,
                ..Default::default()
            },
        };
        tick(&mut game, &input, 16.0);
        for event in game.drain_events() {
            log::info!("frame {frame}: {event:?}");
        }
    }

    let snapshot = game.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot.hud)?);
    Ok(())
}
