//! Dialogue sequences
//!
//! A [`DialogueCursor`] walks an ordered list of lines. Text reveal and the
//! auto-advance delay are both driven from tick deltas, so nothing scheduled
//! against a cursor can outlive it: once the phase holding the cursor is
//! replaced, its pending wake-up is gone with it.

use serde::{Deserialize, Serialize};

use crate::tuning::FlowTuning;

/// Who is talking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The robot's pilot
    Operator,
    /// Upbeat lab researcher
    Lab01,
    /// Terse lab researcher
    Lab02,
}

impl Speaker {
    pub fn name(&self) -> &'static str {
        match self {
            Speaker::Operator => "Operator",
            Speaker::Lab01 => "Researcher 1",
            Speaker::Lab02 => "Researcher 2",
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Speaker::Operator => "OPERATOR",
            Speaker::Lab01 => "LAB-01",
            Speaker::Lab02 => "LAB-02",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: Speaker,
    pub text: String,
}

impl DialogueLine {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Resumable position in a dialogue sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueCursor {
    lines: Vec<DialogueLine>,
    index: usize,
    /// Time spent revealing the current line
    reveal_ms: f32,
    revealing: bool,
    auto: bool,
    /// Pending auto-advance, counted down by `update`
    wake_ms: Option<f32>,
    ms_per_char: f32,
    auto_advance_ms: f32,
    auto_after_skip_ms: f32,
}

impl DialogueCursor {
    pub fn new(lines: Vec<DialogueLine>, flow: &FlowTuning) -> Self {
        let revealing = !lines.is_empty();
        Self {
            lines,
            index: 0,
            reveal_ms: 0.0,
            revealing,
            auto: false,
            wake_ms: None,
            ms_per_char: flow.reveal_ms_per_char,
            auto_advance_ms: flow.auto_advance_ms,
            auto_after_skip_ms: flow.auto_after_skip_ms,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.lines.len()
    }

    pub fn current(&self) -> Option<&DialogueLine> {
        self.lines.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_revealing(&self) -> bool {
        self.revealing
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Characters of the current line shown so far
    pub fn visible_chars(&self) -> usize {
        let Some(line) = self.current() else {
            return 0;
        };
        let total = line.text.chars().count();
        if !self.revealing {
            return total;
        }
        let shown = 1 + (self.reveal_ms / self.ms_per_char.max(f32::EPSILON)) as usize;
        shown.min(total)
    }

    /// The revealed prefix of the current line
    pub fn visible_text(&self) -> &str {
        let Some(line) = self.current() else {
            return "";
        };
        let end = line
            .text
            .char_indices()
            .nth(self.visible_chars())
            .map_or(line.text.len(), |(i, _)| i);
        &line.text[..end]
    }

    /// Advance reveal and any pending auto-advance
    pub fn update(&mut self, dt_ms: f32) {
        if self.is_complete() {
            return;
        }

        if self.revealing {
            self.reveal_ms += dt_ms;
            let total = self.current().map_or(0, |l| l.text.chars().count());
            if self.visible_chars() >= total {
                self.finish_reveal(self.auto_advance_ms);
            }
            return;
        }

        if let Some(wake) = self.wake_ms.as_mut() {
            *wake -= dt_ms;
            if *wake <= 0.0 {
                self.next_line();
            }
        }
    }

    /// Complete the reveal of the current line, or move to the next line if
    /// it is already fully shown
    pub fn advance(&mut self) {
        if self.is_complete() {
            return;
        }
        if self.revealing {
            self.finish_reveal(self.auto_after_skip_ms);
        } else {
            self.next_line();
        }
    }

    /// Jump past every remaining line
    pub fn skip(&mut self) {
        self.index = self.lines.len();
        self.revealing = false;
        self.wake_ms = None;
    }

    pub fn toggle_auto(&mut self) {
        self.auto = !self.auto;
        self.wake_ms = if self.auto && !self.revealing {
            Some(self.auto_advance_ms)
        } else {
            None
        };
    }

    fn finish_reveal(&mut self, auto_delay_ms: f32) {
        self.revealing = false;
        self.wake_ms = self.auto.then_some(auto_delay_ms);
    }

    fn next_line(&mut self) {
        self.index += 1;
        self.reveal_ms = 0.0;
        self.revealing = !self.is_complete();
        self.wake_ms = None;
    }
}

fn script(lines: &[(Speaker, &str)]) -> Vec<DialogueLine> {
    lines
        .iter()
        .map(|&(speaker, text)| DialogueLine::new(speaker, text))
        .collect()
}

/// Shown once when the game first loads
pub fn boot() -> Vec<DialogueLine> {
    script(&[
        (
            Speaker::Lab01,
            "Connection confirmed! Project 'Plant Back Earth' is ready to go~",
        ),
        (Speaker::Lab02, "They should be arriving any moment now."),
    ])
}

/// Briefing before stage 1 of every run
pub fn intro() -> Vec<DialogueLine> {
    use Speaker::*;
    script(&[
        (Operator, "Hello! I'm the robot operator who was just dispatched here!"),
        (Lab01, "Nice to meet you! A new face, that's refreshing."),
        (Lab02, "Let's skip the pleasantries and start the project."),
        (
            Lab01,
            "It's been ages since we saw someone new! We could chat a little, grab a meal...",
        ),
        (Lab02, "No time. The contamination is spreading as we speak."),
        (Lab01, "Fine, fine. Shall we go?"),
        (Operator, "Yes! Leave it to me!"),
        (
            Lab02,
            "Oxygen keeps draining, and touching poison or spikes damages you immediately.",
        ),
        (Lab01, "It's a robot, but it still depends heavily on oxygen."),
        (
            Lab02,
            "The green rings are planting spots. Grab a seed, plant it with E, then water it with F.",
        ),
        (
            Lab01,
            "And if you stay next to a watered plant for a moment, it tops up your oxygen!",
        ),
        (
            Lab02,
            "Last thing: choose your cards well. Rarer cards glow brighter. Take what you need first.",
        ),
        (Operator, "Cards, huh... interesting. Let's begin!"),
    ])
}

/// After every stage except the last
pub fn stage_clear(stage_name: &str) -> Vec<DialogueLine> {
    vec![
        DialogueLine::new(
            Speaker::Lab01,
            format!("{stage_name} purification complete! Oxygen levels are climbing back to normal!"),
        ),
        DialogueLine::new(Speaker::Lab02, "Then we move on to the next sector."),
        DialogueLine::new(Speaker::Operator, "Getting ready to move out!"),
    ]
}

/// After health runs out
pub fn retry() -> Vec<DialogueLine> {
    script(&[
        (Speaker::Lab02, "Can we count on you?"),
        (Speaker::Lab01, "Let's go again!"),
        (Speaker::Operator, "I'll stay focused..!"),
    ])
}

/// After the final stage is cleared
pub fn ending() -> Vec<DialogueLine> {
    use Speaker::*;
    script(&[
        (Lab01, "So? How does it feel to have restored the Earth?"),
        (
            Operator,
            "It hasn't sunk in yet... More than anything, I think it's beautiful.",
        ),
        (
            Lab02,
            "I've never seen the Earth this clean. It's like seeing it as it really is.",
        ),
        (Lab02, "Still, the regeneration project isn't over."),
        (Operator, "Of course! There's a mountain of work left to restore."),
        (Lab01, "And we've already built the next robots~!"),
        (Operator, "W-we're starting right away..?"),
        (Lab02, "Ha. Today we rest and take in the view."),
        (Operator, "Phew... what a relief."),
    ])
}

/// Closing line that reports the final score before the run resets
pub fn finale(score: u64) -> Vec<DialogueLine> {
    vec![DialogueLine::new(
        Speaker::Operator,
        format!("Mission complete. Score: {score}  Haha... shall we start over?"),
    )]
}

/// Shown during the loading pause between stages
pub const LOADING_QUOTES: [&str; 5] = [
    "Saving one sheet of paper a day can protect 4,500 trees.",
    "Small patches of green grow into a forest.",
    "Trash never disappears. It only changes places.",
    "Your choices change tomorrow's Earth.",
    "Pollution is fast and recovery is slow. That is why now matters.",
];
