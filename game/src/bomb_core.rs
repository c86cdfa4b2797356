use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use engine::PadGame;
use engine::audio::TonePlan;
use engine::clock::ticks_diff;
use engine::pad::{PAD_CELLS, PadCommand, Rgb, cell_xy};

use crate::score_display;
use crate::settings::{DifficultyDecay, GameplaySettings};
use crate::sfx;

/// How long a planted bomb stays defusable before it ends the round.
pub const INITIAL_TIME_LIMIT_MS: u32 = 2_000;
/// Spawn period at the start of a round.
pub const INITIAL_BOMB_INTERVAL_MS: u32 = 1_200;
/// The spawn period never shrinks below this.
pub const MIN_BOMB_INTERVAL_MS: u32 = 100;
/// Per-defusal shrink for [`DifficultyDecay::Additive`].
pub const ADDITIVE_DECAY_STEP_MS: u32 = 50;

// Urgency ramp, most to least remaining time.
pub const COLOR_CALM: Rgb = Rgb::hex(0x00FF00);
pub const COLOR_WARN: Rgb = Rgb::hex(0xFFC000);
pub const COLOR_CRITICAL: Rgb = Rgb::hex(0xFF6000);
pub const COLOR_EXPIRED: Rgb = Rgb::hex(0xFF0000);
/// Fixed armed color when the ramp is disabled.
pub const COLOR_ARMED: Rgb = Rgb::hex(0xFF0000);
/// Highlight on the cell of a wrong press. Distinct from every urgency tier.
pub const COLOR_WRONG_KEY: Rgb = Rgb::hex(0x2040FF);

/// Where the round currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Bombs spawn, age, and expire.
    Playing,
    /// A failure just happened; the next press acknowledges it.
    RoundOver,
    /// The score screen is showing; the next press starts a fresh round.
    AwaitingReset,
}

/// One observable side effect of a tick or key event.
///
/// The core never touches hardware; the host applies these in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Pad(PadCommand),
    Tone(TonePlan),
    /// Final score of the round that just ended.
    ReportScore(u32),
}

impl Effect {
    pub fn set(index: u8, color: Rgb) -> Self {
        let (x, y) = cell_xy(index);
        Effect::Pad(PadCommand::Set { x, y, color })
    }
}

/// Display color for a bomb by remaining fraction of the time limit.
///
/// A bomb already past the limit shows the expired color for the moment
/// between aging out and the tick that processes the expiry.
pub fn urgency_color(elapsed_ms: i32, time_limit_ms: u32) -> Rgb {
    let remaining = 1.0 - elapsed_ms as f32 / time_limit_ms.max(1) as f32;
    if remaining >= 0.67 {
        COLOR_CALM
    } else if remaining >= 0.34 {
        COLOR_WARN
    } else if remaining >= 0.0 {
        COLOR_CRITICAL
    } else {
        COLOR_EXPIRED
    }
}

/// Serializable aggregate of the core state, for assertions and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BombSnapshot {
    pub phase: Phase,
    pub score: u32,
    pub bomb_interval_ms: u32,
    pub active_bombs: Vec<(u8, u32)>,
    pub last_cleared: Option<u8>,
}

/// The bomb game: state machine and timing engine.
///
/// Driven by exactly two entry points, [`on_tick`](BombCore::on_tick) and
/// [`on_key`](BombCore::on_key), which the host must never invoke
/// concurrently. Everything observable comes back as [`Effect`]s; the core
/// holds no handles and never blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BombCore {
    settings: GameplaySettings,
    phase: Phase,
    /// Active set: cell index -> spawn timestamp. At most one bomb per cell.
    bombs: BTreeMap<u8, u32>,
    last_cleared: Option<u8>,
    score: u32,
    bomb_interval_ms: u32,
    last_bomb_ms: u32,
    /// Latest timestamp seen by `on_tick`; key events carry no clock, so
    /// reset-planted bombs are stamped with this.
    now_ms: u32,
    rng: Rng,
}

impl BombCore {
    pub fn new(seed: u64, settings: GameplaySettings) -> Self {
        let settings = settings.sanitized();
        Self {
            phase: Phase::Playing,
            bombs: BTreeMap::new(),
            last_cleared: None,
            score: 0,
            bomb_interval_ms: settings.initial_bomb_interval_ms,
            last_bomb_ms: 0,
            now_ms: 0,
            rng: Rng::new(seed),
            settings,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn bomb_interval_ms(&self) -> u32 {
        self.bomb_interval_ms
    }

    pub fn active_bombs(&self) -> &BTreeMap<u8, u32> {
        &self.bombs
    }

    pub fn settings(&self) -> &GameplaySettings {
        &self.settings
    }

    pub fn snapshot(&self) -> BombSnapshot {
        BombSnapshot {
            phase: self.phase,
            score: self.score,
            bomb_interval_ms: self.bomb_interval_ms,
            active_bombs: self.bombs.iter().map(|(&pos, &at)| (pos, at)).collect(),
            last_cleared: self.last_cleared,
        }
    }

    pub fn set_bomb_for_test(&mut self, index: u8, spawned_ms: u32) {
        self.bombs.insert(index, spawned_ms);
    }

    /// Clears the pad and plants the opening bomb. Call once before ticking.
    pub fn start(&mut self, now_ms: u32) -> Vec<Effect> {
        self.now_ms = now_ms;
        self.begin_round()
    }

    /// Periodic update: plants when the spawn interval has passed, refreshes
    /// urgency colors, and adjudicates expiry. No-op outside `Playing`.
    pub fn on_tick(&mut self, now_ms: u32) -> Vec<Effect> {
        self.now_ms = now_ms;
        if self.phase != Phase::Playing {
            return Vec::new();
        }

        let mut fx = Vec::new();
        let planted = if ticks_diff(now_ms, self.last_bomb_ms) > self.bomb_interval_ms as i32 {
            self.plant_bomb(&mut fx)
        } else {
            None
        };

        let mut expired = false;
        for (&pos, &spawned_ms) in &self.bombs {
            let elapsed = ticks_diff(now_ms, spawned_ms);
            // The freshly planted bomb was already drawn by the plant.
            if self.settings.color_ramp && planted != Some(pos) {
                fx.push(Effect::set(
                    pos,
                    urgency_color(elapsed, self.settings.time_limit_ms),
                ));
            }
            if elapsed > self.settings.time_limit_ms as i32 {
                // The remaining bombs are left as-is; the round is already lost.
                expired = true;
                break;
            }
        }

        if expired {
            self.phase = Phase::RoundOver;
        }
        if fx.iter().any(|e| matches!(e, Effect::Pad(_))) {
            fx.push(Effect::Pad(PadCommand::Flush));
        }
        if expired {
            fx.push(Effect::Tone(sfx::failure_tone()));
            fx.push(Effect::ReportScore(self.score));
        }
        fx
    }

    /// Key edge: presses adjudicate defusal/failure while playing and drive
    /// the score/reset flow afterwards. Releases are no-ops, as are indices
    /// outside the pad.
    pub fn on_key(&mut self, index: u8, pressed: bool) -> Vec<Effect> {
        if index as usize >= PAD_CELLS || !pressed {
            return Vec::new();
        }

        match self.phase {
            Phase::Playing => self.press_while_playing(index),
            Phase::RoundOver => {
                if self.settings.score_display {
                    self.phase = Phase::AwaitingReset;
                    score_display::score_frame(self.score)
                } else {
                    self.begin_round()
                }
            }
            Phase::AwaitingReset => self.begin_round(),
        }
    }

    fn press_while_playing(&mut self, index: u8) -> Vec<Effect> {
        if self.bombs.remove(&index).is_some() {
            self.last_cleared = Some(index);
            self.score += 1;
            self.shrink_interval();
            vec![
                Effect::set(index, Rgb::OFF),
                Effect::Pad(PadCommand::Flush),
                Effect::Tone(sfx::success_tone()),
            ]
        } else {
            self.phase = Phase::RoundOver;
            vec![
                Effect::set(index, COLOR_WRONG_KEY),
                Effect::Pad(PadCommand::Flush),
                Effect::Tone(sfx::failure_tone()),
                Effect::ReportScore(self.score),
            ]
        }
    }

    /// Full reset into a fresh `Playing` round with one bomb on the pad.
    fn begin_round(&mut self) -> Vec<Effect> {
        self.bombs.clear();
        self.last_cleared = None;
        self.score = 0;
        self.bomb_interval_ms = self.settings.initial_bomb_interval_ms;
        self.last_bomb_ms = self.now_ms;
        self.phase = Phase::Playing;

        let mut fx = vec![Effect::Pad(PadCommand::Fill(Rgb::OFF))];
        self.plant_bomb(&mut fx);
        fx.push(Effect::Pad(PadCommand::Flush));
        fx
    }

    /// Plants at a uniformly random eligible cell, if any. Eligible cells are
    /// the empty ones, minus the most recently cleared cell for exactly one
    /// planting cycle when anti-repeat is on. A full pad skips quietly and
    /// the next tick retries.
    fn plant_bomb(&mut self, fx: &mut Vec<Effect>) -> Option<u8> {
        let avoid = if self.settings.anti_repeat {
            self.last_cleared.take()
        } else {
            None
        };
        let eligible: Vec<u8> = (0..PAD_CELLS as u8)
            .filter(|index| !self.bombs.contains_key(index) && Some(*index) != avoid)
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let pos = eligible[self.rng.next_u32() as usize % eligible.len()];
        self.bombs.insert(pos, self.now_ms);
        self.last_bomb_ms = self.now_ms;

        fx.push(Effect::set(pos, self.initial_color()));
        if self.settings.plant_tone {
            fx.push(Effect::Tone(sfx::plant_tone()));
        }
        Some(pos)
    }

    fn initial_color(&self) -> Rgb {
        if self.settings.color_ramp {
            COLOR_CALM
        } else {
            COLOR_ARMED
        }
    }

    fn shrink_interval(&mut self) {
        let shrunk = match self.settings.decay {
            DifficultyDecay::Multiplicative => (self.bomb_interval_ms as u64 * 95 / 100) as u32,
            DifficultyDecay::Additive => self.bomb_interval_ms.saturating_sub(ADDITIVE_DECAY_STEP_MS),
        };
        self.bomb_interval_ms = shrunk.max(self.settings.min_bomb_interval_ms);
    }
}

impl PadGame for BombCore {
    type Effect = Effect;

    fn on_tick(&mut self, now_ms: u32) -> Vec<Effect> {
        BombCore::on_tick(self, now_ms)
    }

    fn on_key(&mut self, index: u8, pressed: bool) -> Vec<Effect> {
        BombCore::on_key(self, index, pressed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 {
            0x9E37_79B9_7F4A_7C15
        } else {
            seed
        };
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }
}
