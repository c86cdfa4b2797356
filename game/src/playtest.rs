//! Scripted-event helpers for driving the game headlessly.

use engine::PadEvent;

use crate::bomb_core::{BombCore, Effect};
use crate::settings::GameplaySettings;

/// A fresh core plus the effects of its opening plant, ready for a
/// `ScriptedRunner`.
pub fn started_core(seed: u64, settings: GameplaySettings) -> (BombCore, Vec<Effect>) {
    let mut core = BombCore::new(seed, settings);
    let opening = core.start(0);
    (core, opening)
}

/// A press-and-release pair on one cell, the shape a real keypad produces.
pub fn press(index: u8) -> [PadEvent; 2] {
    [
        PadEvent::Key {
            index,
            pressed: true,
        },
        PadEvent::Key {
            index,
            pressed: false,
        },
    ]
}

/// Tick events at a fixed cadence over `[from_ms, to_ms]`, inclusive.
pub fn ticks(from_ms: u32, to_ms: u32, step_ms: u32) -> Vec<PadEvent> {
    let step_ms = step_ms.max(1);
    let mut events = Vec::new();
    let mut now_ms = from_ms;
    while now_ms <= to_ms {
        events.push(PadEvent::Tick { now_ms });
        now_ms += step_ms;
    }
    events
}

/// Lowest-index cell currently holding a bomb.
pub fn first_active_bomb(core: &BombCore) -> Option<u8> {
    core.active_bombs().keys().next().copied()
}

/// Cell of the bomb closest to expiry, the one a surviving player clears
/// first.
pub fn oldest_active_bomb(core: &BombCore) -> Option<u8> {
    core.active_bombs()
        .iter()
        .min_by_key(|&(_, &spawned_ms)| spawned_ms)
        .map(|(&pos, _)| pos)
}
