pub mod audio;
pub mod clock;
pub mod pad;
pub mod regression;

/// One serialized external event for a pad game.
///
/// A pad game is driven by two asynchronous sources, a periodic timer tick
/// and keypad edges. The host contract is that they never run concurrently;
/// a single ordered event stream is the headless realization of that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadEvent {
    Tick { now_ms: u32 },
    Key { index: u8, pressed: bool },
}

/// A game driven entirely by pad events.
///
/// Both entry points return the observable side effects of the event, in
/// order; the game itself never touches hardware and never blocks.
pub trait PadGame {
    type Effect;

    fn on_tick(&mut self, now_ms: u32) -> Vec<Self::Effect>;
    fn on_key(&mut self, index: u8, pressed: bool) -> Vec<Self::Effect>;
}

/// Feeds a scripted event stream into a game and records every effect.
#[derive(Debug)]
pub struct ScriptedRunner<G: PadGame> {
    game: G,
    effects: Vec<G::Effect>,
}

impl<G: PadGame> ScriptedRunner<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            effects: Vec::new(),
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Delivers one event and returns the effects it produced.
    pub fn feed(&mut self, event: PadEvent) -> &[G::Effect] {
        let start = self.effects.len();
        let emitted = match event {
            PadEvent::Tick { now_ms } => self.game.on_tick(now_ms),
            PadEvent::Key { index, pressed } => self.game.on_key(index, pressed),
        };
        self.effects.extend(emitted);
        &self.effects[start..]
    }

    pub fn run<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = PadEvent>,
    {
        for event in events {
            self.feed(event);
        }
    }

    /// Every effect recorded so far, in delivery order.
    pub fn effects(&self) -> &[G::Effect] {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<G::Effect> {
        std::mem::take(&mut self.effects)
    }
}
