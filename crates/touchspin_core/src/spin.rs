//! Spin state machine
//!
//! Drives press-and-hold auto-repeat:
//!
//! ```text
//!            start                delay elapsed
//!   Idle ───────────▶ ArmedDelay ───────────────▶ Repeating ──┐ tick
//!    ▲                    │                          │  ▲─────┘
//!    └────────────────────┴──── stop / boundary ─────┘
//! ```
//!
//! The machine owns no timer and no value. It returns [`SpinEffect`]s for the
//! owner to carry out (emit, arm the timer, disarm it) and performs each step
//! through a callback, so the boundary guard is evaluated synchronously on the
//! callback's [`StepOutcome`]. This keeps it testable without any clock.

use smallvec::SmallVec;

use crate::events::SpinEvent;
use crate::fsm::StateMachine;
use crate::settings::Settings;

/// Largest doubling applied by the booster
const MAX_BOOST_EXPONENT: u32 = 52;

/// Direction of a step or spin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `+1.0` for up, `-1.0` for down
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Spin machine states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpinPhase {
    Idle,
    /// Waiting for the initial delay before the first repeat
    ArmedDelay,
    /// Stepping on every interval
    Repeating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum SpinTrigger {
    Start,
    DelayElapsed,
    Tick,
    Stop,
}

/// Timing and boost parameters read from settings when needed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinTiming {
    pub delay_ms: u64,
    pub interval_ms: u64,
    pub step: f64,
    pub boosting: bool,
    pub boost_at_step_count: u32,
    pub max_boosted_step: Option<f64>,
}

impl SpinTiming {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            delay_ms: settings.step_delay_ms,
            interval_ms: settings.step_interval_ms,
            step: settings.step,
            boosting: settings.boosting,
            boost_at_step_count: settings.boost_at_step_count.max(1),
            max_boosted_step: settings.max_boosted_step,
        }
    }

    /// Step size for repeat number `tick` (1-based)
    ///
    /// Below the boost threshold this is `step`. From the threshold on, the
    /// step doubles every `boost_at_step_count` ticks, capped at
    /// `max_boosted_step` and never below `step`.
    pub fn effective_step(&self, tick: u32) -> f64 {
        if !self.boosting || tick < self.boost_at_step_count {
            return self.step;
        }

        let exponent = (tick / self.boost_at_step_count).min(MAX_BOOST_EXPONENT);
        let boosted = self.step * 2f64.powi(exponent as i32);
        let capped = match self.max_boosted_step {
            Some(cap) => boosted.min(cap),
            None => boosted,
        };
        capped.max(self.step)
    }
}

impl From<&Settings> for SpinTiming {
    fn from(settings: &Settings) -> Self {
        Self::from_settings(settings)
    }
}

/// What a single step did, as decided by the value state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// A new value was committed
    pub committed: bool,
    /// The value now sits on `min`
    pub at_min: bool,
    /// The value now sits on `max`
    pub at_max: bool,
}

impl StepOutcome {
    /// Whether further steps in `direction` cannot move the value
    pub fn blocks(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.at_max,
            Direction::Down => self.at_min,
        }
    }
}

/// Work the owner of the machine must carry out, in order
#[derive(Clone, Debug, PartialEq)]
pub enum SpinEffect {
    Emit(SpinEvent),
    /// (Re)arm the session timer to fire after `after_ms`
    Arm { after_ms: u64 },
    /// Cancel the session timer
    Disarm,
}

pub type SpinEffects = SmallVec<[SpinEffect; 4]>;

/// State of the active spin
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpinSession {
    pub direction: Direction,
    /// Repeats performed so far
    pub tick_count: u32,
}

/// The spin state machine
#[derive(Clone, Debug)]
pub struct SpinMachine {
    fsm: StateMachine<SpinPhase, SpinTrigger>,
    session: Option<SpinSession>,
}

impl SpinMachine {
    pub fn new() -> Self {
        use SpinPhase::*;
        use SpinTrigger::*;

        let fsm = StateMachine::builder(Idle)
            .on(Idle, Start, ArmedDelay)
            .on(ArmedDelay, DelayElapsed, Repeating)
            .on(Repeating, Tick, Repeating)
            .on_any(&[ArmedDelay, Repeating], Stop, Idle)
            .build();

        Self { fsm, session: None }
    }

    pub fn phase(&self) -> SpinPhase {
        self.fsm.current_state()
    }

    pub fn session(&self) -> Option<&SpinSession> {
        self.session.as_ref()
    }

    pub fn is_spinning(&self) -> bool {
        self.session.is_some()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.session.map(|s| s.direction)
    }

    /// Begin a spin session
    ///
    /// Starting the direction already spinning keeps the current session.
    /// Starting the opposite direction fully stops the active session first.
    pub fn start(&mut self, direction: Direction, timing: &SpinTiming) -> SpinEffects {
        let mut effects = SpinEffects::new();

        match self.direction() {
            Some(active) if active == direction => return effects,
            Some(_) => effects.extend(self.stop()),
            None => {}
        }

        if self.fsm.send(SpinTrigger::Start).is_none() {
            return effects;
        }
        self.session = Some(SpinSession {
            direction,
            tick_count: 0,
        });
        tracing::debug!(?direction, delay_ms = timing.delay_ms, "spin started");

        effects.push(SpinEffect::Emit(SpinEvent::SpinStarted { direction }));
        effects.push(SpinEffect::Emit(SpinEvent::directional_started(direction)));
        effects.push(SpinEffect::Arm {
            after_ms: timing.delay_ms,
        });
        effects
    }

    /// End the active session. Does nothing when idle.
    pub fn stop(&mut self) -> SpinEffects {
        let mut effects = SpinEffects::new();
        let Some(session) = self.session else {
            return effects;
        };
        if self.fsm.send(SpinTrigger::Stop).is_none() {
            return effects;
        }
        self.session = None;
        tracing::debug!(
            direction = ?session.direction,
            ticks = session.tick_count,
            "spin stopped"
        );

        effects.push(SpinEffect::Disarm);
        effects.push(SpinEffect::Emit(SpinEvent::directional_stopped(
            session.direction,
        )));
        effects.push(SpinEffect::Emit(SpinEvent::SpinStopped {
            direction: session.direction,
        }));
        effects
    }

    /// Handle the session timer firing
    ///
    /// Performs one step through `step` (called with the direction and the
    /// possibly boosted step size), then either re-arms for the next interval
    /// or, if the step left the value on the bound it is moving towards,
    /// stops the session.
    pub fn on_timer<F>(&mut self, timing: &SpinTiming, step: F) -> SpinEffects
    where
        F: FnOnce(Direction, f64) -> StepOutcome,
    {
        let trigger = match self.phase() {
            SpinPhase::Idle => {
                tracing::trace!("timer fired while idle");
                return SpinEffects::new();
            }
            SpinPhase::ArmedDelay => SpinTrigger::DelayElapsed,
            SpinPhase::Repeating => SpinTrigger::Tick,
        };
        if self.fsm.send(trigger).is_none() {
            return SpinEffects::new();
        }

        let Some(session) = self.session.as_mut() else {
            return SpinEffects::new();
        };
        session.tick_count = session.tick_count.saturating_add(1);
        let direction = session.direction;
        let size = timing.effective_step(session.tick_count);

        let outcome = step(direction, size);

        if outcome.blocks(direction) {
            tracing::debug!(?direction, "boundary reached, ending spin");
            return self.stop();
        }

        let mut effects = SpinEffects::new();
        effects.push(SpinEffect::Arm {
            after_ms: timing.interval_ms,
        });
        effects
    }
}

impl Default for SpinMachine {
    fn default() -> Self {
        Self::new()
    }
}
