//! Value state
//!
//! Owns the committed value and any live text the user is typing. Every
//! mutation funnels through [`ValueState::commit`], which aligns, clamps and
//! compares at display precision, so an operation that would not move the
//! value emits nothing and an effective change emits exactly one `Change`.

use crate::events::{EventGateway, SpinEvent};
use crate::numeric::{align_to_step, clamp, parse_number, round_to_decimals, same_at_precision};
use crate::settings::Settings;
use crate::spin::{Direction, StepOutcome};

/// Value lifecycle. There is no observable partially initialized state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Ready,
    /// Terminal; every mutation is ignored
    Destroyed,
}

#[derive(Clone, Debug)]
pub struct ValueState {
    current: f64,
    /// Text typed since the last commit, not yet sanitized
    pending_text: Option<String>,
    lifecycle: Lifecycle,
}

impl ValueState {
    /// Create from the text the input shows at construction
    ///
    /// Empty or malformed text falls back to `initial_value`, then
    /// `replacement_value`, then zero. The result is aligned and clamped.
    pub fn new(input_text: &str, settings: &Settings) -> Self {
        let raw = parse_number(input_text)
            .or(settings.initial_value)
            .or(settings.replacement_value)
            .unwrap_or(0.0);

        Self {
            current: Self::resolve(raw, settings),
            pending_text: None,
            lifecycle: Lifecycle::Ready,
        }
    }

    /// Align with the configured policy, round to `decimals`, clamp
    pub fn resolve(candidate: f64, settings: &Settings) -> f64 {
        let aligned = align_to_step(
            candidate,
            settings.min,
            settings.step,
            settings.step_alignment,
        );
        clamp(
            round_to_decimals(aligned, settings.decimals),
            settings.min,
            settings.max,
        )
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    /// Committed value, ignoring any pending text
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Value as the user currently sees it
    ///
    /// Pending text that parses is returned as typed (rounded to `decimals`,
    /// not aligned). Otherwise the committed value.
    pub fn value(&self, settings: &Settings) -> f64 {
        let shown = self
            .pending_text
            .as_deref()
            .and_then(parse_number)
            .unwrap_or(self.current);
        round_to_decimals(shown, settings.decimals)
    }

    pub fn pending_text(&self) -> Option<&str> {
        self.pending_text.as_deref()
    }

    /// Record live typing. No alignment, no commit.
    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        if self.is_destroyed() {
            return;
        }
        self.pending_text = Some(text.into());
    }

    /// Commit `candidate`, clearing any pending text
    pub fn commit(
        &mut self,
        candidate: f64,
        settings: &Settings,
        gateway: &mut EventGateway,
    ) -> StepOutcome {
        if self.is_destroyed() {
            return StepOutcome::default();
        }
        self.pending_text = None;
        self.apply(candidate, settings, gateway)
    }

    /// Step from the current value, or from the pending text if there is one
    pub fn step(
        &mut self,
        direction: Direction,
        size: f64,
        settings: &Settings,
        gateway: &mut EventGateway,
    ) -> StepOutcome {
        if self.is_destroyed() {
            return StepOutcome::default();
        }
        let base = match self.pending_text.take() {
            Some(text) => Self::resolve(self.fallback_parse(&text, settings), settings),
            None => self.current,
        };
        self.apply(base + direction.sign() * size, settings, gateway)
    }

    /// Blur/submit correction of typed text
    ///
    /// Unparseable text becomes `replacement_value`, or the current value
    /// when no replacement is configured.
    pub fn sanitize(
        &mut self,
        raw_text: &str,
        settings: &Settings,
        gateway: &mut EventGateway,
    ) -> StepOutcome {
        let candidate = self.fallback_parse(raw_text, settings);
        self.commit(candidate, settings, gateway)
    }

    /// Re-apply bounds and alignment after a settings change. Pending text
    /// is left alone.
    pub fn reclamp(&mut self, settings: &Settings, gateway: &mut EventGateway) -> StepOutcome {
        if self.is_destroyed() {
            return StepOutcome::default();
        }
        self.apply(self.current, settings, gateway)
    }

    /// Freeze the value. Idempotent.
    pub fn destroy(&mut self) {
        self.lifecycle = Lifecycle::Destroyed;
        self.pending_text = None;
    }

    fn fallback_parse(&self, text: &str, settings: &Settings) -> f64 {
        parse_number(text)
            .or(settings.replacement_value)
            .unwrap_or(self.current)
    }

    fn apply(
        &mut self,
        candidate: f64,
        settings: &Settings,
        gateway: &mut EventGateway,
    ) -> StepOutcome {
        let next = Self::resolve(candidate, settings);
        let committed = !same_at_precision(next, self.current, settings.decimals);

        if committed {
            tracing::debug!(from = self.current, to = next, "value committed");
            self.current = next;
        }

        let outcome = StepOutcome {
            committed,
            at_min: same_at_precision(self.current, settings.min, settings.decimals),
            at_max: same_at_precision(self.current, settings.max, settings.decimals),
        };

        if committed {
            gateway.emit(SpinEvent::Change { value: next });
            if outcome.at_min {
                gateway.emit(SpinEvent::MinReached { value: next });
            }
            if outcome.at_max {
                gateway.emit(SpinEvent::MaxReached { value: next });
            }
        }

        outcome
    }
}
