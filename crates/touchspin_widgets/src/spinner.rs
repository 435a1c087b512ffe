//! Spinner widget
//!
//! `TouchSpin` assembles the core pieces into one instance per input:
//! - settings store and value state
//! - the spin state machine, driven by a one-shot timer per arm
//! - the event gateway every notification goes through
//!
//! All work happens synchronously inside the call that caused it. The host
//! drives time by calling [`TouchSpin::poll`] (or [`TouchSpin::advance`]) and
//! can ask [`TouchSpin::next_deadline`] when to wake up next.
//!
//! # Example
//!
//! ```rust
//! use touchspin_core::SettingsPatch;
//! use touchspin_timer::ManualClock;
//! use touchspin_widgets::TouchSpin;
//!
//! let clock = ManualClock::new();
//! let mut spinner = TouchSpin::builder()
//!     .input_text("10")
//!     .settings(SettingsPatch::new().max(12.0).step_delay_ms(300).step_interval_ms(50))
//!     .clock(clock.clone())
//!     .build();
//!
//! spinner.start_up_spin();
//! clock.advance(300);
//! spinner.poll();
//! assert_eq!(spinner.get_value(), 11.0);
//!
//! clock.advance(50);
//! spinner.poll();
//! assert_eq!(spinner.get_value(), 12.0);
//! assert!(!spinner.is_spinning());
//! ```

use touchspin_core::events::{EventGateway, EventKind, ExternalFacts, SpinEvent, SubscriptionId};
use touchspin_core::numeric::format_fixed;
use touchspin_core::settings::{Settings, SettingsPatch, SettingsStore};
use touchspin_core::spin::{Direction, SpinEffect, SpinEffects, SpinMachine, SpinPhase, SpinTiming};
use touchspin_core::value::ValueState;
use touchspin_timer::{Clock, SystemClock, TimerId, TimerScheduler};

use crate::command::{SpinCommand, ValueInput};

/// Text transform applied before parsing typed input
pub type ParseHook = Box<dyn Fn(&str) -> String + Send>;

/// Text transform applied to the formatted value before display
pub type FormatHook = Box<dyn Fn(&str) -> String + Send>;

/// A numeric spinner instance
pub struct TouchSpin<C: Clock = SystemClock> {
    store: SettingsStore,
    value: ValueState,
    spin: SpinMachine,
    gateway: EventGateway,
    timers: TimerScheduler<()>,
    /// Timer of the active spin session
    spin_timer: Option<TimerId>,
    clock: C,
    parse_hook: Option<ParseHook>,
    format_hook: Option<FormatHook>,
}

impl TouchSpin<SystemClock> {
    /// Create a spinner on the wall clock
    pub fn new(input_text: &str, settings: &SettingsPatch) -> Self {
        Self::builder()
            .input_text(input_text)
            .settings(settings.clone())
            .build()
    }

    pub fn builder() -> TouchSpinBuilder<SystemClock> {
        TouchSpinBuilder::new()
    }
}

impl<C: Clock> TouchSpin<C> {
    // =========================================================================
    // Reading state
    // =========================================================================

    /// Current value rounded to `decimals`
    ///
    /// While the user is typing this is the typed number, not yet aligned.
    pub fn get_value(&self) -> f64 {
        self.value.value(self.store.settings())
    }

    /// Text the input should show
    pub fn display_text(&self) -> String {
        if let Some(text) = self.value.pending_text() {
            return text.to_string();
        }
        let settings = self.store.settings();
        let formatted = format_fixed(self.value.current(), settings.decimals);
        match &self.format_hook {
            Some(hook) => hook(&formatted),
            None => formatted,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    /// False while the input is disabled or readonly
    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    pub fn is_destroyed(&self) -> bool {
        self.value.is_destroyed()
    }

    pub fn spin_phase(&self) -> SpinPhase {
        self.spin.phase()
    }

    pub fn spin_direction(&self) -> Option<Direction> {
        self.spin.direction()
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_spinning()
    }

    /// When the next timer is due, in clock milliseconds
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // =========================================================================
    // Value operations
    // =========================================================================

    /// Commit a value through alignment, clamping and change detection
    pub fn set_value(&mut self, input: impl Into<ValueInput>) {
        if !self.accepts_input("set_value") {
            return;
        }
        let settings = self.store.settings();
        match input.into() {
            ValueInput::Number(number) => {
                self.value.commit(number, settings, &mut self.gateway);
            }
            ValueInput::Text(text) => {
                let text = apply_hook(&self.parse_hook, &text);
                self.value.sanitize(&text, settings, &mut self.gateway);
            }
        }
    }

    pub fn up_once(&mut self) {
        self.step_once(Direction::Up);
    }

    pub fn down_once(&mut self) {
        self.step_once(Direction::Down);
    }

    /// Single step by the configured step size
    pub fn step_once(&mut self, direction: Direction) {
        if !self.accepts_input("step_once") {
            return;
        }
        let settings = self.store.settings();
        let outcome = self
            .value
            .step(direction, settings.step, settings, &mut self.gateway);

        // A manual step onto the bound ends a spin heading the same way
        if outcome.blocks(direction) && self.spin.direction() == Some(direction) {
            self.stop_spin();
        }
    }

    /// Record live typing. No alignment or notification happens until
    /// [`TouchSpin::sanitize`].
    pub fn input_text(&mut self, raw: &str) {
        if self.is_destroyed() {
            return;
        }
        let text = apply_hook(&self.parse_hook, raw);
        self.value.set_pending_text(text);
    }

    /// Blur/submit correction of the typed text
    pub fn sanitize(&mut self, raw: &str) {
        if !self.accepts_input("sanitize") {
            return;
        }
        let text = apply_hook(&self.parse_hook, raw);
        let settings = self.store.settings();
        self.value.sanitize(&text, settings, &mut self.gateway);
    }

    // =========================================================================
    // Spin operations
    // =========================================================================

    pub fn start_up_spin(&mut self) {
        self.start_spin(Direction::Up);
    }

    pub fn start_down_spin(&mut self) {
        self.start_spin(Direction::Down);
    }

    /// Begin auto-repeat in `direction`
    pub fn start_spin(&mut self, direction: Direction) {
        if !self.accepts_input("start_spin") {
            return;
        }
        let timing = SpinTiming::from_settings(self.store.settings());
        let effects = self.spin.start(direction, &timing);
        let now = self.clock.now_ms();
        self.run_effects(effects, now);
    }

    /// End auto-repeat. Safe to call from any state.
    pub fn stop_spin(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let effects = self.spin.stop();
        let now = self.clock.now_ms();
        self.run_effects(effects, now);
    }

    /// Fire every timer due on the clock. Returns the number fired.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.advance(now)
    }

    /// Fire every timer due at or before `now_ms`
    ///
    /// Repeats are re-armed from their own deadline, so a late poll catches
    /// up on the ticks it missed rather than drifting.
    pub fn advance(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now_ms) {
            if self.spin_timer != Some(timer.id) {
                continue;
            }
            self.spin_timer = None;
            fired += 1;

            tracing::trace!(
                phase = ?self.spin.phase(),
                deadline = timer.deadline_ms,
                now_ms,
                "spin timer fired"
            );
            self.on_spin_timer(timer.deadline_ms);
        }
        fired
    }

    fn on_spin_timer(&mut self, deadline: u64) {
        let timing = SpinTiming::from_settings(self.store.settings());
        let settings = self.store.settings();
        let value = &mut self.value;
        let gateway = &mut self.gateway;

        let effects = self.spin.on_timer(&timing, |direction, size| {
            value.step(direction, size, settings, gateway)
        });
        self.run_effects(effects, deadline);
    }

    fn run_effects(&mut self, effects: SpinEffects, base_ms: u64) {
        for effect in effects {
            match effect {
                SpinEffect::Emit(event) => self.gateway.emit(event),
                SpinEffect::Arm { after_ms } => {
                    if let Some(old) = self.spin_timer.take() {
                        self.timers.cancel(old);
                    }
                    let deadline = base_ms.saturating_add(after_ms);
                    self.spin_timer = Some(self.timers.schedule(deadline, ()));
                }
                SpinEffect::Disarm => {
                    if let Some(id) = self.spin_timer.take() {
                        self.timers.cancel(id);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Settings, facts, lifecycle
    // =========================================================================

    /// Merge a partial settings update, re-clamp the value and announce the
    /// new bounds
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        if self.is_destroyed() {
            tracing::warn!("update_settings on destroyed spinner ignored");
            return;
        }
        let settings = self.store.merge(patch);
        self.value.reclamp(settings, &mut self.gateway);
        self.gateway.emit(SpinEvent::SettingsChanged {
            min: settings.min,
            max: settings.max,
            step: settings.step,
            decimals: settings.decimals,
        });
    }

    /// Record disabled/readonly facts. Losing enablement stops any spin.
    pub fn notify_external_fact(&mut self, facts: ExternalFacts) {
        if self.is_destroyed() {
            return;
        }
        if !self.store.assert_facts(facts) {
            tracing::debug!(?facts, "input no longer enabled");
            self.stop_spin();
        }
    }

    /// Tear down: stop any spin, cancel timers, freeze the value and drop
    /// subscribers. Idempotent.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.stop_spin();
        self.timers.clear();
        self.spin_timer = None;
        self.value.destroy();
        self.gateway.close();
        tracing::debug!("spinner destroyed");
    }

    /// Run a typed command
    pub fn execute(&mut self, command: SpinCommand) {
        match command {
            SpinCommand::UpOnce => self.up_once(),
            SpinCommand::DownOnce => self.down_once(),
            SpinCommand::StartUpSpin => self.start_up_spin(),
            SpinCommand::StartDownSpin => self.start_down_spin(),
            SpinCommand::StopSpin => self.stop_spin(),
            SpinCommand::SetValue(input) => self.set_value(input),
            SpinCommand::UpdateSettings(patch) => self.update_settings(&patch),
            SpinCommand::Destroy => self.destroy(),
        }
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Returns a null handle after destroy
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&SpinEvent) + Send + 'static,
    {
        if self.is_destroyed() {
            return SubscriptionId::default();
        }
        self.gateway.subscribe(kind, handler)
    }

    /// Subscribe by event name (`"change"`, `"max"`, `"touchspin.on.max"`, ...)
    ///
    /// Unknown names are rejected. After destroy this accepts anything and
    /// returns a null handle.
    pub fn subscribe_named<F>(&mut self, name: &str, handler: F) -> touchspin_core::Result<SubscriptionId>
    where
        F: FnMut(&SpinEvent) + Send + 'static,
    {
        if self.is_destroyed() {
            return Ok(SubscriptionId::default());
        }
        self.gateway.subscribe_named(name, handler)
    }

    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SpinEvent) + Send + 'static,
    {
        if self.is_destroyed() {
            return SubscriptionId::default();
        }
        self.gateway.subscribe_all(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.gateway.unsubscribe(id)
    }

    fn accepts_input(&self, operation: &'static str) -> bool {
        if self.is_destroyed() {
            tracing::warn!(operation, "operation on destroyed spinner ignored");
            return false;
        }
        if !self.store.is_enabled() {
            tracing::trace!(operation, "input disabled, ignoring");
            return false;
        }
        true
    }
}

fn apply_hook(hook: &Option<ParseHook>, raw: &str) -> String {
    match hook {
        Some(hook) => hook(raw),
        None => raw.to_string(),
    }
}

/// Builder for creating spinners
pub struct TouchSpinBuilder<C> {
    input_text: String,
    settings: SettingsPatch,
    clock: C,
    parse_hook: Option<ParseHook>,
    format_hook: Option<FormatHook>,
}

impl TouchSpinBuilder<SystemClock> {
    pub fn new() -> Self {
        Self {
            input_text: String::new(),
            settings: SettingsPatch::default(),
            clock: SystemClock::new(),
            parse_hook: None,
            format_hook: None,
        }
    }
}

impl Default for TouchSpinBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TouchSpinBuilder<C> {
    /// Text the input shows at construction
    pub fn input_text(mut self, text: impl Into<String>) -> Self {
        self.input_text = text.into();
        self
    }

    pub fn settings(mut self, settings: SettingsPatch) -> Self {
        self.settings = settings;
        self
    }

    /// Use a different time source
    pub fn clock<C2: Clock>(self, clock: C2) -> TouchSpinBuilder<C2> {
        TouchSpinBuilder {
            input_text: self.input_text,
            settings: self.settings,
            clock,
            parse_hook: self.parse_hook,
            format_hook: self.format_hook,
        }
    }

    /// Transform typed text before it is parsed
    pub fn parse_hook<F: Fn(&str) -> String + Send + 'static>(mut self, hook: F) -> Self {
        self.parse_hook = Some(Box::new(hook));
        self
    }

    /// Transform the formatted value before it is displayed
    pub fn format_hook<F: Fn(&str) -> String + Send + 'static>(mut self, hook: F) -> Self {
        self.format_hook = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> TouchSpin<C> {
        let store = SettingsStore::new(&self.settings);
        let text = apply_hook(&self.parse_hook, &self.input_text);
        let value = ValueState::new(&text, store.settings());
        tracing::debug!(value = value.current(), "spinner ready");

        TouchSpin {
            store,
            value,
            spin: SpinMachine::new(),
            gateway: EventGateway::new(),
            timers: TimerScheduler::new(),
            spin_timer: None,
            clock: self.clock,
            parse_hook: self.parse_hook,
            format_hook: self.format_hook,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchspin_timer::ManualClock;

    fn manual(text: &str, patch: SettingsPatch) -> TouchSpin<ManualClock> {
        TouchSpin::builder()
            .input_text(text)
            .settings(patch)
            .clock(ManualClock::new())
            .build()
    }

    #[test]
    fn test_construction_fallbacks() {
        let spinner = manual("", SettingsPatch::new().initial_value(30.0));
        assert_eq!(spinner.get_value(), 30.0);

        let spinner = manual("n/a", SettingsPatch::new().replacement_value(12.0));
        assert_eq!(spinner.get_value(), 12.0);

        let spinner = manual("", SettingsPatch::new());
        assert_eq!(spinner.get_value(), 0.0);

        let spinner = manual("250", SettingsPatch::new());
        assert_eq!(spinner.get_value(), 100.0);
    }

    #[test]
    fn test_execute_commands() {
        let mut spinner = manual("10", SettingsPatch::new());

        spinner.execute(SpinCommand::UpOnce);
        spinner.execute(SpinCommand::UpOnce);
        spinner.execute(SpinCommand::DownOnce);
        assert_eq!(spinner.get_value(), 11.0);

        spinner.execute(SpinCommand::SetValue(ValueInput::Text("42".into())));
        assert_eq!(spinner.get_value(), 42.0);

        spinner.execute(SpinCommand::StartDownSpin);
        assert_eq!(spinner.spin_phase(), SpinPhase::ArmedDelay);
        spinner.execute(SpinCommand::StopSpin);
        assert_eq!(spinner.spin_phase(), SpinPhase::Idle);

        spinner.execute(SpinCommand::UpdateSettings(SettingsPatch::new().step(0.5).decimals(1)));
        assert_eq!(spinner.display_text(), "42.0");

        spinner.execute(SpinCommand::Destroy);
        assert!(spinner.is_destroyed());
    }

    #[test]
    fn test_display_text_formats_decimals() {
        let mut spinner = manual("1.5", SettingsPatch::new().step(0.25).decimals(2));
        assert_eq!(spinner.display_text(), "1.50");

        spinner.up_once();
        assert_eq!(spinner.display_text(), "1.75");

        spinner.input_text("1.7");
        assert_eq!(spinner.display_text(), "1.7");
    }

    #[test]
    fn test_spin_timer_is_replaced_not_stacked() {
        let mut spinner = manual("50", SettingsPatch::new());

        spinner.start_up_spin();
        spinner.start_down_spin();
        spinner.start_up_spin();

        assert_eq!(spinner.timers.len(), 1);
        spinner.destroy();
        assert!(spinner.timers.is_empty());
        assert_eq!(spinner.next_deadline(), None);
    }

    #[test]
    fn test_subscribe_after_destroy_is_inert() {
        let mut spinner = manual("5", SettingsPatch::new());
        spinner.destroy();

        for _ in 0..3 {
            assert_eq!(
                spinner.subscribe(EventKind::Change, |_| {}),
                SubscriptionId::default()
            );
            assert_eq!(spinner.subscribe_all(|_| {}), SubscriptionId::default());
        }
        assert_eq!(spinner.gateway.subscriber_count(), 0);
        assert!(!spinner.unsubscribe(SubscriptionId::default()));
    }
}
