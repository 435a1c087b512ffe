//! Spinner registry
//!
//! Hosts that manage many inputs keep their spinners here instead of hanging
//! them off the inputs themselves. Handles are versioned slotmap keys, so a
//! handle to a detached spinner never reaches a newer one.

use rustc_hash::FxHashMap;
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use touchspin_core::settings::SettingsPatch;
use touchspin_timer::{Clock, SystemClock};

use crate::command::SpinCommand;
use crate::legacy;
use crate::spinner::TouchSpin;

new_key_type! {
    pub struct SpinnerId;
}

/// Owns spinner instances that share one time source
pub struct SpinnerRegistry<C: Clock + Clone = SystemClock> {
    spinners: SlotMap<SpinnerId, TouchSpin<C>>,
    /// Host element keys, for idempotent attach
    keys: FxHashMap<String, SpinnerId>,
    clock: C,
}

impl SpinnerRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for SpinnerRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> SpinnerRegistry<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            spinners: SlotMap::with_key(),
            keys: FxHashMap::default(),
            clock,
        }
    }

    /// Create a spinner on the shared clock
    pub fn attach(&mut self, input_text: &str, settings: &SettingsPatch) -> SpinnerId {
        let spinner = TouchSpin::builder()
            .input_text(input_text)
            .settings(settings.clone())
            .clock(self.clock.clone())
            .build();
        self.insert(spinner)
    }

    /// Attach once per host key. A key that is already attached returns the
    /// existing spinner untouched.
    pub fn attach_keyed(
        &mut self,
        key: &str,
        input_text: &str,
        settings: &SettingsPatch,
    ) -> SpinnerId {
        if let Some(&id) = self.keys.get(key) {
            if self.spinners.contains_key(id) {
                tracing::debug!(key, "spinner already attached");
                return id;
            }
        }
        let id = self.attach(input_text, settings);
        self.keys.insert(key.to_string(), id);
        id
    }

    /// Take ownership of an already built spinner
    pub fn insert(&mut self, spinner: TouchSpin<C>) -> SpinnerId {
        let id = self.spinners.insert(spinner);
        tracing::debug!(?id, "spinner attached");
        id
    }

    pub fn find(&self, key: &str) -> Option<SpinnerId> {
        self.keys
            .get(key)
            .copied()
            .filter(|id| self.spinners.contains_key(*id))
    }

    pub fn get(&self, id: SpinnerId) -> Option<&TouchSpin<C>> {
        self.spinners.get(id)
    }

    pub fn get_mut(&mut self, id: SpinnerId) -> Option<&mut TouchSpin<C>> {
        self.spinners.get_mut(id)
    }

    /// Run a command. Returns false for a stale handle.
    pub fn execute(&mut self, id: SpinnerId, command: SpinCommand) -> bool {
        match self.spinners.get_mut(id) {
            Some(spinner) => {
                spinner.execute(command);
                true
            }
            None => {
                tracing::debug!(?id, command = command.name(), "command for unknown spinner");
                false
            }
        }
    }

    /// Translate and run a legacy string command
    pub fn execute_legacy(
        &mut self,
        id: SpinnerId,
        name: &str,
        arg: Option<&Value>,
    ) -> touchspin_core::Result<bool> {
        let command = legacy::translate(name, arg)?;
        Ok(self.execute(id, command))
    }

    /// Destroy and remove a spinner
    pub fn detach(&mut self, id: SpinnerId) -> bool {
        let Some(mut spinner) = self.spinners.remove(id) else {
            return false;
        };
        spinner.destroy();
        self.keys.retain(|_, attached| *attached != id);
        tracing::debug!(?id, "spinner detached");
        true
    }

    /// Fire due timers on every spinner. Returns the number fired.
    pub fn poll_all(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.spinners
            .values_mut()
            .map(|spinner| spinner.advance(now))
            .sum()
    }

    /// Earliest timer deadline across all spinners
    pub fn next_deadline(&self) -> Option<u64> {
        self.spinners
            .values()
            .filter_map(|spinner| spinner.next_deadline())
            .min()
    }

    pub fn ids(&self) -> impl Iterator<Item = SpinnerId> + '_ {
        self.spinners.keys()
    }

    pub fn len(&self) -> usize {
        self.spinners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spinners.is_empty()
    }
}
