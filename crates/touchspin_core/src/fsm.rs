//! State Machine Runtime
//!
//! A flat, typed transition table. States and events are small `Copy` enums
//! so an invalid transition is a lookup miss rather than a stray integer.
//!
//! Guards live with the owner of the machine: it decides which event to send
//! after inspecting its own data, and the table only answers whether that
//! event is legal in the current state.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

/// Number of transitions kept for debugging
const HISTORY_CAPACITY: usize = 32;

/// Bound for state and event types
pub trait FsmLabel: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> FsmLabel for T {}

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
}

impl<S, E> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: Vec<Transition<S, E>>,
}

impl<S: FsmLabel, E: FsmLabel> StateMachineBuilder<S, E> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
        }
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add the same event from several source states
    pub fn on_any(mut self, from: &[S], event: E, to: S) -> Self {
        self.transitions
            .extend(from.iter().map(|state| Transition::new(*state, event, to)));
        self
    }

    /// Build the state machine. A later duplicate (from, event) pair wins.
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine::new(self.initial_state, self.transitions)
    }
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: FxHashMap<(S, E), S>,
    /// Recent transitions, oldest first
    history: VecDeque<(S, E, S)>,
}

impl<S: FsmLabel, E: FsmLabel> StateMachine<S, E> {
    /// Create a new state machine with an initial state and transitions
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E>>) -> Self {
        Self {
            current_state: initial_state,
            transitions: transitions
                .into_iter()
                .map(|t| ((t.from_state, t.event), t.to_state))
                .collect(),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Recent transitions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &(S, E, S)> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check if an event can trigger a transition from the current state
    pub fn can_send(&self, event: E) -> bool {
        self.transitions.contains_key(&(self.current_state, event))
    }

    /// Send an event. Returns the new state, or `None` if the event is not
    /// legal in the current state (the state is left unchanged).
    pub fn send(&mut self, event: E) -> Option<S> {
        let from = self.current_state;
        let Some(&to) = self.transitions.get(&(from, event)) else {
            tracing::trace!(?from, ?event, "no transition");
            return None;
        };

        self.current_state = to;
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back((from, event, to));
        tracing::trace!(?from, ?event, ?to, "transition");

        Some(to)
    }
}
