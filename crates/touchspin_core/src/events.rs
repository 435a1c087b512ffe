//! Event gateway
//!
//! The single outlet for value and spin lifecycle notifications, and the
//! inbound channel for facts the adapter observes on the host input.

use slotmap::{new_key_type, SlotMap};
use std::fmt;
use std::str::FromStr;

use crate::error::SpinnerError;
use crate::spin::Direction;

/// Notification kinds an adapter can subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new value was committed
    Change,
    /// A commit landed exactly on `min`
    MinReached,
    /// A commit landed exactly on `max`
    MaxReached,
    SpinStarted,
    SpinStopped,
    UpSpinStarted,
    DownSpinStarted,
    UpSpinStopped,
    DownSpinStopped,
    /// Settings were updated; boundary indicators need a resync
    SettingsChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::Change,
        EventKind::MinReached,
        EventKind::MaxReached,
        EventKind::SpinStarted,
        EventKind::SpinStopped,
        EventKind::UpSpinStarted,
        EventKind::DownSpinStarted,
        EventKind::UpSpinStopped,
        EventKind::DownSpinStopped,
        EventKind::SettingsChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Change => "change",
            EventKind::MinReached => "min",
            EventKind::MaxReached => "max",
            EventKind::SpinStarted => "startspin",
            EventKind::SpinStopped => "stopspin",
            EventKind::UpSpinStarted => "startupspin",
            EventKind::DownSpinStarted => "startdownspin",
            EventKind::UpSpinStopped => "stopupspin",
            EventKind::DownSpinStopped => "stopdownspin",
            EventKind::SettingsChanged => "settingschange",
        }
    }

    /// Name under the legacy `touchspin.on.*` namespace (`change` stays bare)
    pub fn legacy_name(&self) -> String {
        match self {
            EventKind::Change => "change".to_string(),
            other => format!("touchspin.on.{}", other.as_str()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = SpinnerError;

    /// Accepts both `min` and `touchspin.on.min`
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let short = name.strip_prefix("touchspin.on.").unwrap_or(name);
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == short)
            .ok_or_else(|| SpinnerError::UnknownEvent(name.to_string()))
    }
}

/// A notification with its payload
#[derive(Clone, Debug, PartialEq)]
pub enum SpinEvent {
    Change { value: f64 },
    MinReached { value: f64 },
    MaxReached { value: f64 },
    SpinStarted { direction: Direction },
    SpinStopped { direction: Direction },
    UpSpinStarted,
    DownSpinStarted,
    UpSpinStopped,
    DownSpinStopped,
    SettingsChanged {
        min: f64,
        max: f64,
        step: f64,
        decimals: u32,
    },
}

impl SpinEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SpinEvent::Change { .. } => EventKind::Change,
            SpinEvent::MinReached { .. } => EventKind::MinReached,
            SpinEvent::MaxReached { .. } => EventKind::MaxReached,
            SpinEvent::SpinStarted { .. } => EventKind::SpinStarted,
            SpinEvent::SpinStopped { .. } => EventKind::SpinStopped,
            SpinEvent::UpSpinStarted => EventKind::UpSpinStarted,
            SpinEvent::DownSpinStarted => EventKind::DownSpinStarted,
            SpinEvent::UpSpinStopped => EventKind::UpSpinStopped,
            SpinEvent::DownSpinStopped => EventKind::DownSpinStopped,
            SpinEvent::SettingsChanged { .. } => EventKind::SettingsChanged,
        }
    }

    pub fn directional_started(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinEvent::UpSpinStarted,
            Direction::Down => SpinEvent::DownSpinStarted,
        }
    }

    pub fn directional_stopped(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinEvent::UpSpinStopped,
            Direction::Down => SpinEvent::DownSpinStopped,
        }
    }
}

/// Facts about the host input reported by the adapter. `None` leaves the
/// previously asserted value in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExternalFacts {
    pub disabled: Option<bool>,
    pub readonly: Option<bool>,
}

impl ExternalFacts {
    pub fn disabled(disabled: bool) -> Self {
        Self {
            disabled: Some(disabled),
            readonly: None,
        }
    }

    pub fn readonly(readonly: bool) -> Self {
        Self {
            disabled: None,
            readonly: Some(readonly),
        }
    }
}

new_key_type! {
    /// Handle returned by `subscribe`, used to unsubscribe
    pub struct SubscriptionId;
}

/// Event handler function type
pub type EventHandler = Box<dyn FnMut(&SpinEvent) + Send>;

struct Subscription {
    /// `None` receives every event
    filter: Option<EventKind>,
    handler: EventHandler,
}

/// Dispatches notifications to subscribers in subscription order
pub struct EventGateway {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    order: Vec<SubscriptionId>,
    closed: bool,
}

impl EventGateway {
    pub fn new() -> Self {
        Self {
            subscriptions: SlotMap::with_key(),
            order: Vec::new(),
            closed: false,
        }
    }

    /// Register a handler for one kind of event
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&SpinEvent) + Send + 'static,
    {
        self.insert(Some(kind), Box::new(handler))
    }

    /// Register a handler by event name
    pub fn subscribe_named<F>(&mut self, name: &str, handler: F) -> crate::Result<SubscriptionId>
    where
        F: FnMut(&SpinEvent) + Send + 'static,
    {
        let kind: EventKind = name.parse()?;
        Ok(self.subscribe(kind, handler))
    }

    /// Register a handler receiving every event
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SpinEvent) + Send + 'static,
    {
        self.insert(None, Box::new(handler))
    }

    /// A closed gateway hands out the null id and keeps nothing
    fn insert(&mut self, filter: Option<EventKind>, handler: EventHandler) -> SubscriptionId {
        if self.closed {
            return SubscriptionId::default();
        }
        let id = self.subscriptions.insert(Subscription { filter, handler });
        self.order.push(id);
        id
    }

    /// Remove a handler. Returns false for unknown or already removed ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.subscriptions.remove(id).is_none() {
            return false;
        }
        self.order.retain(|other| *other != id);
        true
    }

    /// Deliver an event to every matching subscriber
    pub fn emit(&mut self, event: SpinEvent) {
        if self.closed {
            return;
        }
        let kind = event.kind();
        tracing::trace!(?event, "emit");

        for id in &self.order {
            if let Some(subscription) = self.subscriptions.get_mut(*id) {
                if subscription.filter.map_or(true, |f| f == kind) {
                    (subscription.handler)(&event);
                }
            }
        }
    }

    /// Drop all handlers and ignore further emits
    pub fn close(&mut self) {
        self.closed = true;
        self.subscriptions.clear();
        self.order.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Default for EventGateway {
    fn default() -> Self {
        Self::new()
    }
}
