//! TouchSpin Timer System
//!
//! Clocks and one-shot timer scheduling for press-and-hold auto-repeat.
//!
//! # Features
//!
//! - **Clocks**: a monotonic system clock and a manually driven logical clock
//! - **Scheduler**: cancellable one-shot timers fired in deadline order
//! - **Cancellation**: a cancelled timer is removed, never merely flagged
//!
//! Nothing in this crate spawns threads or sleeps. The host polls
//! [`TimerScheduler::pop_due`] with the current time and decides when to wake up
//! from [`TimerScheduler::next_deadline`].

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{Fired, TimerId, TimerScheduler};
