//! TouchSpin Core
//!
//! The value/spin engine behind a numeric spinner input:
//!
//! - **Numeric Policy**: step alignment, clamping, decimal rounding
//! - **Settings**: fully populated snapshots merged from partial patches
//! - **Value State**: the committed value and exactly-once change detection
//! - **Spin Machine**: delayed auto-repeat with boost, as a pure state machine
//! - **Event Gateway**: typed notifications out, external facts in
//!
//! # Example
//!
//! ```rust
//! use touchspin_core::events::EventGateway;
//! use touchspin_core::settings::{Settings, SettingsPatch};
//! use touchspin_core::spin::Direction;
//! use touchspin_core::value::ValueState;
//!
//! let settings = Settings::from_patch(&SettingsPatch::new().step(5.0));
//! let mut gateway = EventGateway::new();
//! let mut value = ValueState::new("95", &settings);
//!
//! value.step(Direction::Up, settings.step, &settings, &mut gateway);
//! let outcome = value.step(Direction::Up, settings.step, &settings, &mut gateway);
//!
//! assert_eq!(value.current(), 100.0);
//! assert!(!outcome.committed);
//! assert!(outcome.at_max);
//! ```

pub mod error;
pub mod events;
pub mod fsm;
pub mod numeric;
pub mod settings;
pub mod spin;
pub mod value;

pub use error::{Result, SpinnerError};
pub use events::{EventGateway, EventKind, ExternalFacts, SpinEvent, SubscriptionId};
pub use fsm::{StateMachine, Transition};
pub use numeric::StepAlignment;
pub use settings::{Settings, SettingsPatch, SettingsStore};
pub use spin::{Direction, SpinEffect, SpinMachine, SpinPhase, SpinTiming, StepOutcome};
pub use value::{Lifecycle, ValueState};
