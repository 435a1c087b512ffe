//! TouchSpin Widgets
//!
//! Spinner instances built from the core engine, plus the adapter-facing
//! surfaces: typed commands, the legacy command table, gesture translation,
//! and a registry for hosts that own many spinners.

pub mod command;
pub mod gesture;
pub mod legacy;
pub mod registry;
pub mod spinner;

pub use command::{SpinCommand, ValueInput};
pub use gesture::{handle_gesture, Gesture, KeyCode};
pub use registry::{SpinnerId, SpinnerRegistry};
pub use spinner::{FormatHook, ParseHook, TouchSpin, TouchSpinBuilder};
