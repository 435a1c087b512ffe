//! Typed spinner commands

use touchspin_core::settings::SettingsPatch;
use touchspin_core::spin::Direction;

/// A value handed to `set_value`
///
/// Text goes through the same parse/fallback path as a blur correction,
/// numbers are committed directly.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueInput {
    Number(f64),
    Text(String),
}

impl From<f64> for ValueInput {
    fn from(value: f64) -> Self {
        ValueInput::Number(value)
    }
}

impl From<i32> for ValueInput {
    fn from(value: i32) -> Self {
        ValueInput::Number(f64::from(value))
    }
}

impl From<&str> for ValueInput {
    fn from(text: &str) -> Self {
        ValueInput::Text(text.to_string())
    }
}

impl From<String> for ValueInput {
    fn from(text: String) -> Self {
        ValueInput::Text(text)
    }
}

/// Everything an adapter can ask a spinner to do
#[derive(Clone, Debug, PartialEq)]
pub enum SpinCommand {
    UpOnce,
    DownOnce,
    StartUpSpin,
    StartDownSpin,
    StopSpin,
    SetValue(ValueInput),
    UpdateSettings(SettingsPatch),
    Destroy,
}

impl SpinCommand {
    pub fn step_once(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinCommand::UpOnce,
            Direction::Down => SpinCommand::DownOnce,
        }
    }

    pub fn start_spin(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinCommand::StartUpSpin,
            Direction::Down => SpinCommand::StartDownSpin,
        }
    }

    /// Short name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            SpinCommand::UpOnce => "uponce",
            SpinCommand::DownOnce => "downonce",
            SpinCommand::StartUpSpin => "startupspin",
            SpinCommand::StartDownSpin => "startdownspin",
            SpinCommand::StopSpin => "stopspin",
            SpinCommand::SetValue(_) => "setvalue",
            SpinCommand::UpdateSettings(_) => "updatesettings",
            SpinCommand::Destroy => "destroy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_input_conversions() {
        assert_eq!(ValueInput::from(2.5), ValueInput::Number(2.5));
        assert_eq!(ValueInput::from(7), ValueInput::Number(7.0));
        assert_eq!(ValueInput::from("1,5"), ValueInput::Text("1,5".into()));
        assert_eq!(
            ValueInput::from(String::from("abc")),
            ValueInput::Text("abc".into())
        );
    }

    #[test]
    fn test_directional_constructors() {
        assert_eq!(SpinCommand::step_once(Direction::Up), SpinCommand::UpOnce);
        assert_eq!(
            SpinCommand::start_spin(Direction::Down),
            SpinCommand::StartDownSpin
        );
        assert_eq!(SpinCommand::start_spin(Direction::Up).name(), "startupspin");
    }
}
