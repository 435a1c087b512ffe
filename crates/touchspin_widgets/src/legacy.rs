//! Legacy string commands
//!
//! Older integrations drive the spinner with string commands such as
//! `"touchspin.uponce"` plus an optional JSON argument. This table maps them
//! onto [`SpinCommand`]; the engine itself only sees the typed form.

use serde_json::Value;
use touchspin_core::error::{Result, SpinnerError};
use touchspin_core::settings::SettingsPatch;

use crate::command::{SpinCommand, ValueInput};

const PREFIX: &str = "touchspin.";

/// Translate a legacy command name and argument into a typed command
pub fn translate(name: &str, arg: Option<&Value>) -> Result<SpinCommand> {
    let trimmed = name.trim();
    let short = trimmed
        .strip_prefix(PREFIX)
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    let command = match short.as_str() {
        "uponce" => SpinCommand::UpOnce,
        "downonce" => SpinCommand::DownOnce,
        "startupspin" => SpinCommand::StartUpSpin,
        "startdownspin" => SpinCommand::StartDownSpin,
        "stopspin" => SpinCommand::StopSpin,
        "destroy" => SpinCommand::Destroy,
        "updatesettings" => SpinCommand::UpdateSettings(settings_arg(name, arg)?),
        "setvalue" | "set" => SpinCommand::SetValue(value_arg(name, arg)?),
        _ => return Err(SpinnerError::UnknownCommand(name.to_string())),
    };

    tracing::trace!(name, command = command.name(), "legacy command translated");
    Ok(command)
}

fn settings_arg(name: &str, arg: Option<&Value>) -> Result<SettingsPatch> {
    match arg {
        None | Some(Value::Null) => Ok(SettingsPatch::default()),
        Some(value @ Value::Object(_)) => Ok(SettingsPatch::from_json_value(value)),
        Some(_) => Err(invalid(name, "expected a settings object")),
    }
}

fn value_arg(name: &str, arg: Option<&Value>) -> Result<ValueInput> {
    match arg {
        Some(Value::Number(number)) => number
            .as_f64()
            .map(ValueInput::Number)
            .ok_or_else(|| invalid(name, "number out of range")),
        Some(Value::String(text)) => Ok(ValueInput::Text(text.clone())),
        Some(_) => Err(invalid(name, "expected a number or a string")),
        None => Err(invalid(name, "missing value")),
    }
}

fn invalid(name: &str, reason: &str) -> SpinnerError {
    SpinnerError::InvalidCommandArgument {
        command: name.to_string(),
        reason: reason.to_string(),
    }
}
