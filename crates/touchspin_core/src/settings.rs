//! Settings store
//!
//! `Settings` is always fully populated. Updates arrive as a [`SettingsPatch`]
//! and are merged field by field onto the current snapshot, so a partial update
//! never resets fields it does not mention. Invalid values are coerced to the
//! nearest valid value and logged; nothing here fails.
//!
//! # Example
//!
//! ```rust
//! use touchspin_core::settings::{SettingsPatch, SettingsStore};
//!
//! let mut store = SettingsStore::new(&SettingsPatch::new().step(5.0));
//! store.merge(&SettingsPatch::new().min(2.0));
//! store.merge(&SettingsPatch::new().max(12.0));
//!
//! assert_eq!(store.settings().min, 2.0);
//! assert_eq!(store.settings().max, 12.0);
//! assert_eq!(store.settings().step, 5.0);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, SpinnerError};
use crate::events::ExternalFacts;
use crate::numeric::{
    align_to_step, ceil_to_decimals, floor_to_decimals, parse_number, sanitize_step,
    StepAlignment, MAX_DECIMALS,
};

/// Complete configuration snapshot
///
/// Deserializing goes through [`SettingsPatch`] and the same coercions as a
/// merge, so a loaded snapshot is always normalized.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Quantization unit, always positive
    pub step: f64,
    /// Display and comparison precision
    pub decimals: u32,
    /// Snapping policy for off-grid values
    pub step_alignment: StepAlignment,
    /// Used at construction when the input text is empty or not a number
    pub initial_value: Option<f64>,
    /// Used on sanitize when the typed text is empty or not a number
    pub replacement_value: Option<f64>,
    /// Interval between auto-repeat steps
    pub step_interval_ms: u64,
    /// Delay before the first auto-repeat step
    pub step_delay_ms: u64,
    /// Accelerate sustained spins
    pub boosting: bool,
    /// Tick count at which boosting kicks in
    pub boost_at_step_count: u32,
    /// Cap on the boosted step (None = uncapped)
    pub max_boosted_step: Option<f64>,
    /// Whether wheel gestures step the value
    pub mouse_wheel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            decimals: 0,
            step_alignment: StepAlignment::Round,
            initial_value: None,
            replacement_value: None,
            step_interval_ms: 100,
            step_delay_ms: 500,
            boosting: false,
            boost_at_step_count: 10,
            max_boosted_step: None,
            mouse_wheel: true,
        }
    }
}

impl Settings {
    /// Build a snapshot from defaults plus `patch`
    pub fn from_patch(patch: &SettingsPatch) -> Self {
        Self::default().merged(patch)
    }

    /// New snapshot with every field present in `patch` applied on top of `self`
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut next = self.clone();

        if let Some(min) = patch.min {
            if min.is_finite() {
                next.min = min;
            } else {
                tracing::warn!(min, "ignoring non-finite min");
            }
        }
        if let Some(max) = patch.max {
            if max.is_finite() {
                next.max = max;
            } else {
                tracing::warn!(max, "ignoring non-finite max");
            }
        }
        if let Some(step) = patch.step {
            next.step = step;
        }
        if let Some(decimals) = patch.decimals {
            next.decimals = decimals;
        }
        if let Some(alignment) = patch.step_alignment {
            next.step_alignment = alignment;
        }
        if let Some(initial) = patch.initial_value {
            next.initial_value = initial;
        }
        if let Some(replacement) = patch.replacement_value {
            next.replacement_value = replacement;
        }
        if let Some(interval) = patch.step_interval_ms {
            next.step_interval_ms = interval;
        }
        if let Some(delay) = patch.step_delay_ms {
            next.step_delay_ms = delay;
        }
        if let Some(boosting) = patch.boosting {
            next.boosting = boosting;
        }
        if let Some(at) = patch.boost_at_step_count {
            next.boost_at_step_count = at;
        }
        if let Some(cap) = patch.max_boosted_step {
            next.max_boosted_step = cap;
        }
        if let Some(wheel) = patch.mouse_wheel {
            next.mouse_wheel = wheel;
        }

        next.normalize();
        next
    }

    /// Coerce out-of-range values to the nearest valid ones
    fn normalize(&mut self) {
        let step = sanitize_step(self.step);
        if step != self.step {
            tracing::warn!(step = self.step, "step must be positive, using 1");
            self.step = step;
        }

        if self.decimals > MAX_DECIMALS {
            tracing::warn!(decimals = self.decimals, "decimals capped");
            self.decimals = MAX_DECIMALS;
        }

        if self.min > self.max {
            tracing::warn!(
                min = self.min,
                max = self.max,
                "min exceeds max, collapsing range onto min"
            );
            self.max = self.min;
        }
        self.fit_bounds();

        if self.step_interval_ms == 0 {
            tracing::warn!("step interval must be positive, using 1ms");
            self.step_interval_ms = 1;
        }
        if self.step_delay_ms == 0 {
            tracing::warn!("step delay must be positive, using 1ms");
            self.step_delay_ms = 1;
        }
        if self.boost_at_step_count == 0 {
            tracing::warn!("boost threshold must be positive, using 1");
            self.boost_at_step_count = 1;
        }

        self.max_boosted_step = match self.max_boosted_step {
            Some(cap) if cap.is_finite() && cap > 0.0 => Some(cap.max(self.step)),
            Some(cap) => {
                tracing::warn!(cap, "ignoring invalid boost cap");
                None
            }
            None => None,
        };

        self.initial_value = self.initial_value.filter(|v| v.is_finite());
        self.replacement_value = self.replacement_value.filter(|v| v.is_finite());
    }

    /// Pull the bounds inside the range onto values a commit can produce
    ///
    /// `min` moves up and `max` down to `decimals` places, then `max` moves
    /// down onto the grid `min + n * step` unless alignment is off.
    fn fit_bounds(&mut self) {
        let min = ceil_to_decimals(self.min, self.decimals);
        let mut max = floor_to_decimals(self.max, self.decimals);
        if self.step_alignment != StepAlignment::None {
            let on_grid = align_to_step(max, min, self.step, StepAlignment::Floor);
            max = floor_to_decimals(on_grid, self.decimals);
        }
        let max = max.max(min);

        if min != self.min || max != self.max {
            tracing::warn!(
                min = self.min,
                max = self.max,
                fitted_min = min,
                fitted_max = max,
                "bounds moved onto the step and decimals grid"
            );
            self.min = min;
            self.max = max;
        }
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let patch = SettingsPatch::deserialize(deserializer)?;
        Ok(Settings::from_patch(&patch))
    }
}

impl From<SettingsPatch> for Settings {
    fn from(patch: SettingsPatch) -> Self {
        Settings::from_patch(&patch)
    }
}

/// Partial settings update. `None` leaves the current value in place.
///
/// For the optional fields, `Some(None)` clears the value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsPatch {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub decimals: Option<u32>,
    pub step_alignment: Option<StepAlignment>,
    pub initial_value: Option<Option<f64>>,
    pub replacement_value: Option<Option<f64>>,
    pub step_interval_ms: Option<u64>,
    pub step_delay_ms: Option<u64>,
    pub boosting: Option<bool>,
    pub boost_at_step_count: Option<u32>,
    pub max_boosted_step: Option<Option<f64>>,
    pub mouse_wheel: Option<bool>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn step_alignment(mut self, alignment: StepAlignment) -> Self {
        self.step_alignment = Some(alignment);
        self
    }

    pub fn initial_value(mut self, value: impl Into<Option<f64>>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    pub fn replacement_value(mut self, value: impl Into<Option<f64>>) -> Self {
        self.replacement_value = Some(value.into());
        self
    }

    pub fn step_interval_ms(mut self, ms: u64) -> Self {
        self.step_interval_ms = Some(ms);
        self
    }

    pub fn step_delay_ms(mut self, ms: u64) -> Self {
        self.step_delay_ms = Some(ms);
        self
    }

    pub fn boosting(mut self, boosting: bool) -> Self {
        self.boosting = Some(boosting);
        self
    }

    pub fn boost_at_step_count(mut self, count: u32) -> Self {
        self.boost_at_step_count = Some(count);
        self
    }

    pub fn max_boosted_step(mut self, cap: impl Into<Option<f64>>) -> Self {
        self.max_boosted_step = Some(cap.into());
        self
    }

    pub fn mouse_wheel(mut self, enabled: bool) -> Self {
        self.mouse_wheel = Some(enabled);
        self
    }

    /// Parse a JSON settings document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SpinnerError::ConfigParse(e.to_string()))?;
        Ok(Self::from_json_value(&value))
    }

    /// Parse a TOML settings document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Value =
            toml::from_str(text).map_err(|e| SpinnerError::ConfigParse(e.to_string()))?;
        let value =
            serde_json::to_value(table).map_err(|e| SpinnerError::ConfigParse(e.to_string()))?;
        Ok(Self::from_json_value(&value))
    }

    /// Leniently extract a patch from raw settings
    ///
    /// Keys may be camelCase, snake_case or the legacy lowercase plugin
    /// names. Wrong-typed fields are skipped with a warning.
    pub fn from_json_value(value: &Value) -> Self {
        let mut patch = Self::default();

        let Some(object) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!("settings must be an object, ignoring");
            }
            return patch;
        };

        for (key, raw) in object {
            let Some(field) = Field::lookup(key) else {
                tracing::debug!(key = key.as_str(), "ignoring unknown setting");
                continue;
            };
            if !patch.apply_raw(field, raw) {
                tracing::warn!(key = key.as_str(), value = %raw, "ignoring invalid setting");
            }
        }

        patch
    }

    fn apply_raw(&mut self, field: Field, raw: &Value) -> bool {
        match field {
            Field::Min => set(&mut self.min, number(raw)),
            Field::Max => set(&mut self.max, number(raw)),
            Field::Step => set(&mut self.step, number(raw)),
            Field::Decimals => set(&mut self.decimals, small_count(raw)),
            Field::StepAlignment => set(
                &mut self.step_alignment,
                raw.as_str().and_then(|s| s.parse().ok()),
            ),
            Field::InitialValue => set(&mut self.initial_value, optional_number(raw)),
            Field::ReplacementValue => set(&mut self.replacement_value, optional_number(raw)),
            Field::StepIntervalMs => set(&mut self.step_interval_ms, count(raw)),
            Field::StepDelayMs => set(&mut self.step_delay_ms, count(raw)),
            Field::Boosting => set(&mut self.boosting, flag(raw)),
            Field::BoostAtStepCount => set(&mut self.boost_at_step_count, small_count(raw)),
            Field::MaxBoostedStep => set(&mut self.max_boosted_step, optional_number(raw)),
            Field::MouseWheel => set(&mut self.mouse_wheel, flag(raw)),
        }
    }
}

/// Lenient, like [`SettingsPatch::from_json_value`]
impl<'de> Deserialize<'de> for SettingsPatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json_value(&value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Min,
    Max,
    Step,
    Decimals,
    StepAlignment,
    InitialValue,
    ReplacementValue,
    StepIntervalMs,
    StepDelayMs,
    Boosting,
    BoostAtStepCount,
    MaxBoostedStep,
    MouseWheel,
}

impl Field {
    /// Match a key regardless of case and `_`/`-` separators
    fn lookup(key: &str) -> Option<Self> {
        let folded: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        Some(match folded.as_str() {
            "min" => Field::Min,
            "max" => Field::Max,
            "step" => Field::Step,
            "decimals" => Field::Decimals,
            "stepalignment" | "forcestepdivisibility" => Field::StepAlignment,
            "initialvalue" | "initval" => Field::InitialValue,
            "replacementvalue" | "replacementval" => Field::ReplacementValue,
            "stepintervalms" | "stepinterval" => Field::StepIntervalMs,
            "stepdelayms" | "stepintervaldelay" => Field::StepDelayMs,
            "boosting" | "booster" => Field::Boosting,
            "boostatstepcount" | "boostat" => Field::BoostAtStepCount,
            "maxboostedstep" => Field::MaxBoostedStep,
            "mousewheel" => Field::MouseWheel,
            _ => return None,
        })
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Empty string, null and `false` clear the field
fn optional_number(raw: &Value) -> Option<Option<f64>> {
    match raw {
        Value::Null | Value::Bool(false) => Some(None),
        Value::String(s) if s.trim().is_empty() => Some(None),
        other => number(other).map(Some),
    }
}

/// Non-negative whole number; negatives saturate at zero
fn count(raw: &Value) -> Option<u64> {
    number(raw).map(|v| if v <= 0.0 { 0 } else { v.round() as u64 })
}

/// [`count`] saturating at `u32::MAX`
fn small_count(raw: &Value) -> Option<u32> {
    count(raw).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Owns the current settings and the externally asserted facts
#[derive(Clone, Debug)]
pub struct SettingsStore {
    current: Settings,
    disabled: bool,
    readonly: bool,
}

impl SettingsStore {
    /// Fill unset fields with defaults
    pub fn new(patch: &SettingsPatch) -> Self {
        Self {
            current: Settings::from_patch(patch),
            disabled: false,
            readonly: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.current
    }

    /// Merge `patch` over the current snapshot and return the result
    pub fn merge(&mut self, patch: &SettingsPatch) -> &Settings {
        self.current = self.current.merged(patch);
        tracing::debug!(settings = ?self.current, "settings merged");
        &self.current
    }

    /// Record disabled/readonly facts. Returns the new enabled state.
    pub fn assert_facts(&mut self, facts: ExternalFacts) -> bool {
        if let Some(disabled) = facts.disabled {
            self.disabled = disabled;
        }
        if let Some(readonly) = facts.readonly {
            self.readonly = readonly;
        }
        self.is_enabled()
    }

    /// True only when neither disabled nor readonly is asserted
    pub fn is_enabled(&self) -> bool {
        !self.disabled && !self.readonly
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(&SettingsPatch::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.min, 0.0);
        assert_eq!(settings.max, 100.0);
        assert_eq!(settings.step, 1.0);
        assert_eq!(settings.decimals, 0);
        assert_eq!(settings.step_alignment, StepAlignment::Round);
        assert!(!settings.boosting);
        assert!(settings.step_interval_ms > 0);
        assert!(settings.step_delay_ms > 0);
    }

    #[test]
    fn test_merge_is_non_destructive() {
        let mut store = SettingsStore::new(&SettingsPatch::new().step(5.0).decimals(2));
        store.merge(&SettingsPatch::new().min(2.0));
        store.merge(&SettingsPatch::new().max(12.0));

        let settings = store.settings();
        assert_eq!(settings.min, 2.0);
        assert_eq!(settings.max, 12.0);
        assert_eq!(settings.step, 5.0);
        assert_eq!(settings.decimals, 2);
    }

    #[test]
    fn test_invalid_step_coerced() {
        assert_eq!(Settings::from_patch(&SettingsPatch::new().step(-2.0)).step, 1.0);
        assert_eq!(Settings::from_patch(&SettingsPatch::new().step(0.0)).step, 1.0);
        assert_eq!(
            Settings::from_patch(&SettingsPatch::new().step(f64::NAN)).step,
            1.0
        );
    }

    #[test]
    fn test_inverted_range_collapses_onto_min() {
        let settings = Settings::from_patch(&SettingsPatch::new().min(50.0).max(10.0));
        assert_eq!(settings.min, 50.0);
        assert_eq!(settings.max, 50.0);
    }

    #[test]
    fn test_non_finite_bounds_keep_previous() {
        let base = Settings::from_patch(&SettingsPatch::new().min(-5.0).max(5.0));
        let next = base.merged(&SettingsPatch::new().min(f64::NEG_INFINITY).max(f64::NAN));
        assert_eq!(next.min, -5.0);
        assert_eq!(next.max, 5.0);
    }

    #[test]
    fn test_boost_cap_never_below_step() {
        let settings =
            Settings::from_patch(&SettingsPatch::new().step(10.0).max_boosted_step(4.0));
        assert_eq!(settings.max_boosted_step, Some(10.0));

        let cleared = settings.merged(&SettingsPatch::new().max_boosted_step(None));
        assert_eq!(cleared.max_boosted_step, None);
    }

    #[test]
    fn test_zero_timings_coerced() {
        let settings = Settings::from_patch(
            &SettingsPatch::new()
                .step_interval_ms(0)
                .step_delay_ms(0)
                .boost_at_step_count(0),
        );
        assert_eq!(settings.step_interval_ms, 1);
        assert_eq!(settings.step_delay_ms, 1);
        assert_eq!(settings.boost_at_step_count, 1);
    }

    #[test]
    fn test_lenient_json_accepts_legacy_and_camel_keys() {
        let patch = SettingsPatch::from_json_value(&json!({
            "min": "-10",
            "max": 10,
            "stepIntervalMs": 50,
            "stepintervaldelay": 300,
            "forcestepdivisibility": "floor",
            "booster": true,
            "boostat": 5,
            "maxboostedstep": false,
            "initval": "",
            "mouse_wheel": "false",
        }));

        assert_eq!(patch.min, Some(-10.0));
        assert_eq!(patch.max, Some(10.0));
        assert_eq!(patch.step_interval_ms, Some(50));
        assert_eq!(patch.step_delay_ms, Some(300));
        assert_eq!(patch.step_alignment, Some(StepAlignment::Floor));
        assert_eq!(patch.boosting, Some(true));
        assert_eq!(patch.boost_at_step_count, Some(5));
        assert_eq!(patch.max_boosted_step, Some(None));
        assert_eq!(patch.initial_value, Some(None));
        assert_eq!(patch.mouse_wheel, Some(false));
    }

    #[test]
    fn test_lenient_json_skips_wrong_types() {
        let patch = SettingsPatch::from_json_value(&json!({
            "step": [1, 2],
            "decimals": {"a": 1},
            "stepAlignment": "sideways",
            "boosting": 3,
            "max": 20,
            "colour": "red",
        }));

        assert_eq!(
            patch,
            SettingsPatch {
                max: Some(20.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_non_object_settings_are_empty() {
        assert_eq!(SettingsPatch::from_json_value(&json!(42)), SettingsPatch::default());
        assert_eq!(SettingsPatch::from_json_value(&Value::Null), SettingsPatch::default());
    }

    #[test]
    fn test_negative_decimals_saturate() {
        let patch = SettingsPatch::from_json_value(&json!({ "decimals": -3 }));
        assert_eq!(patch.decimals, Some(0));
    }

    #[test]
    fn test_from_toml_str() {
        let patch = SettingsPatch::from_toml_str(
            r#"
            min = 1
            max = 9.5
            step = 0.5
            decimals = 1
            step_alignment = "ceil"
            "#,
        )
        .unwrap();

        let settings = Settings::from_patch(&patch);
        assert_eq!(settings.min, 1.0);
        assert_eq!(settings.max, 9.5);
        assert_eq!(settings.step, 0.5);
        assert_eq!(settings.decimals, 1);
        assert_eq!(settings.step_alignment, StepAlignment::Ceil);
    }

    #[test]
    fn test_unparseable_document_is_an_error() {
        assert!(matches!(
            SettingsPatch::from_json_str("{ not json"),
            Err(SpinnerError::ConfigParse(_))
        ));
        assert!(matches!(
            SettingsPatch::from_toml_str("min = = 1"),
            Err(SpinnerError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_settings_serde_round_trip_uses_camel_case() {
        let settings = Settings::from_patch(&SettingsPatch::new().step(2.0));
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["stepIntervalMs"], json!(100));

        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_max_moves_down_onto_step_grid() {
        let settings = Settings::from_patch(&SettingsPatch::new().max(7.0).step(5.0));
        assert_eq!(settings.max, 5.0);

        let settings =
            Settings::from_patch(&SettingsPatch::new().min(1.0).max(23.0).step(5.0));
        assert_eq!(settings.min, 1.0);
        assert_eq!(settings.max, 21.0);

        // A later step change re-fits the stored bound
        let settings = settings.merged(&SettingsPatch::new().step(4.0));
        assert_eq!(settings.max, 21.0);
        let settings = settings.merged(&SettingsPatch::new().step(3.0));
        assert_eq!(settings.max, 19.0);
    }

    #[test]
    fn test_bounds_rounded_inwards_to_decimals() {
        let settings = Settings::from_patch(
            &SettingsPatch::new()
                .min(0.25)
                .max(7.55)
                .step(0.05)
                .decimals(1),
        );
        assert_eq!(settings.min, 0.3);
        assert_eq!(settings.max, 7.5);
    }

    #[test]
    fn test_unaligned_bounds_only_follow_decimals() {
        let settings = Settings::from_patch(
            &SettingsPatch::new()
                .max(7.0)
                .step(5.0)
                .step_alignment(StepAlignment::None),
        );
        assert_eq!(settings.max, 7.0);
    }

    #[test]
    fn test_oversized_counts_saturate() {
        let patch = SettingsPatch::from_json_value(&json!({
            "decimals": 4_294_967_298u64,
            "boostat": 4_294_967_296u64,
        }));
        assert_eq!(patch.decimals, Some(u32::MAX));
        assert_eq!(patch.boost_at_step_count, Some(u32::MAX));
        assert_eq!(Settings::from_patch(&patch).decimals, MAX_DECIMALS);
    }

    #[test]
    fn test_deserialized_settings_are_normalized() {
        let settings: Settings = serde_json::from_value(json!({
            "min": 10,
            "max": 4,
            "step": -1,
            "stepDelayMs": 0,
        }))
        .unwrap();

        assert_eq!(settings.step, 1.0);
        assert_eq!(settings.min, 10.0);
        assert_eq!(settings.max, 10.0);
        assert_eq!(settings.step_delay_ms, 1);
        assert_eq!(settings.step_interval_ms, 100);
    }

    #[test]
    fn test_patch_deserializes_leniently() {
        let patch: SettingsPatch = serde_json::from_value(json!({
            "maxboostedstep": null,
            "step_alignment": "ceil",
            "booster": "yes",
        }))
        .unwrap();

        assert_eq!(patch.max_boosted_step, Some(None));
        assert_eq!(patch.step_alignment, Some(StepAlignment::Ceil));
        assert_eq!(patch.boosting, None);
    }

    #[test]
    fn test_external_facts_control_enablement() {
        let mut store = SettingsStore::default();
        assert!(store.is_enabled());

        assert!(!store.assert_facts(ExternalFacts::disabled(true)));
        assert!(store.is_disabled());

        assert!(!store.assert_facts(ExternalFacts::readonly(true)));
        assert!(!store.assert_facts(ExternalFacts::disabled(false)));
        assert!(store.assert_facts(ExternalFacts::readonly(false)));
    }
}
