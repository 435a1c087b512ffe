//! Gesture translation
//!
//! Maps raw input from the host (button presses, arrow keys, wheel, typing)
//! onto spinner operations. The host decides what counts as a gesture; this
//! module only decides what each one means.

use touchspin_core::spin::Direction;
use touchspin_timer::Clock;

use crate::spinner::TouchSpin;

/// Virtual key codes the spinner reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const UP: KeyCode = KeyCode(0x26);
    pub const DOWN: KeyCode = KeyCode(0x28);

    /// Spin direction for an arrow key
    pub fn direction(self) -> Option<Direction> {
        match self {
            KeyCode::UP => Some(Direction::Up),
            KeyCode::DOWN => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Input delivered by the host
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    /// Pointer or touch pressed on an up/down button
    ButtonDown(Direction),
    /// Pointer or touch released anywhere
    ButtonRelease,
    /// Pointer left a button while pressed
    PointerLeave,
    KeyDown { key: KeyCode, repeat: bool },
    KeyUp { key: KeyCode },
    /// Wheel scroll. Negative `delta_y` scrolls up.
    Wheel { delta_y: f32, focused: bool },
    /// Live typing
    Input { text: String },
    Blur { text: String },
    /// Enter pressed in the input
    Submit { text: String },
}

/// Apply a gesture. Returns true when the gesture was consumed, in which case
/// the host should suppress its default handling.
pub fn handle_gesture<C: Clock>(spinner: &mut TouchSpin<C>, gesture: &Gesture) -> bool {
    if spinner.is_destroyed() {
        return false;
    }

    match gesture {
        Gesture::ButtonDown(direction) => {
            press(spinner, *direction);
            true
        }
        Gesture::ButtonRelease | Gesture::PointerLeave => {
            spinner.stop_spin();
            false
        }
        Gesture::KeyDown { key, repeat } => {
            let Some(direction) = key.direction() else {
                return false;
            };
            // Held keys repeat through the spin session, not the OS
            if !*repeat && spinner.spin_direction() != Some(direction) {
                press(spinner, direction);
            }
            true
        }
        Gesture::KeyUp { key } => {
            if key.direction().is_none() {
                return false;
            }
            spinner.stop_spin();
            true
        }
        Gesture::Wheel { delta_y, focused } => {
            if !*focused || !spinner.settings().mouse_wheel || !spinner.is_enabled() {
                return false;
            }
            if *delta_y < 0.0 {
                spinner.up_once();
            } else if *delta_y > 0.0 {
                spinner.down_once();
            }
            true
        }
        Gesture::Input { text } => {
            spinner.input_text(text);
            false
        }
        Gesture::Blur { text } => {
            spinner.sanitize(text);
            false
        }
        Gesture::Submit { text } => {
            spinner.sanitize(text);
            true
        }
    }
}

fn press<C: Clock>(spinner: &mut TouchSpin<C>, direction: Direction) {
    tracing::trace!(?direction, "press");
    spinner.step_once(direction);
    spinner.start_spin(direction);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use touchspin_core::events::{EventKind, ExternalFacts, SpinEvent};
    use touchspin_core::settings::SettingsPatch;
    use touchspin_timer::ManualClock;

    fn setup(text: &str, patch: SettingsPatch) -> (TouchSpin<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let spinner = TouchSpin::builder()
            .input_text(text)
            .settings(patch)
            .clock(clock.clone())
            .build();
        (spinner, clock)
    }

    fn record(spinner: &mut TouchSpin<ManualClock>) -> Arc<Mutex<Vec<SpinEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        spinner.subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_button_press_steps_then_spins() {
        let (mut spinner, clock) = setup("0", SettingsPatch::new());

        assert!(handle_gesture(&mut spinner, &Gesture::ButtonDown(Direction::Up)));
        assert_eq!(spinner.get_value(), 1.0);
        assert_eq!(spinner.spin_direction(), Some(Direction::Up));

        clock.advance(500);
        spinner.poll();
        assert_eq!(spinner.get_value(), 2.0);

        handle_gesture(&mut spinner, &Gesture::ButtonRelease);
        assert!(!spinner.is_spinning());
        assert_eq!(spinner.next_deadline(), None);
    }

    #[test]
    fn test_pointer_leave_stops_spin() {
        let (mut spinner, _clock) = setup("0", SettingsPatch::new());
        handle_gesture(&mut spinner, &Gesture::ButtonDown(Direction::Down));
        assert!(spinner.is_spinning());

        handle_gesture(&mut spinner, &Gesture::PointerLeave);
        assert!(!spinner.is_spinning());
    }

    #[test]
    fn test_key_repeat_does_not_restep() {
        let (mut spinner, _clock) = setup("10", SettingsPatch::new());
        let events = record(&mut spinner);

        let down = Gesture::KeyDown {
            key: KeyCode::UP,
            repeat: false,
        };
        let held = Gesture::KeyDown {
            key: KeyCode::UP,
            repeat: true,
        };
        assert!(handle_gesture(&mut spinner, &down));
        assert!(handle_gesture(&mut spinner, &held));
        assert!(handle_gesture(&mut spinner, &down));
        assert_eq!(spinner.get_value(), 11.0);

        let starts = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == EventKind::SpinStarted)
            .count();
        assert_eq!(starts, 1);

        assert!(handle_gesture(&mut spinner, &Gesture::KeyUp { key: KeyCode::UP }));
        assert!(!spinner.is_spinning());
    }

    #[test]
    fn test_other_keys_ignored() {
        let (mut spinner, _clock) = setup("10", SettingsPatch::new());
        let key = KeyCode(0x41);

        assert!(!handle_gesture(
            &mut spinner,
            &Gesture::KeyDown { key, repeat: false }
        ));
        assert!(!handle_gesture(&mut spinner, &Gesture::KeyUp { key }));
        assert_eq!(spinner.get_value(), 10.0);
    }

    #[test]
    fn test_wheel_requires_focus_and_setting() {
        let (mut spinner, _clock) = setup("10", SettingsPatch::new());

        let up = Gesture::Wheel {
            delta_y: -3.0,
            focused: true,
        };
        assert!(handle_gesture(&mut spinner, &up));
        assert_eq!(spinner.get_value(), 11.0);

        let down = Gesture::Wheel {
            delta_y: 3.0,
            focused: true,
        };
        handle_gesture(&mut spinner, &down);
        assert_eq!(spinner.get_value(), 10.0);

        let unfocused = Gesture::Wheel {
            delta_y: -3.0,
            focused: false,
        };
        assert!(!handle_gesture(&mut spinner, &unfocused));
        assert_eq!(spinner.get_value(), 10.0);

        spinner.update_settings(&SettingsPatch::new().mouse_wheel(false));
        assert!(!handle_gesture(&mut spinner, &up));
        assert_eq!(spinner.get_value(), 10.0);
    }

    #[test]
    fn test_typing_then_blur_sanitizes() {
        let (mut spinner, _clock) = setup("0", SettingsPatch::new().step(5.0));
        let events = record(&mut spinner);

        handle_gesture(&mut spinner, &Gesture::Input { text: "7".into() });
        handle_gesture(&mut spinner, &Gesture::Input { text: "77".into() });
        assert_eq!(spinner.display_text(), "77");
        assert!(events.lock().unwrap().is_empty());

        handle_gesture(&mut spinner, &Gesture::Blur { text: "77".into() });
        assert_eq!(spinner.get_value(), 75.0);
        assert_eq!(
            *events.lock().unwrap(),
            vec![SpinEvent::Change { value: 75.0 }]
        );
    }

    #[test]
    fn test_submit_is_consumed() {
        let (mut spinner, _clock) = setup("0", SettingsPatch::new());
        assert!(handle_gesture(
            &mut spinner,
            &Gesture::Submit { text: "4".into() }
        ));
        assert_eq!(spinner.get_value(), 4.0);
    }

    #[test]
    fn test_disabled_input_ignores_gestures() {
        let (mut spinner, _clock) = setup("5", SettingsPatch::new());
        spinner.notify_external_fact(ExternalFacts::disabled(true));

        handle_gesture(&mut spinner, &Gesture::ButtonDown(Direction::Up));
        assert!(!handle_gesture(
            &mut spinner,
            &Gesture::Wheel {
                delta_y: -1.0,
                focused: true
            }
        ));
        assert_eq!(spinner.get_value(), 5.0);
        assert!(!spinner.is_spinning());
    }
}
