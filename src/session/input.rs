//! Input controller: raw pointer/key/slider events to edit commands

use serde::Deserialize;

use crate::config::KeyBindings;
use crate::domain::ViewTransform;
use crate::session::messages::Command;
use crate::session::shortcuts::{Action, Key, handle_key_event};

/// Which pointer button went down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Left,
    Right,
}

/// Raw events from the interactive surface, pointer positions in display
/// coordinates
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        button: PointerButton,
    },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// A single printable character, or "escape"
    Key { key: String },
    /// New position of the confidence slider (0.0-1.0)
    Confidence { value: f32 },
    /// Nothing happened this tick
    Idle,
}

impl InputEvent {
    /// The key this event carries, if it is a recognizable key press
    pub fn key(&self) -> Option<Key> {
        let InputEvent::Key { key } = self else {
            return None;
        };
        if key.eq_ignore_ascii_case("escape") || key.eq_ignore_ascii_case("esc") {
            return Some(Key::Escape);
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Key::Character(c)),
            _ => None,
        }
    }
}

/// Translates device input into session commands
#[derive(Debug, Clone)]
pub struct InputController {
    transform: ViewTransform,
    keys: KeyBindings,
    epsilon: f32,
    pressed: bool,
    last_confidence: f32,
}

impl InputController {
    pub fn new(transform: ViewTransform, keys: KeyBindings, epsilon: f32, confidence: f32) -> Self {
        Self {
            transform,
            keys,
            epsilon,
            pressed: false,
            last_confidence: confidence,
        }
    }

    /// Map one raw event to an action. Slider events are not handled here;
    /// the slider is polled via [`InputController::poll_confidence`].
    /// Only the left button edits contours.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<Action> {
        match *event {
            InputEvent::PointerDown {
                button: PointerButton::Right,
                ..
            } => None,
            InputEvent::PointerDown { x, y, .. } => {
                self.pressed = true;
                Some(Action::Command(Command::SelectAt(self.transform.to_image(x, y))))
            }
            InputEvent::PointerMove { x, y } if self.pressed => {
                Some(Action::Command(Command::DragTo(self.transform.to_image(x, y))))
            }
            InputEvent::PointerUp => {
                self.pressed = false;
                Some(Action::Command(Command::ReleaseDrag))
            }
            InputEvent::Key { .. } => {
                let key = event.key()?;
                handle_key_event(key, &self.keys)
            }
            InputEvent::PointerMove { .. } | InputEvent::Confidence { .. } | InputEvent::Idle => {
                None
            }
        }
    }

    /// Compare the slider with the last polled value; a change beyond
    /// epsilon requests re-extraction
    pub fn poll_confidence(&mut self, value: f32) -> Option<Command> {
        let value = value.clamp(0.0, 1.0);
        if (value - self.last_confidence).abs() > self.epsilon {
            self.last_confidence = value;
            Some(Command::Reextract(value))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point;

    fn controller() -> InputController {
        InputController::new(ViewTransform::for_preview(0.5), KeyBindings::default(), 1e-3, 0.6)
    }

    #[test]
    fn test_pointer_sequence_maps_to_drag_commands() {
        let mut c = controller();
        assert_eq!(c.handle_event(&InputEvent::PointerMove { x: 5.0, y: 5.0 }), None);
        assert_eq!(
            c.handle_event(&InputEvent::PointerDown {
                x: 10.0,
                y: 20.0,
                button: PointerButton::Left,
            }),
            Some(Action::Command(Command::SelectAt(Point::new(20.0, 40.0))))
        );
        assert_eq!(
            c.handle_event(&InputEvent::PointerMove { x: 11.0, y: 21.0 }),
            Some(Action::Command(Command::DragTo(Point::new(22.0, 42.0))))
        );
        assert_eq!(
            c.handle_event(&InputEvent::PointerUp),
            Some(Action::Command(Command::ReleaseDrag))
        );
        assert_eq!(c.handle_event(&InputEvent::PointerMove { x: 12.0, y: 22.0 }), None);
    }

    #[test]
    fn test_right_button_does_not_edit_contours() {
        let mut c = controller();
        let down = InputEvent::PointerDown {
            x: 10.0,
            y: 20.0,
            button: PointerButton::Right,
        };
        assert_eq!(c.handle_event(&down), None);
        assert_eq!(c.handle_event(&InputEvent::PointerMove { x: 11.0, y: 21.0 }), None);
    }

    #[test]
    fn test_key_events() {
        let mut c = controller();
        let key = |k: &str| InputEvent::Key { key: k.to_string() };
        assert_eq!(c.handle_event(&key("escape")), Some(Action::Exit));
        assert_eq!(c.handle_event(&key("z")), Some(Action::Command(Command::Undo)));
        assert_eq!(
            c.handle_event(&key("r")),
            Some(Action::Command(Command::ToggleVisibility('r')))
        );
        assert_eq!(c.handle_event(&key("roof")), None);
    }

    #[test]
    fn test_confidence_change_beyond_epsilon_reextracts() {
        let mut c = controller();
        assert_eq!(c.poll_confidence(0.6), None);
        assert_eq!(c.poll_confidence(0.6005), None);
        assert_eq!(c.poll_confidence(0.7), Some(Command::Reextract(0.7)));
        assert_eq!(c.poll_confidence(0.7), None);
        assert_eq!(c.poll_confidence(1.5), Some(Command::Reextract(1.0)));
    }

    #[test]
    fn test_events_parse_from_json() {
        let ev: InputEvent = serde_json::from_str(r#"{"event":"pointer_down","x":3,"y":4}"#).unwrap();
        assert_eq!(
            ev,
            InputEvent::PointerDown {
                x: 3.0,
                y: 4.0,
                button: PointerButton::Left,
            }
        );
        let ev: InputEvent =
            serde_json::from_str(r#"{"event":"pointer_down","x":3,"y":4,"button":"right"}"#).unwrap();
        assert!(matches!(
            ev,
            InputEvent::PointerDown {
                button: PointerButton::Right,
                ..
            }
        ));
        let ev: InputEvent = serde_json::from_str(r#"{"event":"key","key":"s"}"#).unwrap();
        assert_eq!(ev, InputEvent::Key { key: "s".into() });
        let ev: InputEvent = serde_json::from_str(r#"{"event":"confidence","value":0.4}"#).unwrap();
        assert_eq!(ev, InputEvent::Confidence { value: 0.4 });
    }
}
