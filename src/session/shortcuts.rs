use crate::config::KeyBindings;
use crate::session::messages::Command;

/// A key press from the interactive surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Escape,
}

/// What a key or pointer event asks the editor to do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Command(Command),
    /// End the editing session without saving
    Exit,
}

/// Map a key press to an action.
///
/// The fixed bindings win; any other printable character toggles class
/// visibility.
pub fn handle_key_event(key: Key, keys: &KeyBindings) -> Option<Action> {
    match key {
        Key::Escape => Some(Action::Exit),
        Key::Character(c) if c == keys.save => Some(Action::Command(Command::Save)),
        Key::Character(c) if c == keys.undo => Some(Action::Command(Command::Undo)),
        Key::Character(c) if c == keys.delete_point => {
            Some(Action::Command(Command::DeleteSelectedPoint))
        }
        Key::Character(c) if !c.is_control() && !c.is_whitespace() => {
            Some(Action::Command(Command::ToggleVisibility(c)))
        }
        Key::Character(_) => None,
    }
}
