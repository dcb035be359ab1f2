//! Pointer and keyboard input delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Held alt turns a left drag into a pan.
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::default()
        }
    }
}

/// A pointer event in screen (canvas element) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn left(position: Point) -> Self {
        Self {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
        }
    }

    pub fn right(position: Point) -> Self {
        Self {
            button: MouseButton::Right,
            ..Self::left(position)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_secondary(&self) -> bool {
        self.button == MouseButton::Right
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Delete,
    Backspace,
    Escape,
    Other,
}

impl EditorKey {
    /// Map a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => EditorKey::Delete,
            "Backspace" => EditorKey::Backspace,
            "Escape" => EditorKey::Escape,
            _ => EditorKey::Other,
        }
    }

    pub fn is_delete(self) -> bool {
        matches!(self, EditorKey::Delete | EditorKey::Backspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert!(EditorKey::from_name("Delete").is_delete());
        assert!(EditorKey::from_name("Backspace").is_delete());
        assert!(!EditorKey::from_name("a").is_delete());
    }

    #[test]
    fn test_pointer_constructors() {
        let ev = PointerEvent::right(Point::new(3.0, 4.0)).with_modifiers(Modifiers::alt());
        assert!(ev.is_secondary());
        assert!(ev.modifiers.alt);
        assert!(!PointerEvent::left(Point::ZERO).is_secondary());
    }
}
