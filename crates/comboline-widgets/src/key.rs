//! Key bindings for the combobox's navigation keys.
//!
//! Only four keys mean anything to the list itself: confirm, dismiss, and
//! moving the highlight up or down. [`NavKeys::classify`] sorts an incoming
//! key into one of those or [`NavKey::Other`], which the field treats as an
//! edit.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key binding that maps one or more key combinations to a described action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The set of key combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
    /// A human-readable description of the action.
    pub description: String,
    /// Disabled bindings never match.
    pub enabled: bool,
}

/// A single key press with modifier keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombination {
    /// The base key code.
    pub code: KeyCode,
    /// Modifier keys that must be held alongside the base key.
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Create a binding for several key combinations.
    pub fn with_keys(keys: Vec<KeyCombination>, description: impl Into<String>) -> Self {
        Self {
            keys,
            description: description.into(),
            enabled: true,
        }
    }

    /// Whether `event` matches one of the combinations.
    ///
    /// Modifiers must match exactly, so plain `n` never triggers a `Ctrl+N`
    /// binding and `Shift+Enter` is not `Enter`.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.enabled
            && self
                .keys
                .iter()
                .any(|k| k.code == event.code && event.modifiers == k.modifiers)
    }

    /// Set whether this binding is enabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl KeyCombination {
    /// A key with no modifiers.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// A key with the Ctrl modifier.
    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

/// What a key means to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Confirm the highlighted entry.
    Enter,
    /// Leave the field without selecting.
    Escape,
    /// Highlight the previous entry.
    ArrowUp,
    /// Highlight the next entry.
    ArrowDown,
    /// Anything else; handled as a text edit.
    Other,
}

/// Navigation key bindings for a combobox.
#[derive(Debug, Clone)]
pub struct NavKeys {
    /// Confirm the highlighted entry.
    pub confirm: Binding,
    /// Leave the field.
    pub dismiss: Binding,
    /// Highlight the previous entry.
    pub prev: Binding,
    /// Highlight the next entry.
    pub next: Binding,
}

impl Default for NavKeys {
    fn default() -> Self {
        Self {
            confirm: Binding::with_keys(vec![KeyCombination::new(KeyCode::Enter)], "select"),
            dismiss: Binding::with_keys(vec![KeyCombination::new(KeyCode::Esc)], "close"),
            prev: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::Up),
                    KeyCombination::ctrl(KeyCode::Char('p')),
                ],
                "previous",
            ),
            next: Binding::with_keys(
                vec![
                    KeyCombination::new(KeyCode::Down),
                    KeyCombination::ctrl(KeyCode::Char('n')),
                ],
                "next",
            ),
        }
    }
}

impl NavKeys {
    /// Sort a key event into a [`NavKey`].
    pub fn classify(&self, event: &KeyEvent) -> NavKey {
        if self.confirm.matches(event) {
            NavKey::Enter
        } else if self.dismiss.matches(event) {
            NavKey::Escape
        } else if self.prev.matches(event) {
            NavKey::ArrowUp
        } else if self.next.matches(event) {
            NavKey::ArrowDown
        } else {
            NavKey::Other
        }
    }
}
