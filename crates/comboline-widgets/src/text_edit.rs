//! Single-line editing buffer behind a text field.
//!
//! The combobox keeps the field's text in a [`TextEditState`] and feeds it
//! every key that is not a navigation key. [`TextEditState::apply_key`] is
//! the terminal stand-in for the edit a browser performs natively between
//! `keydown` and `keyup`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of feeding a key to [`TextEditState::apply_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The text changed.
    Changed,
    /// Only the cursor moved.
    Moved,
    /// The key is not an editing key.
    Ignored,
}

/// Character buffer with a cursor, indexed by `char` rather than byte.
#[derive(Debug, Clone, Default)]
pub struct TextEditState {
    chars: Vec<char>,
    cursor: usize,
}

impl TextEditState {
    /// Create a new empty editing state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current value as a String.
    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    /// Replace the value and move the cursor to the end.
    pub fn set_value(&mut self, s: &str) {
        self.chars = s.chars().collect();
        self.cursor = self.chars.len();
    }

    /// Get the character buffer.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Cursor position (char index, 0-based).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Insert a string at the cursor, dropping control characters.
    pub fn insert_str(&mut self, s: &str) -> bool {
        let before = self.chars.len();
        for c in s.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
        self.chars.len() != before
    }

    /// Delete the character before the cursor (Backspace).
    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Delete the character under the cursor (Delete).
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    /// Delete the word before the cursor (Ctrl+W), including trailing spaces.
    pub fn delete_word_back(&mut self) -> bool {
        let end = self.cursor;
        let mut start = end;
        while start > 0 && self.chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && self.chars[start - 1] != ' ' {
            start -= 1;
        }
        if start == end {
            return false;
        }
        self.chars.drain(start..end);
        self.cursor = start;
        true
    }

    /// Delete from the start of the line to the cursor (Ctrl+U).
    pub fn kill_to_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.chars.drain(..self.cursor);
        self.cursor = 0;
        true
    }

    /// Move the cursor one character left; returns whether it moved.
    pub fn move_left(&mut self) -> bool {
        let moved = self.cursor > 0;
        self.cursor = self.cursor.saturating_sub(1);
        moved
    }

    /// Move the cursor one character right; returns whether it moved.
    pub fn move_right(&mut self) -> bool {
        let moved = self.cursor < self.chars.len();
        if moved {
            self.cursor += 1;
        }
        moved
    }

    /// Move the cursor to the start.
    pub fn move_home(&mut self) -> bool {
        std::mem::replace(&mut self.cursor, 0) != 0
    }

    /// Move the cursor to the end.
    pub fn move_end(&mut self) -> bool {
        let end = self.chars.len();
        std::mem::replace(&mut self.cursor, end) != end
    }

    /// Apply an editing key.
    pub fn apply_key(&mut self, key: &KeyEvent) -> Edit {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let changed = |did: bool| if did { Edit::Changed } else { Edit::Ignored };
        let moved = |did: bool| if did { Edit::Moved } else { Edit::Ignored };
        match key.code {
            KeyCode::Char('w') if ctrl => changed(self.delete_word_back()),
            KeyCode::Char('u') if ctrl => changed(self.kill_to_start()),
            KeyCode::Char('a') if ctrl => moved(self.move_home()),
            KeyCode::Char('e') if ctrl => moved(self.move_end()),
            KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => Edit::Ignored,
            KeyCode::Char(c) => {
                self.insert_char(c);
                Edit::Changed
            }
            KeyCode::Backspace => changed(self.delete_back()),
            KeyCode::Delete => changed(self.delete_forward()),
            KeyCode::Left => moved(self.move_left()),
            KeyCode::Right => moved(self.move_right()),
            KeyCode::Home => moved(self.move_home()),
            KeyCode::End => moved(self.move_end()),
            _ => Edit::Ignored,
        }
    }
}
