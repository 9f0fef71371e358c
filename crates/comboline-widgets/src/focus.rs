//! Focus cycling across several comboboxes on one screen.
//!
//! Unlike a plain tab index, a slot can be left without focus: a combobox
//! releases focus by itself on Enter, Escape, or a click on an entry. The
//! ring reports which slot to blur and which to focus so the host can send
//! the matching [`Message::Blur`](crate::combobox::Message::Blur) and
//! [`Message::Focus`](crate::combobox::Message::Focus).

/// A change the host must forward to its comboboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusChange {
    /// Slot that loses focus.
    pub blur: Option<usize>,
    /// Slot that gains focus.
    pub focus: Option<usize>,
}

/// Focus state over `N` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRing<const N: usize> {
    focused: Option<usize>,
    last: usize,
}

impl<const N: usize> FocusRing<N> {
    /// No slot focused; the next [`focus_next`](Self::focus_next) picks slot 0.
    pub fn new() -> Self {
        Self {
            focused: None,
            last: N - 1,
        }
    }

    /// Currently focused slot.
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Whether `index` has focus.
    pub fn is_focused(&self, index: usize) -> bool {
        self.focused == Some(index)
    }

    /// Move to the slot after the focused one (or after the one that had it
    /// last), wrapping.
    pub fn focus_next(&mut self) -> FocusChange {
        let from = self.focused.unwrap_or(self.last);
        self.focus((from + 1) % N)
    }

    /// Move to the slot before, wrapping.
    pub fn focus_prev(&mut self) -> FocusChange {
        let from = self.focused.unwrap_or((self.last + 1) % N);
        self.focus((from + N - 1) % N)
    }

    /// Focus `index`, clamped to the valid range.
    pub fn focus(&mut self, index: usize) -> FocusChange {
        let index = index.min(N - 1);
        if self.focused == Some(index) {
            return FocusChange::default();
        }
        let change = FocusChange {
            blur: self.focused,
            focus: Some(index),
        };
        self.focused = Some(index);
        self.last = index;
        change
    }

    /// Record that slot `index` gave up focus on its own.
    pub fn release(&mut self, index: usize) {
        if self.focused == Some(index) {
            self.focused = None;
        }
    }

    /// Record a focus state observed on the slot itself (mouse clicks focus
    /// and blur comboboxes directly).
    pub fn sync(&mut self, index: usize, focused: bool) {
        if focused {
            self.focused = Some(index);
            self.last = index;
        } else {
            self.release(index);
        }
    }
}

impl<const N: usize> Default for FocusRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
