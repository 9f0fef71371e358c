//! Combobox widget for the **comboline** TUI runtime.
//!
//! [`combobox::Combobox`] implements [`comboline_core::Component`], so it
//! can be embedded in any [`comboline_core::Model`] and placed freely within
//! [`ratatui`] layouts.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`combobox`] | Autocomplete text field with a dropdown of items, local or remote |
//! | [`form`] | Named fields the combobox attaches to, and their submission |
//! | [`focus`] | [`FocusRing`](focus::FocusRing) for tabbing between comboboxes |
//! | [`key`] | Navigation key bindings |
//! | [`text_edit`] | Single-line editing buffer |
//! | [`chrome`] | Labelled frame around a field |

pub mod chrome;
pub mod combobox;
pub mod focus;
pub mod form;
pub mod key;
pub mod text_edit;
