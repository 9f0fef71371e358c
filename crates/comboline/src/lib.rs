//! **comboline** -- an autocomplete combobox for [`ratatui`] applications.
//!
//! This is the umbrella crate: one dependency brings in the runtime and the
//! widget.
//!
//! ```toml
//! [dependencies]
//! comboline = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`comboline_core`] are available at the crate
//!   root ([`Model`], [`Component`], [`Command`], [`Program`], [`run`],
//!   [`run_with`], etc.).
//! * The [`widgets`] module re-exports [`comboline_widgets`]: the
//!   combobox, the form it attaches to, focus and key helpers.
//! * [`ratatui`], [`crossterm`], [`tokio`] and [`serde_json`] are re-exported
//!   so downstream crates do not need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use comboline::widgets::combobox::{self, Combobox, ComboboxConfig, Item};
//! use comboline::widgets::form::Form;
//! use comboline::{Command, Component, Model};
//! use ratatui::Frame;
//!
//! struct Picker {
//!     city: Combobox,
//! }
//!
//! impl Model for Picker {
//!     type Message = combobox::Message;
//!     type Flags = ();
//!
//!     fn init(_: ()) -> (Self, Command<Self::Message>) {
//!         let mut form = Form::new().with_text_field("city");
//!         let config = ComboboxConfig::new()
//!             .with_items(vec![Item::new("1", "Rome", "RM"), Item::new("2", "Turin", "TO")]);
//!         let mut city = Combobox::attach(&mut form, "city", config).unwrap();
//!         let cmd = city.on_focus();
//!         (Picker { city }, cmd)
//!     }
//!     fn update(&mut self, msg: combobox::Message) -> Command<combobox::Message> {
//!         self.city.update(msg)
//!     }
//!     fn view(&self, frame: &mut Frame) {
//!         self.city.view(frame, frame.area());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     comboline::run::<Picker>(()).await.unwrap();
//! }
//! ```

pub use comboline_core::*;
pub mod widgets {
    pub use comboline_widgets::*;
}

// Re-export dependencies for use in demos and downstream crates
pub use crossterm;
pub use ratatui;
pub use serde_json;
pub use tokio;
