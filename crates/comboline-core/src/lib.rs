//! Core runtime for **comboline**.
//!
//! `comboline-core` is a small [Elm Architecture] runtime for ratatui: state
//! lives in a [`Model`], changes only inside [`Model::update`], and every side
//! effect (a remote lookup, a timer, a terminal tweak) is returned as a
//! [`Command`] that the runtime executes and turns back into a message.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Model`] | Top-level application trait (init / update / view) |
//! | [`Component`] | Reusable sub-model that renders into a [`ratatui::layout::Rect`] |
//! | [`Command`] | Side effect executed by the runtime, optionally cancellable |
//! | [`Subscription`] | Long-lived event source such as [`terminal_events`] |
//! | [`Program`] | Wires a [`Model`] to a real terminal and drives the event loop |
//! | [`TestProgram`](testing::TestProgram) | Headless harness for unit tests |
//!
//! # Concurrency
//!
//! Everything that mutates state runs on the event loop, one message at a
//! time. Async work runs on spawned tasks but can only report back by
//! sending a message, so there is nothing to lock. Work that may become
//! obsolete (a lookup for text the user has since changed) should be started
//! with [`Command::perform_cancellable`] and abandoned through its
//! [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! [Elm Architecture]: https://guide.elm-lang.org/architecture/

pub mod command;
pub mod component;
pub mod event;
pub mod model;
pub mod runtime;
pub mod subscription;
pub mod testing;

pub use command::{Cancelled, Command, MouseMode, TerminalCommand};
pub use component::Component;
pub use event::TerminalEvent;
pub use model::Model;
pub use runtime::{log_to_file, Program, ProgramError, ProgramHandle, ProgramOptions};
pub use subscription::{terminal_events, Subscription, SubscriptionId};
pub use tokio_util::sync::CancellationToken;

/// Run a comboline application with default options.
pub async fn run<M: Model>(flags: M::Flags) -> Result<M, ProgramError> {
    Program::<M>::new(flags)?.run().await
}

/// Run with custom options.
pub async fn run_with<M: Model>(
    flags: M::Flags,
    options: ProgramOptions,
) -> Result<M, ProgramError> {
    Program::<M>::with_options(flags, options)?.run().await
}
