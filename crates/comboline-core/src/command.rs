use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A side effect returned from [`Model::update`](crate::Model::update) or [`Model::init`](crate::Model::init).
///
/// Commands describe work the runtime performs on behalf of the model:
/// immediate follow-up messages, async tasks whose output is mapped back
/// into a message, terminal management, and quitting.
///
/// # Examples
///
/// ```rust,ignore
/// // Do nothing:
/// let cmd = Command::none();
///
/// // Run an async lookup and map the result to a message:
/// let cmd = Command::perform(
///     async { lookup("tur").await },
///     Msg::LookupDone,
/// );
///
/// // Same, but abandon the lookup when `token` is cancelled:
/// let cmd = Command::perform_cancellable(token, lookup("turi"), Msg::LookupDone);
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Action(Action<Msg>),
    Future(BoxFuture<'static, Msg>),
    Batch(Vec<Command<Msg>>),
    Terminal(TerminalCommand),
}

/// Actions handled synchronously by the runtime, without spawning a task.
pub enum Action<Msg> {
    /// Deliver a message on the next loop iteration.
    Message(Msg),
    /// Quit the program.
    Quit,
}

/// Marker returned by [`Command::perform_cancellable`] when the token fired
/// before the future completed.
///
/// Cancellation is not a failure: callers usually log it and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("operation cancelled")
    }
}

/// Terminal management commands executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Enable mouse event capture with the specified mode.
    EnableMouseCapture(MouseMode),
    /// Disable mouse event capture.
    DisableMouse,
    /// Make the terminal cursor visible.
    ShowCursor,
    /// Hide the terminal cursor.
    HideCursor,
    /// Set the terminal window title.
    SetTitle(String),
}

/// Mouse capture modes for the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    /// Click, release, wheel, drag.
    CellMotion,
    /// All of the above plus hover (needed for pointer-move highlighting).
    AllMotion,
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No-op command.
    pub fn none() -> Self {
        Command {
            inner: CommandInner::None,
        }
    }

    /// Run an async future, map the result to a message.
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Command {
            inner: CommandInner::Future(Box::pin(async move { map(future.await) })),
        }
    }

    /// Run an async future that can be abandoned through `token`.
    ///
    /// The future races the token. If the token is cancelled first the future
    /// is dropped and `map` receives `Err(Cancelled)`; a token that is
    /// already cancelled never polls the future at all.
    pub fn perform_cancellable<F, T>(
        token: CancellationToken,
        future: F,
        map: impl FnOnce(Result<T, Cancelled>) -> Msg + Send + 'static,
    ) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Command {
            inner: CommandInner::Future(Box::pin(async move {
                let outcome = tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Cancelled),
                    value = future => Ok(value),
                };
                map(outcome)
            })),
        }
    }

    /// Send a message immediately.
    pub fn message(msg: Msg) -> Self {
        Command {
            inner: CommandInner::Action(Action::Message(msg)),
        }
    }

    /// Quit the program.
    pub fn quit() -> Self {
        Command {
            inner: CommandInner::Action(Action::Quit),
        }
    }

    /// Run multiple commands concurrently. `none` entries are dropped.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Command::none(),
            1 => cmds.swap_remove(0),
            _ => Command {
                inner: CommandInner::Batch(cmds),
            },
        }
    }

    /// Terminal management command.
    pub fn terminal(cmd: TerminalCommand) -> Self {
        Command {
            inner: CommandInner::Terminal(cmd),
        }
    }

    /// Transform the message type (for component composition).
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Command<NewMsg> {
        self.map_with(std::sync::Arc::new(f))
    }

    fn map_with<NewMsg: Send + 'static>(
        self,
        f: std::sync::Arc<dyn Fn(Msg) -> NewMsg + Send + Sync>,
    ) -> Command<NewMsg> {
        match self.inner {
            CommandInner::None => Command::none(),
            CommandInner::Action(Action::Message(msg)) => Command::message(f(msg)),
            CommandInner::Action(Action::Quit) => Command::quit(),
            CommandInner::Future(fut) => Command {
                inner: CommandInner::Future(Box::pin(async move { f(fut.await) })),
            },
            CommandInner::Batch(cmds) => Command {
                inner: CommandInner::Batch(
                    cmds.into_iter()
                        .map(|cmd| cmd.map_with(f.clone()))
                        .collect(),
                ),
            },
            CommandInner::Terminal(tcmd) => Command::terminal(tcmd),
        }
    }

    /// One-shot timer: fires once after `duration`, mapping the instant to a message.
    pub fn tick(
        duration: std::time::Duration,
        map: impl FnOnce(std::time::Instant) -> Msg + Send + 'static,
    ) -> Self {
        Command {
            inner: CommandInner::Future(Box::pin(async move {
                tokio::time::sleep(duration).await;
                map(std::time::Instant::now())
            })),
        }
    }

    /// Enable mouse capture including hover events.
    pub fn enable_mouse_all() -> Self {
        Command::terminal(TerminalCommand::EnableMouseCapture(MouseMode::AllMotion))
    }

    /// Disable mouse event capture.
    pub fn disable_mouse() -> Self {
        Command::terminal(TerminalCommand::DisableMouse)
    }

    /// Make the terminal cursor visible.
    pub fn show_cursor() -> Self {
        Command::terminal(TerminalCommand::ShowCursor)
    }

    /// Hide the terminal cursor.
    pub fn hide_cursor() -> Self {
        Command::terminal(TerminalCommand::HideCursor)
    }

    /// Set the terminal window title.
    pub fn set_title(title: impl Into<String>) -> Self {
        Command::terminal(TerminalCommand::SetTitle(title.into()))
    }

    // --- Inspection methods (useful for testing) ---

    /// Returns `true` if this is a no-op command.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// Returns `true` if this command (or any command in a batch) runs async work.
    pub fn has_async(&self) -> bool {
        match &self.inner {
            CommandInner::Future(_) => true,
            CommandInner::Batch(cmds) => cmds.iter().any(Command::has_async),
            _ => false,
        }
    }

    /// If this command is an immediate message action, return it.
    pub fn into_message(self) -> Option<Msg> {
        match self.inner {
            CommandInner::Action(Action::Message(msg)) => Some(msg),
            _ => None,
        }
    }

    /// If this command is a batch, return the inner commands.
    pub fn into_batch(self) -> Option<Vec<Command<Msg>>> {
        match self.inner {
            CommandInner::Batch(cmds) => Some(cmds),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_drops_none_entries() {
        let cmd: Command<i32> = Command::batch(vec![Command::none(), Command::none()]);
        assert!(cmd.is_none());

        let cmd: Command<i32> = Command::batch(vec![Command::none(), Command::message(7)]);
        assert_eq!(cmd.into_message(), Some(7));
    }

    #[test]
    fn batch_keeps_multiple() {
        let cmd: Command<i32> = Command::batch(vec![Command::message(1), Command::message(2)]);
        assert_eq!(cmd.into_batch().map(|cmds| cmds.len()), Some(2));
    }

    #[test]
    fn map_message_and_quit() {
        let mapped: Command<String> = Command::message(42).map(|n: i32| n.to_string());
        assert_eq!(mapped.into_message().as_deref(), Some("42"));

        let mapped: Command<String> = Command::<i32>::quit().map(|n| n.to_string());
        assert!(matches!(mapped.inner, CommandInner::Action(Action::Quit)));
    }

    #[test]
    fn map_preserves_terminal_command() {
        let mapped: Command<String> = Command::<i32>::enable_mouse_all().map(|n| n.to_string());
        assert!(matches!(
            mapped.inner,
            CommandInner::Terminal(TerminalCommand::EnableMouseCapture(MouseMode::AllMotion))
        ));
    }

    #[test]
    fn has_async_looks_inside_batches() {
        let cmd: Command<i32> = Command::batch(vec![
            Command::message(1),
            Command::perform(async { 2 }, |n| n),
        ]);
        assert!(cmd.has_async());
        assert!(!Command::<i32>::message(1).has_async());
    }

    #[tokio::test]
    async fn cancellable_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let cmd = Command::perform_cancellable(token, async { 5 }, |r| r);
        match cmd.inner {
            CommandInner::Future(fut) => assert_eq!(fut.await, Ok(5)),
            _ => panic!("expected a future"),
        }
    }

    #[tokio::test]
    async fn cancellable_reports_cancelled() {
        let token = CancellationToken::new();
        let cmd = Command::perform_cancellable(
            token.clone(),
            futures::future::pending::<i32>(),
            |r| r,
        );
        token.cancel();
        match cmd.inner {
            CommandInner::Future(fut) => assert_eq!(fut.await, Err(Cancelled)),
            _ => panic!("expected a future"),
        }
    }
}
