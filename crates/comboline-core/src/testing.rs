use crate::command::{Action, Command, CommandInner};
use crate::model::Model;
use futures::future::BoxFuture;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

/// A headless test harness that drives a [`Model`] without a real terminal.
///
/// Immediate messages ([`Command::message`]) are queued and flushed with
/// [`drain_messages`](TestProgram::drain_messages). Async commands are held
/// back until [`settle`](TestProgram::settle) runs them, which lets a test
/// interleave user input with in-flight lookups. Terminal commands are
/// ignored.
///
/// ```rust,ignore
/// let mut prog = TestProgram::<Picker>::new(offices());
/// prog.send(Msg::City(combobox::Message::Focus));
/// prog.send(type_text("tur"));
/// prog.settle().await;                       // resolve the remote lookup
/// assert_eq!(prog.model().city.highlighted(), Some("2"));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    pending_futures: Vec<BoxFuture<'static, M::Message>>,
    quit_requested: bool,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            pending_futures: Vec::new(),
            quit_requested: false,
        };
        program.collect(init_cmd);
        program
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
    }

    /// Process queued immediate messages until none are left.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect(cmd);
            }
        }
    }

    /// Number of async commands waiting to be run by [`settle`](TestProgram::settle).
    pub fn pending_async(&self) -> usize {
        self.pending_futures.len()
    }

    /// Run every pending async command to completion, feeding each result
    /// back through `update`, until neither futures nor messages remain.
    ///
    /// Futures started together complete in the order they were issued.
    pub async fn settle(&mut self) {
        loop {
            self.drain_messages();
            if self.pending_futures.is_empty() {
                break;
            }
            let futures: Vec<_> = self.pending_futures.drain(..).collect();
            for fut in futures {
                let msg = fut.await;
                let cmd = self.model.update(msg);
                self.collect(cmd);
            }
        }
    }

    /// Whether the model returned [`Command::quit`] at some point.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Render the model to a ratatui [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                self.model.view(frame);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    /// Render the model and return the visible content as a plain string,
    /// one line per row.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None | CommandInner::Terminal(_) => {}
            CommandInner::Action(Action::Message(msg)) => self.pending_messages.push(msg),
            CommandInner::Action(Action::Quit) => self.quit_requested = true,
            CommandInner::Future(fut) => self.pending_futures.push(fut),
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.collect(cmd);
                }
            }
        }
    }
}

/// Resolve a command into the messages it would deliver.
///
/// Immediate messages come first in batch order, then async results in the
/// order the futures were issued. Quit and terminal commands produce nothing.
/// Meant for testing a [`Component`](crate::Component) directly, where there
/// is no [`Model`] to drive.
pub async fn resolve<Msg: Send + 'static>(cmd: Command<Msg>) -> Vec<Msg> {
    let mut messages = Vec::new();
    let mut futures = Vec::new();
    split(cmd, &mut messages, &mut futures);
    for fut in futures {
        messages.push(fut.await);
    }
    messages
}

/// Immediate messages of a command, skipping any async work.
pub fn immediate<Msg: Send + 'static>(cmd: Command<Msg>) -> Vec<Msg> {
    let mut messages = Vec::new();
    let mut futures = Vec::new();
    split(cmd, &mut messages, &mut futures);
    messages
}

fn split<Msg: Send + 'static>(
    cmd: Command<Msg>,
    messages: &mut Vec<Msg>,
    futures: &mut Vec<BoxFuture<'static, Msg>>,
) {
    match cmd.inner {
        CommandInner::Action(Action::Message(msg)) => messages.push(msg),
        CommandInner::Future(fut) => futures.push(fut),
        CommandInner::Batch(cmds) => {
            for cmd in cmds {
                split(cmd, messages, futures);
            }
        }
        CommandInner::None | CommandInner::Action(Action::Quit) | CommandInner::Terminal(_) => {}
    }
}

/// Flatten a rendered buffer into newline-separated rows.
pub fn buffer_to_string(buf: &Buffer) -> String {
    let area: Rect = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}
