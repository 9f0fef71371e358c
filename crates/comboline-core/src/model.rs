use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::Frame;

/// The top-level application trait, following the [Elm Architecture].
///
/// The runtime drives a continuous **init -> update -> view** cycle:
///
/// 1. [`init`](Model::init) creates the initial state and may return a
///    [`Command`] for early side effects.
/// 2. [`view`](Model::view) renders the current state to a [`ratatui::Frame`].
/// 3. Terminal input arrives as messages through [`Subscription`]s.
/// 4. [`update`](Model::update) processes each message, mutates state, and
///    optionally returns a [`Command`] (for example a remote lookup).
/// 5. Steps 2--4 repeat until the program exits.
///
/// A typical model owns a `Form` and one or more comboboxes and routes key
/// and mouse events to whichever field is focused.
///
/// # Example
///
/// ```rust,ignore
/// use comboline_core::{Command, Component, Model};
/// use comboline_widgets::combobox::{self, Combobox, ComboboxConfig};
/// use comboline_widgets::form::Form;
///
/// struct Picker { form: Form, city: Combobox }
///
/// enum Msg { City(combobox::Message) }
///
/// impl Model for Picker {
///     type Message = Msg;
///     type Flags = Vec<combobox::Item>;
///
///     fn init(items: Self::Flags) -> (Self, Command<Msg>) {
///         let mut form = Form::new().with_text_field("city");
///         let city = Combobox::attach(&mut form, "city", ComboboxConfig::new().with_items(items))
///             .expect("field exists");
///         (Picker { form, city }, Command::none())
///     }
///
///     fn update(&mut self, msg: Msg) -> Command<Msg> {
///         match msg {
///             Msg::City(m) => self.city.update(m).map(Msg::City),
///         }
///     }
///
///     fn view(&self, frame: &mut ratatui::Frame) {
///         self.city.view(frame, frame.area());
///     }
/// }
/// ```
///
/// [Elm Architecture]: https://guide.elm-lang.org/architecture/
pub trait Model: Sized + Send + 'static {
    /// The application's message type.
    type Message: Send + 'static;

    /// Initialization data passed to [`Model::init`]. Use `()` when none is needed.
    type Flags: Send + 'static;

    /// Create the initial model state and an optional startup command.
    fn init(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Process a message, mutate state, and return a command for side effects.
    ///
    /// This is the only place state changes. Async results (such as a
    /// completed fetch) come back here as ordinary messages, so there is never
    /// concurrent mutation.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render the current state to a ratatui [`Frame`].
    fn view(&self, frame: &mut Frame);

    /// Declare active subscriptions. Called after every update.
    ///
    /// The runtime diffs the returned list against the previously active set:
    /// new subscriptions are started and removed ones are cancelled.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }
}
