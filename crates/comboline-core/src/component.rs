use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::{layout::Rect, Frame};

/// A reusable sub-model that renders into a given [`Rect`] area.
///
/// `Component` mirrors [`Model`](crate::Model) except that
/// [`view`](Component::view) receives the `area` to draw into, so a parent
/// decides where each child goes. The combobox widget is a `Component`: the
/// parent wraps its messages in one of its own variants and lifts the
/// returned commands with [`Command::map`].
///
/// ```rust,ignore
/// fn update(&mut self, msg: AppMsg) -> Command<AppMsg> {
///     match msg {
///         AppMsg::Pickup(m) => self.pickup.update(m).map(AppMsg::Pickup),
///         AppMsg::Dropoff(m) => self.dropoff.update(m).map(AppMsg::Dropoff),
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// Process a message, mutate state, and return a [`Command`] for side effects.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into `area`. Implementations may draw overlays (such as a
    /// dropdown) below their anchor row but must stay inside the frame.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Subscriptions for this component; the parent collects and maps them.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Whether this component currently has keyboard focus.
    fn focused(&self) -> bool {
        false
    }
}
