//! Autocomplete combobox: a text field with a dropdown of matching items.
//!
//! A [`Combobox`] attaches to a text field of a [`Form`]. It adds a hidden
//! companion field (`<id>-hinput`) that carries the id of the selected item,
//! with the item's name in its [`ITEM_NAME_ATTR`] attribute. The visible
//! field holds free text; leaving it without choosing an entry puts the last
//! selected name back.
//!
//! Items come from the configuration or, when an endpoint is set, from a
//! remote lookup issued once enough characters are typed. Only the latest
//! lookup counts: starting a new one cancels the previous one, and late
//! answers are discarded.
//!
//! # Example
//!
//! ```ignore
//! use comboline_widgets::combobox::{Combobox, ComboboxConfig, Item};
//! use comboline_widgets::form::Form;
//!
//! let mut form = Form::new().with_text_field("pickup");
//! let pickup = Combobox::attach(
//!     &mut form,
//!     "pickup",
//!     ComboboxConfig::new()
//!         .with_items(vec![Item::new("1", "Rome", "RM"), Item::new("2", "Turin", "TO")])
//!         .with_highlight_color("#ffc"),
//! )?;
//! ```

mod config;
mod fetch;
mod item;
mod render;
mod scroll;

pub use config::{
    parse_color, ComboboxConfig, ComboboxOptions, ComboboxStyle, FetchTransform, FilterFn,
    SelectFn, DEFAULT_LIST_HEIGHT, DEFAULT_MIN_QUERY_LEN,
};
pub use fetch::{request_url, FetchError, Fetcher, HttpFetcher};
pub use item::Item;
pub use render::{build_entries, find_case_insensitive, DisplayName, Entry, RenderedList};
pub use scroll::{page_overflow, ListScroll, PageScroll, ScrollBehavior};

use std::cell::Cell;
use std::sync::Arc;

use comboline_core::command::{Cancelled, Command};
use comboline_core::component::Component;
use crossterm::event::{KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::form::{Field, FieldKind, Form, ITEM_NAME_ATTR};
use crate::key::NavKey;
use crate::text_edit::TextEditState;
use fetch::FetchSlot;

/// Why [`Combobox::attach`] refused a field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    /// No field has the given id.
    #[error("no field with id `{0}`")]
    FieldNotFound(String),

    /// The field exists but is not a text field.
    #[error("field `{id}` is a {kind} field, expected a text field")]
    NotTextField {
        /// Field id.
        id: String,
        /// Actual kind.
        kind: FieldKind,
    },
}

/// Where focus went when the field lost it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlurTarget {
    /// The list's own scroll area; the field keeps focus.
    ListScroll,
    /// The field itself.
    Field,
    /// A list entry, by item id: selects it. An id that is not rendered
    /// only closes the list.
    Entry(String),
    /// Anything else, or nothing.
    Elsewhere,
}

/// Completion of a remote lookup.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Generation the lookup was issued with.
    pub generation: u64,
    /// Text the lookup was issued for.
    pub query: String,
    /// The response, or `Err(Cancelled)` when superseded before completing.
    pub result: Result<Result<serde_json::Value, FetchError>, Cancelled>,
}

/// Messages for the combobox.
#[derive(Debug)]
pub enum Message {
    /// The field gained focus.
    Focus,
    /// The field lost focus.
    Blur(BlurTarget),
    /// A terminal key event: a press runs key-down then key-up, a release
    /// is ignored.
    Key(KeyEvent),
    /// Key-down half of a key press.
    KeyDown(KeyEvent),
    /// Key-up half of a key press.
    KeyUp(KeyEvent),
    /// Pasted text, inserted at the cursor.
    Paste(String),
    /// A mouse event; hit-tested against the last drawn layout.
    Mouse(MouseEvent),
    /// The pointer moved over the entry with this id.
    Hover(String),
    /// The entry with this id was clicked.
    Activate(String),
    /// A remote lookup finished.
    Fetched(FetchOutcome),

    /// Emitted: an item was selected.
    Selected(Item),
    /// Emitted: the field gave up focus on its own (Enter, Escape, click).
    FocusReleased,
    /// Emitted: the host should scroll so the open list is visible.
    PageScroll(PageScroll),
}

#[derive(Debug, Clone, Copy, Default)]
struct ViewLayout {
    field: Rect,
    list: Rect,
    viewport: Rect,
}

struct Remote {
    endpoint: String,
    fetcher: Arc<dyn Fetcher>,
}

/// Autocomplete combobox component.
pub struct Combobox {
    field_id: String,
    companion: Field,
    list_id: String,
    config: ComboboxConfig,
    remote: Option<Remote>,
    highlight_style: Style,

    editor: TextEditState,
    items: Vec<Item>,
    entries: Vec<Entry>,
    highlighted: Option<String>,
    is_open: bool,
    focused: bool,
    scroll: ListScroll,
    fetch: FetchSlot,

    layout: Cell<ViewLayout>,
}

impl Combobox {
    /// Attach to the text field `field_id` of `form`.
    ///
    /// Inserts the hidden companion field right before it. The field's
    /// current value becomes the initial text.
    pub fn attach(
        form: &mut Form,
        field_id: &str,
        mut config: ComboboxConfig,
    ) -> Result<Self, AttachError> {
        let Some(field) = form.field(field_id) else {
            tracing::error!(field = field_id, "cannot attach combobox: field not found");
            return Err(AttachError::FieldNotFound(field_id.to_string()));
        };
        if field.kind() != FieldKind::Text {
            tracing::error!(field = field_id, kind = %field.kind(), "cannot attach combobox: not a text field");
            return Err(AttachError::NotTextField {
                id: field_id.to_string(),
                kind: field.kind(),
            });
        }

        let mut editor = TextEditState::new();
        editor.set_value(field.value());

        let companion = Field::new(format!("{field_id}-hinput"), FieldKind::Hidden)
            .with_attr(ITEM_NAME_ATTR, "");
        form.insert_before(field_id, companion.clone());

        let remote = config.endpoint.clone().map(|endpoint| Remote {
            endpoint,
            fetcher: config
                .fetcher
                .clone()
                .unwrap_or_else(|| Arc::new(HttpFetcher::new())),
        });
        let highlight_style = config.highlight_style();
        let items = std::mem::take(&mut config.items);

        tracing::debug!(
            field = field_id,
            items = items.len(),
            remote = remote.is_some(),
            "combobox attached"
        );

        Ok(Self {
            field_id: field_id.to_string(),
            companion,
            list_id: format!("{field_id}-div"),
            config,
            remote,
            highlight_style,
            editor,
            items,
            entries: Vec::new(),
            highlighted: None,
            is_open: false,
            focused: false,
            scroll: ListScroll::default(),
            fetch: FetchSlot::default(),
            layout: Cell::new(ViewLayout::default()),
        })
    }

    /// Id of the field this combobox is attached to.
    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    /// Id of the hidden companion field.
    pub fn companion_id(&self) -> &str {
        self.companion.id()
    }

    /// The companion field as last written: value is the selected id, the
    /// [`ITEM_NAME_ATTR`] attribute the selected name.
    pub fn companion(&self) -> &Field {
        &self.companion
    }

    /// Id of the dropdown list.
    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    /// Current field text.
    pub fn value(&self) -> String {
        self.editor.value()
    }

    /// Candidate items.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Rendered entries, in list order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Id of the highlighted entry.
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Whether the list is open.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Id of the last selected item.
    pub fn selected_id(&self) -> Option<&str> {
        Some(self.companion.value()).filter(|id| !id.is_empty())
    }

    /// Name of the last selected item.
    pub fn selected_name(&self) -> Option<&str> {
        self.companion
            .attr(ITEM_NAME_ATTR)
            .filter(|name| !name.is_empty())
    }

    /// Current list scroll offset.
    pub fn scroll_offset(&self) -> usize {
        self.scroll.offset()
    }

    /// Whether a remote lookup is outstanding.
    pub fn fetch_in_flight(&self) -> bool {
        self.fetch.in_flight()
    }

    /// Replace the candidate items. An open list is rebuilt.
    pub fn set_items(&mut self, items: Vec<Item>) -> Command<Message> {
        self.items = items;
        if self.is_open {
            let text = self.editor.value();
            self.render(&text)
        } else {
            Command::none()
        }
    }

    /// Copy the field text and the companion into `form`.
    pub fn write_back(&self, form: &mut Form) {
        if let Some(field) = form.field_mut(&self.field_id) {
            field.set_value(self.editor.value());
        }
        form.push(self.companion.clone());
    }

    /// Focus handler: opens the list with every item, unmatched.
    pub fn on_focus(&mut self) -> Command<Message> {
        self.focused = true;
        if self.is_open {
            return Command::none();
        }
        self.render("")
    }

    /// Key-down handler. Navigation keys act on the list only while an entry
    /// is highlighted; other keys edit the text.
    pub fn on_key_down(&mut self, key: KeyEvent) -> Command<Message> {
        if !self.focused {
            return Command::none();
        }
        let nav = self.config.keys.classify(&key);
        if nav == NavKey::Other {
            self.editor.apply_key(&key);
            return Command::none();
        }
        if !self.is_open || self.highlighted.is_none() {
            return Command::none();
        }
        match nav {
            NavKey::Enter => {
                let selected = match self.highlighted_item() {
                    Some(item) => self.select(&item),
                    None => Command::none(),
                };
                Command::batch([selected, self.release_focus()])
            }
            NavKey::Escape => self.release_focus(),
            NavKey::ArrowUp => {
                self.move_highlight(false);
                Command::none()
            }
            NavKey::ArrowDown => {
                self.move_highlight(true);
                Command::none()
            }
            NavKey::Other => Command::none(),
        }
    }

    /// Key-up handler: after a text key, look items up remotely or rebuild
    /// the list locally.
    pub fn on_key_up(&mut self, key: KeyEvent) -> Command<Message> {
        if !self.focused || self.config.keys.classify(&key) != NavKey::Other {
            return Command::none();
        }
        self.refresh()
    }

    /// Blur handler.
    pub fn on_blur(&mut self, target: BlurTarget) -> Command<Message> {
        match target {
            BlurTarget::ListScroll | BlurTarget::Field => Command::none(),
            BlurTarget::Elsewhere => {
                self.leave();
                Command::none()
            }
            BlurTarget::Entry(id) => {
                self.leave();
                let Some(item) = self
                    .entries
                    .iter()
                    .find(|e| e.item_id() == id)
                    .map(|e| e.item.clone())
                else {
                    tracing::warn!(field = %self.field_id, id, "clicked entry is not rendered");
                    return Command::none();
                };
                self.highlighted = Some(item.id.clone());
                self.select(&item)
            }
        }
    }

    /// Rebuild the list from the items with `filter_text` as the typed text.
    ///
    /// Opens the list and may ask the host to scroll the page. With nothing
    /// to show the list closes instead.
    pub fn render(&mut self, filter_text: &str) -> Command<Message> {
        let rendered = build_entries(
            &self.items,
            filter_text,
            self.config.min_query_len,
            self.config.on_filter.as_ref(),
            self.selected_id(),
        );
        if rendered.entries.is_empty() {
            self.entries.clear();
            self.highlighted = None;
            self.is_open = false;
            self.scroll.reset();
            return Command::none();
        }

        self.entries = rendered.entries;
        self.highlighted = rendered.highlighted;
        self.is_open = true;
        let top = self.highlighted_index().unwrap_or(0);
        self.scroll.scroll_to(top, self.entries.len(), self.visible_rows());
        self.page_scroll()
    }

    /// Select `item`: update text and selection, run the callback.
    pub fn select(&mut self, item: &Item) -> Command<Message> {
        self.editor.set_value(&item.name);
        self.companion.set_value(&item.id);
        self.companion.set_attr(ITEM_NAME_ATTR, &item.name);
        tracing::debug!(field = %self.field_id, id = %item.id, "item selected");
        if let Some(on_select) = &self.config.on_select {
            on_select(item);
        }
        Command::message(Message::Selected(item.clone()))
    }

    /// Select the item with `id`, if there is one.
    pub fn select_by_id(&mut self, id: &str) -> Command<Message> {
        match self.items.iter().find(|i| i.id == id).cloned() {
            Some(item) => self.select(&item),
            None => {
                tracing::debug!(field = %self.field_id, id, "no item to select");
                Command::none()
            }
        }
    }

    /// Move the highlight to the rendered entry `id`. Returns false when
    /// there is no such entry.
    pub fn highlight(&mut self, id: &str) -> bool {
        if !self.entries.iter().any(|e| e.item_id() == id) {
            return false;
        }
        self.highlighted = Some(id.to_string());
        true
    }

    fn refresh(&mut self) -> Command<Message> {
        let text = self.editor.value();
        let Some(remote) = &self.remote else {
            return self.render(&text);
        };
        if text.chars().count() < self.config.min_query_len {
            return Command::none();
        }

        let url = request_url(&remote.endpoint, &text);
        let request = remote.fetcher.fetch(url.clone());
        let (generation, token) = self.fetch.begin();
        tracing::debug!(field = %self.field_id, %url, generation, "fetching items");
        Command::perform_cancellable(token, request, move |result| {
            Message::Fetched(FetchOutcome {
                generation,
                query: text,
                result,
            })
        })
    }

    fn on_fetched(&mut self, outcome: FetchOutcome) -> Command<Message> {
        let FetchOutcome {
            generation,
            query,
            result,
        } = outcome;
        let result = match result {
            Err(Cancelled) => {
                tracing::info!(field = %self.field_id, query, "lookup cancelled");
                return Command::none();
            }
            Ok(result) => result,
        };
        if !self.fetch.finish(generation) {
            tracing::debug!(field = %self.field_id, query, generation, "discarding superseded lookup");
            return Command::none();
        }
        let json = match result {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(field = %self.field_id, query, error = %err, "lookup failed");
                return Command::none();
            }
        };
        let items = match &self.config.on_fetch {
            Some(transform) => transform(json),
            None => match serde_json::from_value::<Vec<Item>>(json) {
                Ok(items) => items,
                Err(err) => {
                    let err = FetchError::from(err);
                    tracing::warn!(field = %self.field_id, query, error = %err, "lookup failed");
                    return Command::none();
                }
            },
        };
        tracing::debug!(field = %self.field_id, query, count = items.len(), "lookup finished");
        self.items = items;
        if !self.focused {
            return Command::none();
        }
        let text = self.editor.value();
        self.render(&text)
    }

    fn on_mouse(&mut self, event: MouseEvent) -> Command<Message> {
        let layout = self.layout.get();
        let at = Position::new(event.column, event.row);
        let over_list = self.is_open && layout.list.contains(at);
        match event.kind {
            MouseEventKind::Moved if over_list => {
                if let Some(id) = self.entry_id_at(event.row) {
                    self.hover(&id);
                }
                Command::none()
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if over_list {
                    match self.entry_id_at(event.row) {
                        Some(id) => self.activate(id),
                        None => self.on_blur(BlurTarget::ListScroll),
                    }
                } else if layout.field.contains(at) {
                    if self.focused {
                        self.on_blur(BlurTarget::Field)
                    } else {
                        self.on_focus()
                    }
                } else if self.focused {
                    self.on_blur(BlurTarget::Elsewhere)
                } else {
                    Command::none()
                }
            }
            MouseEventKind::ScrollDown if over_list => {
                self.scroll.scroll_by(1, self.entries.len(), self.visible_rows());
                Command::none()
            }
            MouseEventKind::ScrollUp if over_list => {
                self.scroll.scroll_by(-1, self.entries.len(), self.visible_rows());
                Command::none()
            }
            _ => Command::none(),
        }
    }

    fn hover(&mut self, id: &str) {
        if self.is_open && self.highlighted.as_deref() != Some(id) {
            self.highlight(id);
        }
    }

    fn activate(&mut self, id: String) -> Command<Message> {
        let selected = self.on_blur(BlurTarget::Entry(id));
        Command::batch([selected, Command::message(Message::FocusReleased)])
    }

    fn release_focus(&mut self) -> Command<Message> {
        let blurred = self.on_blur(BlurTarget::Elsewhere);
        Command::batch([blurred, Command::message(Message::FocusReleased)])
    }

    /// Drop focus, close the list, and put the selected name back.
    fn leave(&mut self) {
        self.focused = false;
        self.is_open = false;
        let name = self.companion.attr(ITEM_NAME_ATTR).unwrap_or_default();
        self.editor.set_value(name);
    }

    fn move_highlight(&mut self, down: bool) {
        let Some(current) = self.highlighted_index() else {
            return;
        };
        let next = if down {
            current + 1
        } else if let Some(prev) = current.checked_sub(1) {
            prev
        } else {
            return;
        };
        let Some(entry) = self.entries.get(next) else {
            return;
        };
        self.highlighted = Some(entry.item.id.clone());
        self.scroll.reveal(next, 1, self.visible_rows());
    }

    fn highlighted_index(&self) -> Option<usize> {
        let id = self.highlighted.as_deref()?;
        self.entries.iter().position(|e| e.item_id() == id)
    }

    fn highlighted_item(&self) -> Option<Item> {
        self.highlighted_index().map(|i| self.entries[i].item.clone())
    }

    /// Rows the open list wants: every entry, up to the configured height.
    fn view_rows(&self) -> usize {
        self.entries.len().min(self.config.list_height as usize)
    }

    /// Rows the list actually gets on screen. The last draw may have
    /// clipped it to the frame; before any draw this is [`Self::view_rows`].
    fn visible_rows(&self) -> usize {
        let rows = self.view_rows();
        let layout = self.layout.get();
        if layout.viewport.is_empty() {
            return rows;
        }
        let room = layout.viewport.bottom().saturating_sub(layout.field.bottom());
        rows.min(room as usize).max(1)
    }

    fn entry_id_at(&self, row: u16) -> Option<String> {
        let list = self.layout.get().list;
        if row >= list.bottom() {
            return None;
        }
        let index = self.scroll.offset() + row.checked_sub(list.y)? as usize;
        self.entries.get(index).map(|e| e.item.id.clone())
    }

    fn page_scroll(&self) -> Command<Message> {
        let layout = self.layout.get();
        if layout.viewport.is_empty() {
            return Command::none();
        }
        let rows = page_overflow(
            layout.field.bottom(),
            self.view_rows() as u16,
            layout.viewport.bottom(),
        );
        if rows == 0 {
            return Command::none();
        }
        let behavior = if self.config.smooth_scroll {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Jump
        };
        Command::message(Message::PageScroll(PageScroll { rows, behavior }))
    }

    fn field_line(&self, width: u16) -> Line<'_> {
        let style = &self.config.style;
        let mut spans = Vec::new();
        let mut budget = width as usize;
        if !self.config.prompt.is_empty() {
            spans.push(Span::styled(format!("{} ", self.config.prompt), style.prompt));
            budget = budget.saturating_sub(self.config.prompt.width() + 1);
        }

        let chars = self.editor.chars();
        if !self.focused {
            if chars.is_empty() {
                spans.push(Span::styled(self.config.placeholder.as_str(), style.placeholder));
            } else {
                spans.push(Span::styled(self.editor.value(), style.input));
            }
            return Line::from(spans);
        }

        let cursor = self.editor.cursor();
        let start = visible_start(chars, cursor, budget);
        let before: String = chars[start..cursor].iter().collect();
        if !before.is_empty() {
            spans.push(Span::styled(before, style.input));
        }
        match chars.get(cursor) {
            Some(c) => {
                spans.push(Span::styled(c.to_string(), style.cursor));
                let after: String = chars[cursor + 1..].iter().collect();
                if !after.is_empty() {
                    spans.push(Span::styled(after, style.input));
                }
            }
            None => spans.push(Span::styled(" ", style.cursor)),
        }
        Line::from(spans)
    }

    fn entry_line<'a>(&'a self, entry: &'a Entry) -> Line<'a> {
        let style = &self.config.style;
        let display = &entry.display;
        let mut spans = Vec::new();
        if let Some(icon) = &entry.item.icon {
            spans.push(Span::raw(format!("{icon} ")));
        }
        if !display.before.is_empty() {
            spans.push(Span::raw(display.before.as_str()));
        }
        if display.is_emphasized() {
            spans.push(Span::styled(display.emphasized.as_str(), style.emphasis));
        }
        if !display.after.is_empty() {
            spans.push(Span::raw(display.after.as_str()));
        }
        if !entry.item.descr.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(entry.item.descr.as_str(), style.descr));
        }
        Line::from(spans)
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let rows = area.height as usize;
        let overflowing = self.entries.len() > rows;
        let rows_area = if overflowing {
            Rect {
                width: area.width.saturating_sub(1),
                ..area
            }
        } else {
            area
        };

        let offset = self.scroll.offset();
        for (i, entry) in self.entries.iter().skip(offset).take(rows).enumerate() {
            let row_area = Rect {
                y: rows_area.y + i as u16,
                height: 1,
                ..rows_area
            };
            let style = if self.highlighted.as_deref() == Some(entry.item_id()) {
                self.highlight_style
            } else {
                self.config.style.item
            };
            frame.render_widget(Paragraph::new(self.entry_line(entry)).style(style), row_area);
        }

        if overflowing {
            let mut state =
                ScrollbarState::new(self.entries.len().saturating_sub(rows)).position(offset);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .style(self.config.style.scrollbar);
            frame.render_stateful_widget(scrollbar, area, &mut state);
        }
    }
}

/// First char to draw so that the cursor cell fits in `budget` columns.
fn visible_start(chars: &[char], cursor: usize, budget: usize) -> usize {
    let cursor_cell = chars.get(cursor).and_then(|c| c.width()).unwrap_or(1).max(1);
    let mut used: usize = chars[..cursor]
        .iter()
        .map(|c| c.width().unwrap_or(0))
        .sum::<usize>()
        + cursor_cell;
    let mut start = 0;
    while used > budget && start < cursor {
        used -= chars[start].width().unwrap_or(0);
        start += 1;
    }
    start
}

impl Component for Combobox {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Focus => self.on_focus(),
            Message::Blur(target) => self.on_blur(target),
            Message::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    return Command::none();
                }
                let down = self.on_key_down(key);
                let up = self.on_key_up(key);
                Command::batch([down, up])
            }
            Message::KeyDown(key) => self.on_key_down(key),
            Message::KeyUp(key) => self.on_key_up(key),
            Message::Paste(text) => {
                if self.focused && self.editor.insert_str(&text) {
                    self.refresh()
                } else {
                    Command::none()
                }
            }
            Message::Mouse(event) => self.on_mouse(event),
            Message::Hover(id) => {
                self.hover(&id);
                Command::none()
            }
            Message::Activate(id) => self.activate(id),
            Message::Fetched(outcome) => self.on_fetched(outcome),
            Message::Selected(_) | Message::FocusReleased | Message::PageScroll(_) => {
                Command::none()
            }
        }
    }

    /// Draws the field on the first row of `area`. The open list overlays
    /// the rows below it, clipped to the frame.
    fn view(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let field = Rect { height: 1, ..area };
        frame.render_widget(Paragraph::new(self.field_line(field.width)), field);

        let viewport = frame.area();
        let mut list = Rect::new(field.x, field.bottom(), field.width, 0);
        if self.is_open && !self.entries.is_empty() {
            let room = viewport.bottom().saturating_sub(field.bottom());
            list.height = (self.view_rows() as u16).min(room);
            if list.height > 0 {
                self.draw_list(frame, list);
            }
        }
        self.layout.set(ViewLayout {
            field,
            list,
            viewport,
        });
    }

    fn focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::fetch::scripted::{Reply, ScriptedFetcher};
    use super::*;
    use comboline_core::testing::{buffer_to_string, immediate, resolve};
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Mutex;

    fn cities() -> Vec<Item> {
        vec![
            Item::new("1", "Rome", "RM"),
            Item::new("2", "Turin", "TO"),
            Item::new("3", "Trento", "TN"),
            Item::new("4", "Arezzo", "AR"),
            Item::new("5", "Reggio Emilia", "RE"),
        ]
    }

    fn attach(config: ComboboxConfig) -> (Form, Combobox) {
        let mut form = Form::new().with_text_field("city");
        let combo = Combobox::attach(&mut form, "city", config).unwrap();
        (form, combo)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(combo: &mut Combobox, code: KeyCode) -> Vec<Message> {
        immediate(combo.update(Message::Key(key(code))))
    }

    fn type_text(combo: &mut Combobox, text: &str) -> Vec<Command<Message>> {
        text.chars()
            .map(|c| combo.update(Message::Key(key(KeyCode::Char(c)))))
            .collect()
    }

    fn entry_ids(combo: &Combobox) -> Vec<&str> {
        combo.entries().iter().map(Entry::item_id).collect()
    }

    fn draw(combo: &Combobox, terminal: &mut Terminal<TestBackend>, area: Rect) -> String {
        terminal.draw(|frame| combo.view(frame, area)).unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn attach_adds_companion_before_field() {
        let (form, combo) = attach(ComboboxConfig::new());
        let ids: Vec<_> = form.fields().iter().map(Field::id).collect();
        assert_eq!(ids, vec!["city-hinput", "city"]);
        assert_eq!(combo.companion_id(), "city-hinput");
        assert_eq!(combo.list_id(), "city-div");
        let companion = form.field("city-hinput").unwrap();
        assert_eq!(companion.kind(), FieldKind::Hidden);
        assert_eq!(companion.attr(ITEM_NAME_ATTR), Some(""));
    }

    #[test]
    fn attach_rejects_missing_and_non_text_fields() {
        let mut form = Form::new();
        form.push(Field::new("pin", FieldKind::Password));
        assert_eq!(
            Combobox::attach(&mut form, "nope", ComboboxConfig::new()).err(),
            Some(AttachError::FieldNotFound("nope".into()))
        );
        assert_eq!(
            Combobox::attach(&mut form, "pin", ComboboxConfig::new()).err(),
            Some(AttachError::NotTextField {
                id: "pin".into(),
                kind: FieldKind::Password
            })
        );
        assert_eq!(form.fields().len(), 1);
    }

    #[test]
    fn focus_opens_full_list_with_first_highlighted() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        assert!(combo.is_open());
        assert!(combo.focused());
        assert_eq!(entry_ids(&combo), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(combo.highlighted(), Some("1"));
        assert!(combo.entries().iter().all(|e| !e.display.is_emphasized()));
    }

    #[test]
    fn typing_highlights_first_match_and_enter_selects() {
        let picked = Arc::new(Mutex::new(Vec::new()));
        let log = picked.clone();
        let (mut form, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .on_select(move |item| log.lock().unwrap().push(item.name.clone())),
        );
        combo.update(Message::Focus);
        type_text(&mut combo, "tur");

        assert_eq!(combo.value(), "tur");
        assert_eq!(combo.highlighted(), Some("2"));
        let turin = &combo.entries()[1].display;
        assert_eq!(turin.emphasized, "Tur");

        let messages = press(&mut combo, KeyCode::Enter);
        assert!(matches!(&messages[0], Message::Selected(item) if item.id == "2"));
        assert!(matches!(messages[1], Message::FocusReleased));
        assert_eq!(combo.value(), "Turin");
        assert_eq!(combo.selected_id(), Some("2"));
        assert!(!combo.is_open());
        assert!(!combo.focused());
        assert_eq!(*picked.lock().unwrap(), vec!["Turin".to_string()]);
        assert_eq!(combo.companion().value(), "2");
        assert_eq!(combo.companion().attr(ITEM_NAME_ATTR), Some("Turin"));

        combo.write_back(&mut form);
        assert_eq!(
            form.submission(),
            vec![
                ("city-hinput".to_string(), "2".to_string()),
                ("city".to_string(), "Turin".to_string()),
            ]
        );
        assert_eq!(
            form.field("city-hinput").and_then(|f| f.attr(ITEM_NAME_ATTR)),
            Some("Turin")
        );
    }

    fn rome_turin() -> Combobox {
        attach(ComboboxConfig::new().with_items(vec![
            Item::new("1", "Rome", "RM"),
            Item::new("2", "Turin", "TO"),
        ]))
        .1
    }

    #[test]
    fn rome_turin_focus_falls_back_to_first() {
        let mut combo = rome_turin();
        combo.update(Message::Focus);
        assert!(combo.is_open());
        assert_eq!(combo.highlighted(), Some("1"));
    }

    #[test]
    fn rome_turin_typing_emphasizes_match() {
        let mut combo = rome_turin();
        combo.update(Message::Focus);
        type_text(&mut combo, "tur");
        assert_eq!(combo.highlighted(), Some("2"));
        let display = &combo.entries()[1].display;
        assert_eq!(display.emphasized, "Tur");
        assert_eq!(display.after, "in");
    }

    #[test]
    fn rome_turin_arrow_down_then_enter_selects() {
        let mut combo = rome_turin();
        combo.update(Message::Focus);
        press(&mut combo, KeyCode::Down);
        assert_eq!(combo.highlighted(), Some("2"));
        press(&mut combo, KeyCode::Enter);
        assert_eq!(combo.selected_id(), Some("2"));
        assert_eq!(combo.value(), "Turin");
        assert!(!combo.is_open());
    }

    #[test]
    fn rome_turin_click_outside_reverts_text() {
        let mut combo = rome_turin();
        combo.update(Message::Focus);
        type_text(&mut combo, "ro");
        combo.update(Message::Blur(BlurTarget::Elsewhere));
        assert!(!combo.is_open());
        assert_eq!(combo.value(), "");

        combo.select_by_id("1");
        combo.update(Message::Focus);
        type_text(&mut combo, "x");
        combo.update(Message::Blur(BlurTarget::Elsewhere));
        assert_eq!(combo.value(), "Rome");
    }

    #[test]
    fn select_then_render_highlights_selection() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        let trento = cities()[2].clone();
        combo.select(&trento);
        combo.render("");
        assert_eq!(combo.highlighted(), Some("3"));
    }

    #[test]
    fn refocus_highlights_previous_selection() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.select_by_id("4");
        combo.update(Message::Focus);
        assert_eq!(combo.highlighted(), Some("4"));
    }

    #[test]
    fn short_text_does_not_emphasize() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        type_text(&mut combo, "re");
        assert_eq!(combo.highlighted(), Some("1"));
        assert!(combo.entries().iter().all(|e| !e.display.is_emphasized()));
    }

    #[test]
    fn filter_callback_hides_items() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .on_filter(|item| item.descr.starts_with('T')),
        );
        combo.update(Message::Focus);
        assert_eq!(entry_ids(&combo), vec!["2", "3"]);
        assert_eq!(combo.highlighted(), Some("2"));
    }

    #[test]
    fn everything_filtered_keeps_list_closed() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .on_filter(|_| false),
        );
        combo.update(Message::Focus);
        assert!(!combo.is_open());
        assert_eq!(combo.highlighted(), None);
        assert!(press(&mut combo, KeyCode::Enter).is_empty());
        assert!(combo.focused());
    }

    #[test]
    fn arrows_stop_at_both_ends() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        press(&mut combo, KeyCode::Up);
        assert_eq!(combo.highlighted(), Some("1"));
        for _ in 0..10 {
            press(&mut combo, KeyCode::Down);
        }
        assert_eq!(combo.highlighted(), Some("5"));
        press(&mut combo, KeyCode::Up);
        assert_eq!(combo.highlighted(), Some("4"));
        assert_eq!(combo.value(), "");
    }

    #[test]
    fn arrows_scroll_the_list_minimally() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .with_list_height(2),
        );
        combo.update(Message::Focus);
        press(&mut combo, KeyCode::Down);
        assert_eq!(combo.scroll_offset(), 0);
        press(&mut combo, KeyCode::Down);
        assert_eq!(combo.scroll_offset(), 1);
        press(&mut combo, KeyCode::Up);
        press(&mut combo, KeyCode::Up);
        assert_eq!(combo.scroll_offset(), 0);
    }

    #[test]
    fn render_scrolls_highlight_to_top() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .with_list_height(2),
        );
        combo.update(Message::Focus);
        type_text(&mut combo, "tre");
        assert_eq!(combo.highlighted(), Some("3"));
        assert_eq!(combo.scroll_offset(), 2);

        // The last entry can only scroll as far as the last full page.
        combo.render("emilia");
        assert_eq!(combo.highlighted(), Some("5"));
        assert_eq!(combo.scroll_offset(), 3);
    }

    #[test]
    fn escape_restores_selected_name() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.select_by_id("1");
        combo.update(Message::Focus);
        type_text(&mut combo, "xyz");
        assert_eq!(combo.value(), "Romexyz");

        let messages = press(&mut combo, KeyCode::Esc);
        assert!(matches!(messages.as_slice(), [Message::FocusReleased]));
        assert_eq!(combo.value(), "Rome");
        assert!(!combo.is_open());
    }

    #[test]
    fn blur_without_selection_clears_text() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        type_text(&mut combo, "tur");
        combo.update(Message::Blur(BlurTarget::Elsewhere));
        assert_eq!(combo.value(), "");
        assert_eq!(combo.selected_id(), None);
    }

    #[test]
    fn blur_to_list_scroll_or_field_changes_nothing() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        type_text(&mut combo, "tur");
        for target in [BlurTarget::ListScroll, BlurTarget::Field] {
            assert!(immediate(combo.update(Message::Blur(target))).is_empty());
            assert!(combo.is_open());
            assert!(combo.focused());
            assert_eq!(combo.value(), "tur");
        }
    }

    #[test]
    fn blur_onto_entry_selects_it() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        let messages = immediate(combo.update(Message::Blur(BlurTarget::Entry("3".into()))));
        assert!(matches!(&messages[..], [Message::Selected(item)] if item.name == "Trento"));
        assert_eq!(combo.value(), "Trento");
        assert!(!combo.is_open());
    }

    #[test]
    fn activating_a_filtered_out_entry_selects_nothing() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(vec![Item::new("1", "Rome", "RM"), Item::new("2", "Turin", "TO")])
                .on_filter(|item| item.id != "2"),
        );
        combo.update(Message::Focus);
        assert_eq!(entry_ids(&combo), vec!["1"]);

        let messages = immediate(combo.update(Message::Activate("2".into())));
        assert!(matches!(messages.as_slice(), [Message::FocusReleased]));
        assert_eq!(combo.selected_id(), None);
        assert_ne!(combo.highlighted(), Some("2"));
        assert_eq!(combo.value(), "");
        assert!(!combo.is_open());
    }

    #[test]
    fn key_down_edits_and_key_up_renders() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        combo.update(Message::KeyDown(key(KeyCode::Char('a'))));
        combo.update(Message::KeyDown(key(KeyCode::Char('r'))));
        combo.update(Message::KeyDown(key(KeyCode::Char('e'))));
        assert_eq!(combo.value(), "are");
        assert_eq!(combo.highlighted(), Some("1"));

        combo.update(Message::KeyUp(key(KeyCode::Char('e'))));
        assert_eq!(combo.highlighted(), Some("4"));
    }

    #[test]
    fn release_events_are_ignored() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        let release = KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        combo.update(Message::Key(release));
        assert_eq!(combo.value(), "");
    }

    #[test]
    fn keys_do_nothing_without_focus() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        type_text(&mut combo, "rom");
        assert_eq!(combo.value(), "");
        assert!(!combo.is_open());
    }

    #[test]
    fn paste_inserts_and_rerenders() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        combo.update(Message::Focus);
        combo.update(Message::Paste("emil\n".into()));
        assert_eq!(combo.value(), "emil");
        assert_eq!(combo.highlighted(), Some("5"));
    }

    #[test]
    fn hover_moves_highlight_only_onto_rendered_entries() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .on_filter(|item| item.id != "3"),
        );
        combo.update(Message::Focus);
        combo.update(Message::Hover("2".into()));
        assert_eq!(combo.highlighted(), Some("2"));
        combo.update(Message::Hover("3".into()));
        assert_eq!(combo.highlighted(), Some("2"));
    }

    #[test]
    fn view_draws_field_and_list() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .with_prompt(">"),
        );
        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        let area = Rect::new(0, 0, 30, 1);
        combo.update(Message::Focus);
        type_text(&mut combo, "tur");
        let screen = draw(&combo, &mut terminal, area);
        let rows: Vec<&str> = screen.lines().collect();
        assert!(rows[0].starts_with("> tur"));
        assert!(rows[1].starts_with("Rome  RM"));
        assert!(rows[2].starts_with("Turin  TO"));
        assert!(rows[5].starts_with("Reggio Emilia  RE"));

        let highlighted = terminal.backend().buffer()[(0, 2)].bg;
        assert_eq!(highlighted, ComboboxStyle::default().highlighted.bg.unwrap());
    }

    #[test]
    fn unfocused_empty_field_shows_placeholder() {
        let (_, combo) = attach(ComboboxConfig::new().with_placeholder("Pick a city"));
        let mut terminal = Terminal::new(TestBackend::new(20, 3)).unwrap();
        let screen = draw(&combo, &mut terminal, Rect::new(0, 0, 20, 1));
        assert!(screen.starts_with("Pick a city"));
    }

    #[test]
    fn long_text_scrolls_to_keep_cursor_visible() {
        let (_, mut combo) = attach(ComboboxConfig::new());
        combo.update(Message::Focus);
        type_text(&mut combo, "abcdefghij");
        let mut terminal = Terminal::new(TestBackend::new(6, 1)).unwrap();
        let screen = draw(&combo, &mut terminal, Rect::new(0, 0, 6, 1));
        assert_eq!(screen, "fghij ");
    }

    #[test]
    fn list_overflowing_viewport_requests_page_scroll() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        draw(&combo, &mut terminal, Rect::new(0, 3, 30, 1));

        let messages = immediate(combo.update(Message::Focus));
        assert!(matches!(
            messages.as_slice(),
            [Message::PageScroll(PageScroll {
                rows: 3,
                behavior: ScrollBehavior::Smooth
            })]
        ));
    }

    #[test]
    fn page_scroll_can_jump() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .with_smooth_scroll(false),
        );
        let mut terminal = Terminal::new(TestBackend::new(30, 4)).unwrap();
        draw(&combo, &mut terminal, Rect::new(0, 0, 30, 1));
        let messages = immediate(combo.update(Message::Focus));
        assert!(matches!(
            messages.as_slice(),
            [Message::PageScroll(PageScroll {
                rows: 2,
                behavior: ScrollBehavior::Jump
            })]
        ));
    }

    #[test]
    fn clicking_an_entry_selects_it() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        let area = Rect::new(0, 0, 30, 1);
        combo.update(Message::Focus);
        draw(&combo, &mut terminal, area);

        let hover = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 2,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        combo.update(Message::Mouse(hover));
        assert_eq!(combo.highlighted(), Some("3"));

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        let messages = immediate(combo.update(Message::Mouse(click)));
        assert!(matches!(&messages[0], Message::Selected(item) if item.id == "2"));
        assert!(matches!(messages[1], Message::FocusReleased));
        assert_eq!(combo.value(), "Turin");
    }

    #[test]
    fn clicking_elsewhere_blurs_and_clicking_field_focuses() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        draw(&combo, &mut terminal, Rect::new(0, 0, 30, 1));

        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        combo.update(Message::Mouse(click(3, 0)));
        assert!(combo.focused());
        assert!(combo.is_open());

        draw(&combo, &mut terminal, Rect::new(0, 0, 30, 1));
        combo.update(Message::Mouse(click(3, 7)));
        assert!(!combo.focused());
        assert!(!combo.is_open());
    }

    #[test]
    fn wheel_scrolls_list_and_keeps_focus() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .with_list_height(2),
        );
        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        combo.update(Message::Focus);
        draw(&combo, &mut terminal, Rect::new(0, 0, 30, 1));

        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        combo.update(Message::Mouse(wheel));
        assert_eq!(combo.scroll_offset(), 1);
        assert!(combo.focused());
        assert!(combo.is_open());
    }

    #[test]
    fn arrows_keep_highlight_on_screen_when_list_is_clipped() {
        let (_, mut combo) = attach(ComboboxConfig::new().with_items(cities()));
        let mut terminal = Terminal::new(TestBackend::new(20, 4)).unwrap();
        let area = Rect::new(0, 0, 20, 1);
        draw(&combo, &mut terminal, area);
        combo.update(Message::Focus);
        draw(&combo, &mut terminal, area);

        for _ in 0..3 {
            press(&mut combo, KeyCode::Down);
        }
        assert_eq!(combo.highlighted(), Some("4"));
        assert_eq!(combo.scroll_offset(), 1);
        let screen = draw(&combo, &mut terminal, area);
        assert!(screen.contains("Arezzo"));
        assert!(!screen.contains("Rome"));

        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 1,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        combo.update(Message::Mouse(wheel));
        combo.update(Message::Mouse(wheel));
        assert_eq!(combo.scroll_offset(), 2);
        let screen = draw(&combo, &mut terminal, area);
        assert!(screen.contains("Reggio Emilia"));
    }

    #[test]
    fn highlight_color_applies_to_highlighted_row() {
        let (_, mut combo) = attach(
            ComboboxConfig::new()
                .with_items(cities())
                .with_highlight_color("#ffc"),
        );
        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        combo.update(Message::Focus);
        draw(&combo, &mut terminal, Rect::new(0, 0, 30, 1));
        assert_eq!(
            terminal.backend().buffer()[(0, 1)].bg,
            ratatui::style::Color::Rgb(0xff, 0xff, 0xcc)
        );
    }

    fn remote(fetcher: ScriptedFetcher) -> Combobox {
        attach(
            ComboboxConfig::new()
                .with_endpoint("/cities?q=")
                .with_fetcher(fetcher),
        )
        .1
    }

    #[tokio::test]
    async fn remote_lookup_waits_for_min_length() {
        let fetcher = ScriptedFetcher::default().reply(
            "/cities?q=tor",
            Reply::Json(serde_json::json!([
                {"id": 10, "name": "Torino", "descr": "TO"},
                {"id": 11, "name": "Torre del Greco", "descr": "NA"}
            ])),
        );
        let mut combo = remote(fetcher.clone());
        combo.update(Message::Focus);
        assert!(!combo.is_open());

        let mut commands = type_text(&mut combo, "tor");
        assert_eq!(fetcher.requests(), vec!["/cities?q=tor".to_string()]);

        let last = commands.pop().unwrap();
        for message in resolve(last).await {
            combo.update(message);
        }
        assert!(combo.is_open());
        assert_eq!(entry_ids(&combo), vec!["10", "11"]);
        assert_eq!(combo.highlighted(), Some("10"));
        assert_eq!(combo.entries()[1].display.emphasized, "Tor");
        assert!(!combo.fetch_in_flight());
    }

    #[tokio::test]
    async fn backspace_below_min_length_keeps_stale_list() {
        let fetcher = ScriptedFetcher::default().reply(
            "/cities?q=tor",
            Reply::Json(serde_json::json!([
                {"id": 10, "name": "Torino", "descr": "TO"},
                {"id": 11, "name": "Torre del Greco", "descr": "NA"}
            ])),
        );
        let mut combo = remote(fetcher.clone());
        combo.update(Message::Focus);
        for message in resolve(type_text(&mut combo, "tor").pop().unwrap()).await {
            combo.update(message);
        }
        assert_eq!(entry_ids(&combo), vec!["10", "11"]);

        let messages = resolve(combo.update(Message::Key(key(KeyCode::Backspace)))).await;
        assert!(messages.is_empty());
        assert_eq!(combo.value(), "to");
        assert_eq!(fetcher.requests(), vec!["/cities?q=tor".to_string()]);
        assert_eq!(entry_ids(&combo), vec!["10", "11"]);
        assert!(combo.is_open());
        assert!(!combo.fetch_in_flight());
    }

    #[tokio::test]
    async fn answer_in_flight_during_backspace_still_lands() {
        let fetcher = ScriptedFetcher::default().reply(
            "/cities?q=tor",
            Reply::Json(serde_json::json!([{"id": 10, "name": "Torino", "descr": "TO"}])),
        );
        let mut combo = remote(fetcher.clone());
        combo.update(Message::Focus);
        let pending = type_text(&mut combo, "tor").pop().unwrap();
        assert!(combo.fetch_in_flight());

        let messages = resolve(combo.update(Message::Key(key(KeyCode::Backspace)))).await;
        assert!(messages.is_empty());
        assert!(combo.fetch_in_flight());

        for message in resolve(pending).await {
            combo.update(message);
        }
        assert_eq!(fetcher.requests(), vec!["/cities?q=tor".to_string()]);
        assert_eq!(entry_ids(&combo), vec!["10"]);
        assert!(combo.is_open());
        assert!(!combo.entries()[0].display.is_emphasized());
    }

    #[tokio::test]
    async fn superseded_lookup_is_cancelled_and_ignored() {
        let fetcher = ScriptedFetcher::default()
            .reply("/cities?q=tor", Reply::Hang)
            .reply(
                "/cities?q=tori",
                Reply::Json(serde_json::json!([{"id": 10, "name": "Torino"}])),
            );
        let mut combo = remote(fetcher.clone());
        combo.update(Message::Focus);
        let first = type_text(&mut combo, "tor").pop().unwrap();
        let second = type_text(&mut combo, "i").pop().unwrap();

        let stale = resolve(first).await;
        assert!(matches!(
            stale.as_slice(),
            [Message::Fetched(FetchOutcome {
                result: Err(Cancelled),
                ..
            })]
        ));
        for message in stale {
            combo.update(message);
        }
        assert!(combo.items().is_empty());
        assert!(combo.fetch_in_flight());

        for message in resolve(second).await {
            combo.update(message);
        }
        assert_eq!(entry_ids(&combo), vec!["10"]);
        assert_eq!(
            fetcher.requests(),
            vec!["/cities?q=tor".to_string(), "/cities?q=tori".to_string()]
        );
    }

    #[test]
    fn late_answer_for_old_generation_is_dropped() {
        let fetcher = ScriptedFetcher::default();
        let mut combo = remote(fetcher);
        combo.update(Message::Focus);
        type_text(&mut combo, "tori");

        combo.update(Message::Fetched(FetchOutcome {
            generation: 1,
            query: "tor".into(),
            result: Ok(Ok(serde_json::json!([{"id": 1, "name": "Tortona"}]))),
        }));
        assert!(combo.items().is_empty());

        combo.update(Message::Fetched(FetchOutcome {
            generation: 2,
            query: "tori".into(),
            result: Ok(Ok(serde_json::json!([{"id": 10, "name": "Torino"}]))),
        }));
        assert_eq!(combo.items().len(), 1);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_previous_items() {
        let fetcher = ScriptedFetcher::default()
            .reply(
                "/cities?q=mil",
                Reply::Json(serde_json::json!([{"id": 1, "name": "Milan"}])),
            )
            .reply("/cities?q=mila", Reply::Status(503));
        let mut combo = remote(fetcher);
        combo.update(Message::Focus);
        for message in resolve(type_text(&mut combo, "mil").pop().unwrap()).await {
            combo.update(message);
        }
        for message in resolve(type_text(&mut combo, "a").pop().unwrap()).await {
            combo.update(message);
        }
        assert_eq!(entry_ids(&combo), vec!["1"]);
        assert!(combo.is_open());
        assert!(!combo.fetch_in_flight());
    }

    #[tokio::test]
    async fn fetch_transform_shapes_response() {
        let fetcher = ScriptedFetcher::default().reply(
            "/cities?q=nap",
            Reply::Json(serde_json::json!({"results": [["80100", "Naples"]]})),
        );
        let mut combo = attach(
            ComboboxConfig::new()
                .with_endpoint("/cities?q=")
                .with_fetcher(fetcher)
                .on_fetch(|json| {
                    json["results"]
                        .as_array()
                        .into_iter()
                        .flatten()
                        .map(|row| {
                            Item::new(
                                row[0].as_str().unwrap_or_default(),
                                row[1].as_str().unwrap_or_default(),
                                "",
                            )
                        })
                        .collect()
                }),
        )
        .1;
        combo.update(Message::Focus);
        for message in resolve(type_text(&mut combo, "nap").pop().unwrap()).await {
            combo.update(message);
        }
        assert_eq!(combo.items(), &[Item::new("80100", "Naples", "")]);
    }

    #[tokio::test]
    async fn answer_after_blur_updates_items_without_reopening() {
        let fetcher = ScriptedFetcher::default().reply(
            "/cities?q=bol",
            Reply::Json(serde_json::json!([{"id": 7, "name": "Bologna"}])),
        );
        let mut combo = remote(fetcher);
        combo.update(Message::Focus);
        let pending = type_text(&mut combo, "bol").pop().unwrap();
        combo.update(Message::Blur(BlurTarget::Elsewhere));
        for message in resolve(pending).await {
            combo.update(message);
        }
        assert_eq!(combo.items().len(), 1);
        assert!(!combo.is_open());
    }

    #[test]
    fn dropping_the_widget_cancels_lookup() {
        let fetcher = ScriptedFetcher::default().reply("/cities?q=gen", Reply::Hang);
        let mut combo = remote(fetcher);
        combo.update(Message::Focus);
        let pending = type_text(&mut combo, "gen").pop().unwrap();
        assert!(combo.fetch_in_flight());
        drop(combo);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let messages = runtime.block_on(resolve(pending));
        assert!(matches!(
            messages.as_slice(),
            [Message::Fetched(FetchOutcome {
                result: Err(Cancelled),
                ..
            })]
        ));
    }
}
