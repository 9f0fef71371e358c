//! Combobox configuration.
//!
//! [`ComboboxConfig`] is the builder passed to
//! [`Combobox::attach`](super::Combobox::attach). The serializable subset
//! lives in [`ComboboxOptions`] so it can come from a config file or JSON.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use super::fetch::Fetcher;
use super::item::Item;
use crate::key::NavKeys;

/// Called with the chosen item after each selection.
pub type SelectFn = Arc<dyn Fn(&Item) + Send + Sync>;
/// Returns false for items that must not be rendered.
pub type FilterFn = Arc<dyn Fn(&Item) -> bool + Send + Sync>;
/// Turns a remote JSON document into items.
pub type FetchTransform = Arc<dyn Fn(serde_json::Value) -> Vec<Item> + Send + Sync>;

/// Typed characters needed before matching and remote lookups start.
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;
/// Rows of the open list.
pub const DEFAULT_LIST_HEIGHT: u16 = 8;

/// Style configuration for the combobox.
#[derive(Debug, Clone)]
pub struct ComboboxStyle {
    /// Style for the field text.
    pub input: Style,
    /// Style for the prompt before the field.
    pub prompt: Style,
    /// Style for the placeholder shown while the field is empty.
    pub placeholder: Style,
    /// Style for the cursor.
    pub cursor: Style,
    /// Style for list entries.
    pub item: Style,
    /// Style for the highlighted entry.
    pub highlighted: Style,
    /// Style for the matched part of a name.
    pub emphasis: Style,
    /// Style for item descriptions.
    pub descr: Style,
    /// Style for the list scrollbar.
    pub scrollbar: Style,
}

impl Default for ComboboxStyle {
    fn default() -> Self {
        Self {
            input: Style::default(),
            prompt: Style::default().fg(Color::Cyan),
            placeholder: Style::default().fg(Color::DarkGray),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            item: Style::default().fg(Color::White),
            highlighted: Style::default().fg(Color::Black).bg(Color::Cyan),
            emphasis: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            descr: Style::default().fg(Color::DarkGray),
            scrollbar: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Serializable options.
///
/// ```
/// # use comboline_widgets::combobox::ComboboxOptions;
/// let opts: ComboboxOptions =
///     serde_json::from_str(r##"{"endpoint": "/cities?q=", "hbg": "#ffc"}"##).unwrap();
/// assert_eq!(opts.highlight_color.as_deref(), Some("#ffc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComboboxOptions {
    /// Remote lookup prefix; the encoded text is appended.
    pub endpoint: Option<String>,
    /// Background of the highlighted entry: a color name, `#rgb`, `#rrggbb`
    /// or a palette index.
    #[serde(alias = "hbg")]
    pub highlight_color: Option<String>,
    /// Overrides [`DEFAULT_MIN_QUERY_LEN`].
    pub min_query_len: Option<usize>,
    /// Overrides [`DEFAULT_LIST_HEIGHT`].
    pub list_height: Option<u16>,
    /// Ask for animated page scrolling (default true).
    pub smooth_scroll: Option<bool>,
}

/// Builder for a combobox.
#[derive(Clone)]
pub struct ComboboxConfig {
    pub(crate) items: Vec<Item>,
    pub(crate) on_select: Option<SelectFn>,
    pub(crate) on_filter: Option<FilterFn>,
    pub(crate) endpoint: Option<String>,
    pub(crate) on_fetch: Option<FetchTransform>,
    pub(crate) fetcher: Option<Arc<dyn Fetcher>>,
    pub(crate) highlight_color: Option<String>,
    pub(crate) min_query_len: usize,
    pub(crate) list_height: u16,
    pub(crate) smooth_scroll: bool,
    pub(crate) prompt: String,
    pub(crate) placeholder: String,
    pub(crate) keys: NavKeys,
    pub(crate) style: ComboboxStyle,
}

impl Default for ComboboxConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComboboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboboxConfig")
            .field("items", &self.items.len())
            .field("on_select", &self.on_select.is_some())
            .field("on_filter", &self.on_filter.is_some())
            .field("endpoint", &self.endpoint)
            .field("on_fetch", &self.on_fetch.is_some())
            .field("highlight_color", &self.highlight_color)
            .field("min_query_len", &self.min_query_len)
            .field("list_height", &self.list_height)
            .field("smooth_scroll", &self.smooth_scroll)
            .finish_non_exhaustive()
    }
}

impl ComboboxConfig {
    /// Defaults: no items, no callbacks, no endpoint.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            on_select: None,
            on_filter: None,
            endpoint: None,
            on_fetch: None,
            fetcher: None,
            highlight_color: None,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            list_height: DEFAULT_LIST_HEIGHT,
            smooth_scroll: true,
            prompt: String::new(),
            placeholder: String::new(),
            keys: NavKeys::default(),
            style: ComboboxStyle::default(),
        }
    }

    /// Local candidate items.
    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    /// Callback run after every selection.
    pub fn on_select(mut self, f: impl Fn(&Item) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Arc::new(f));
        self
    }

    /// Predicate deciding which items are rendered.
    pub fn on_filter(mut self, f: impl Fn(&Item) -> bool + Send + Sync + 'static) -> Self {
        self.on_filter = Some(Arc::new(f));
        self
    }

    /// Fetch items from `endpoint` + encoded text instead of filtering locally.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Convert each remote response into items. Without it the body must
    /// be a JSON array of items.
    pub fn on_fetch(
        mut self,
        f: impl Fn(serde_json::Value) -> Vec<Item> + Send + Sync + 'static,
    ) -> Self {
        self.on_fetch = Some(Arc::new(f));
        self
    }

    /// Replace the HTTP fetcher.
    pub fn with_fetcher(mut self, fetcher: impl Fetcher) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Background color of the highlighted entry.
    pub fn with_highlight_color(mut self, color: impl Into<String>) -> Self {
        self.highlight_color = Some(color.into());
        self
    }

    /// Characters needed before matching and lookups start.
    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    /// Rows of the open list (at least 1).
    pub fn with_list_height(mut self, rows: u16) -> Self {
        self.list_height = rows.max(1);
        self
    }

    /// Animated (`true`) or instant page scrolling.
    pub fn with_smooth_scroll(mut self, smooth: bool) -> Self {
        self.smooth_scroll = smooth;
        self
    }

    /// Text shown before the field.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Text shown while the field is empty and unfocused.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Navigation key bindings.
    pub fn with_keys(mut self, keys: NavKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Visual style.
    pub fn with_style(mut self, style: ComboboxStyle) -> Self {
        self.style = style;
        self
    }

    /// Apply every option that is set.
    pub fn with_options(mut self, options: ComboboxOptions) -> Self {
        if let Some(endpoint) = options.endpoint {
            self = self.with_endpoint(endpoint);
        }
        if let Some(color) = options.highlight_color {
            self = self.with_highlight_color(color);
        }
        if let Some(len) = options.min_query_len {
            self = self.with_min_query_len(len);
        }
        if let Some(rows) = options.list_height {
            self = self.with_list_height(rows);
        }
        if let Some(smooth) = options.smooth_scroll {
            self = self.with_smooth_scroll(smooth);
        }
        self
    }

    /// Highlight style with the configured color applied. An unparseable
    /// color is logged and ignored.
    pub(crate) fn highlight_style(&self) -> Style {
        let Some(name) = self.highlight_color.as_deref() else {
            return self.style.highlighted;
        };
        match parse_color(name) {
            Some(color) => self.style.highlighted.bg(color),
            None => {
                tracing::warn!(color = name, "unrecognized highlight color, using default");
                self.style.highlighted
            }
        }
    }
}

/// Parse a color name, `#rrggbb`, palette index, or short `#rgb` form.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let long: String = hex.chars().flat_map(|c| [c, c]).collect();
            return Color::from_str(&format!("#{long}")).ok();
        }
    }
    Color::from_str(value).ok()
}
