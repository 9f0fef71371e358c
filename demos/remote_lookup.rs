//! # Remote Lookup Example
//!
//! A single combobox whose items come from an HTTP endpoint:
//! - After three characters, `GET <endpoint><encoded text>` is issued
//! - Typing on cancels the outstanding lookup; late answers are ignored
//! - The response may be a plain array of items or `{"results": [...]}`
//!
//! The endpoint is read from `COMBOLINE_ENDPOINT`, for example
//! `COMBOLINE_ENDPOINT='http://localhost:8080/cities?q='`.
//! Lookups are logged to `remote_lookup.log`. When the list would run past
//! the bottom of the terminal the header row is folded away to make room;
//! what still does not fit stays reachable with the arrow keys.
//!
//! Run with: `cargo run --example remote_lookup`

use comboline::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use comboline::ratatui::layout::{Constraint, Layout};
use comboline::ratatui::style::{Color, Style};
use comboline::ratatui::text::{Line, Span};
use comboline::ratatui::widgets::Paragraph;
use comboline::ratatui::Frame;
use comboline::serde_json::Value;
use comboline::widgets::chrome::field_block;
use comboline::widgets::combobox::{self, Combobox, ComboboxConfig, Item};
use comboline::widgets::form::Form;
use comboline::{
    terminal_events, Command, Component, Model, MouseMode, ProgramOptions, Subscription,
    TerminalEvent,
};

const DEFAULT_ENDPOINT: &str = "http://localhost:8080/cities?q=";

/// Accept either a bare array of items or an object wrapping one.
fn items_from_response(json: Value) -> Vec<Item> {
    let rows = match json {
        Value::Object(mut map) => map.remove("results").unwrap_or(Value::Null),
        other => other,
    };
    match comboline::serde_json::from_value(rows) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, "response has no usable items");
            Vec::new()
        }
    }
}

struct Lookup {
    endpoint: String,
    city: Combobox,
    chosen: Option<Item>,
    header_folded: bool,
}

#[derive(Debug)]
enum Msg {
    City(combobox::Message),
    Quit,
}

impl Model for Lookup {
    type Message = Msg;
    type Flags = String;

    fn init(endpoint: String) -> (Self, Command<Msg>) {
        let mut form = Form::new().with_text_field("city");
        let config = ComboboxConfig::new()
            .with_endpoint(endpoint.clone())
            .on_fetch(items_from_response)
            .with_prompt("City:")
            .with_list_height(10);
        let mut city = Combobox::attach(&mut form, "city", config).expect("city field");
        let cmd = city.on_focus().map(Msg::City);
        (
            Lookup {
                endpoint,
                city,
                chosen: None,
                header_folded: false,
            },
            cmd,
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::City(combobox::Message::Selected(item)) => {
                self.chosen = Some(item);
                self.header_folded = false;
                Command::none()
            }
            Msg::City(combobox::Message::PageScroll(scroll)) => {
                tracing::debug!(rows = scroll.rows, "list overflows the terminal");
                self.header_folded = true;
                Command::none()
            }
            Msg::City(combobox::Message::FocusReleased) => {
                // Keep the field usable: focus comes straight back.
                self.city.on_focus().map(Msg::City)
            }
            Msg::City(m) => self.city.update(m).map(Msg::City),
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let header_rows = if self.header_folded { 0 } else { 1 };
        let [header_area, field_area, _, footer_area] = Layout::vertical([
            Constraint::Length(header_rows),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("endpoint ", Style::default().fg(Color::DarkGray)),
                Span::raw(self.endpoint.as_str()),
            ])),
            header_area,
        );

        let chosen = match &self.chosen {
            Some(item) => format!("chosen: {} ({})", item.name, item.id),
            None => "type at least three letters".to_string(),
        };
        frame.render_widget(
            Paragraph::new(chosen).style(Style::default().fg(Color::Green)),
            footer_area,
        );

        let block = field_block("Lookup", self.city.focused(), self.city.selected_id());
        let inner = block.inner(field_area);
        frame.render_widget(block, field_area);
        self.city.view(frame, inner);
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        vec![terminal_events(|event| match event {
            TerminalEvent::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL) => Some(Msg::Quit),
            TerminalEvent::Key(key) => Some(Msg::City(combobox::Message::Key(key))),
            TerminalEvent::Mouse(mouse) => Some(Msg::City(combobox::Message::Mouse(mouse))),
            TerminalEvent::Paste(text) => Some(Msg::City(combobox::Message::Paste(text))),
            _ => None,
        })]
    }
}

#[tokio::main]
async fn main() -> Result<(), comboline::ProgramError> {
    let endpoint =
        std::env::var("COMBOLINE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let options = ProgramOptions {
        mouse_mode: Some(MouseMode::AllMotion),
        title: Some("comboline: remote lookup".into()),
        log_file: Some("remote_lookup.log".into()),
        ..ProgramOptions::default()
    };
    let app = comboline::run_with::<Lookup>(endpoint, options).await?;
    if let Some(item) = app.chosen {
        println!("{}\t{}", item.id, item.name);
    }
    Ok(())
}
