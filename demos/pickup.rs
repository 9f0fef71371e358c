//! # Pick-up / Drop-off Example
//!
//! Two comboboxes over the same office list:
//! - Choosing a pick-up office preselects the same drop-off office
//! - The drop-off list hides airport counters and uses its own highlight color
//! - Tab / Shift+Tab move focus, the mouse hovers and clicks entries
//! - When a list would run off the bottom of the screen, the page scrolls
//!   (smoothly for pick-up, at once for drop-off)
//! - Ctrl+S (or Enter with no field focused) shows the form submission
//!
//! Diagnostics go to `pickup.log`; set `RUST_LOG=debug` for detail.
//!
//! Run with: `cargo run --example pickup`

use std::time::Duration;

use comboline::crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use comboline::ratatui::layout::{Alignment, Constraint, Layout};
use comboline::ratatui::style::{Color, Modifier, Style};
use comboline::ratatui::text::{Line, Span};
use comboline::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use comboline::ratatui::Frame;
use comboline::widgets::chrome::field_block;
use comboline::widgets::combobox::{
    self, Combobox, ComboboxConfig, Item, PageScroll, ScrollBehavior,
};
use comboline::widgets::focus::{FocusChange, FocusRing};
use comboline::widgets::form::Form;
use comboline::{
    terminal_events, Command, Component, Model, MouseMode, ProgramOptions, Subscription,
    TerminalEvent,
};

const PICKUP: usize = 0;
const DROPOFF: usize = 1;
const INTRO: &str = "Choose where to collect the car and where to return it. \
Type three letters to jump to a matching office; the arrows move through the \
list and Enter confirms. Leaving a field without confirming puts the last \
chosen office back. Airport counters accept pick-ups only.";
const INTRO_ROWS: u16 = 6;

fn offices() -> Vec<Item> {
    vec![
        Item::new("1", "Rome Termini", "Via Marsala 29"),
        Item::new("2", "Rome Fiumicino", "Airport, Terminal 3").with_icon("✈"),
        Item::new("3", "Turin Porta Nuova", "Corso Vittorio Emanuele II 58"),
        Item::new("4", "Turin Caselle", "Airport, Arrivals").with_icon("✈"),
        Item::new("5", "Trento", "Piazza Dante 11"),
        Item::new("6", "Arezzo", "Via Guido Monaco 2"),
        Item::new("7", "Reggio Emilia", "Viale IV Novembre 7"),
        Item::new("8", "Milan Centrale", "Piazza Duca d'Aosta 1"),
        Item::new("9", "Milan Malpensa", "Airport, Terminal 1").with_icon("✈"),
        Item::new("10", "Naples", "Corso Arnaldo Lucci 167"),
        Item::new("11", "Bologna", "Via Boldrini 2"),
        Item::new("12", "Genoa Brignole", "Piazza Raggi 1"),
    ]
}

fn is_airport(item: &Item) -> bool {
    item.descr.starts_with("Airport")
}

struct PickupApp {
    form: Form,
    pickup: Combobox,
    dropoff: Combobox,
    focus: FocusRing<2>,
    page_offset: u16,
    pending_scroll: u16,
    submission: Option<Vec<(String, String)>>,
}

#[derive(Debug)]
enum Msg {
    Pickup(combobox::Message),
    Dropoff(combobox::Message),
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    ScrollStep,
    Submit,
    Quit,
}

impl Model for PickupApp {
    type Message = Msg;
    type Flags = ();

    fn init(_: ()) -> (Self, Command<Msg>) {
        let mut form = Form::new()
            .with_text_field("pickup")
            .with_text_field("dropoff");

        let pickup = ComboboxConfig::new()
            .with_items(offices())
            .with_highlight_color("#ffc")
            .with_placeholder("pick-up office")
            .with_list_height(6);
        let dropoff = ComboboxConfig::new()
            .with_items(offices())
            .on_filter(|item| !is_airport(item))
            .with_highlight_color("lightgreen")
            .with_placeholder("drop-off office")
            .with_list_height(6)
            .with_smooth_scroll(false);

        // Both fields exist, so attaching cannot fail.
        let pickup = Combobox::attach(&mut form, "pickup", pickup).expect("pickup field");
        let dropoff = Combobox::attach(&mut form, "dropoff", dropoff).expect("dropoff field");

        let mut app = PickupApp {
            form,
            pickup,
            dropoff,
            focus: FocusRing::new(),
            page_offset: 0,
            pending_scroll: 0,
            submission: None,
        };
        let change = app.focus.focus_next();
        let cmd = app.apply_focus(change);
        (app, cmd)
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Pickup(combobox::Message::Selected(item)) => {
                tracing::info!(id = %item.id, name = %item.name, "pick-up office chosen");
                if is_airport(&item) {
                    Command::none()
                } else {
                    self.dropoff.select_by_id(&item.id).map(Msg::Dropoff)
                }
            }
            Msg::Dropoff(combobox::Message::Selected(item)) => {
                tracing::info!(id = %item.id, name = %item.name, "drop-off office chosen");
                Command::none()
            }
            Msg::Pickup(combobox::Message::FocusReleased) => {
                self.focus.release(PICKUP);
                Command::none()
            }
            Msg::Dropoff(combobox::Message::FocusReleased) => {
                self.focus.release(DROPOFF);
                Command::none()
            }
            Msg::Pickup(combobox::Message::PageScroll(scroll))
            | Msg::Dropoff(combobox::Message::PageScroll(scroll)) => self.scroll_page(scroll),
            Msg::Pickup(m) => self.pickup.update(m).map(Msg::Pickup),
            Msg::Dropoff(m) => self.dropoff.update(m).map(Msg::Dropoff),
            Msg::Key(key) => self.on_key(key),
            Msg::Mouse(event) => {
                let pickup = self.pickup.update(combobox::Message::Mouse(event));
                let dropoff = self.dropoff.update(combobox::Message::Mouse(event));
                self.focus.sync(PICKUP, self.pickup.focused());
                self.focus.sync(DROPOFF, self.dropoff.focused());
                Command::batch([pickup.map(Msg::Pickup), dropoff.map(Msg::Dropoff)])
            }
            Msg::Paste(text) => self.route(combobox::Message::Paste(text)),
            Msg::ScrollStep => {
                if self.pending_scroll == 0 || self.page_offset >= INTRO_ROWS {
                    self.pending_scroll = 0;
                    return Command::none();
                }
                self.page_offset += 1;
                self.pending_scroll -= 1;
                Command::tick(Duration::from_millis(30), |_| Msg::ScrollStep)
            }
            Msg::Submit => {
                self.pickup.write_back(&mut self.form);
                self.dropoff.write_back(&mut self.form);
                let submission = self.form.submission();
                tracing::info!(?submission, "form submitted");
                self.submission = Some(submission);
                Command::none()
            }
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let area = frame.area();
        let intro_rows = INTRO_ROWS.saturating_sub(self.page_offset);

        let [title_area, intro_area, pickup_area, dropoff_area, status_area, help_area] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(intro_rows),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Length(3),
            ])
            .areas(area);

        let title = Paragraph::new("Car hire: offices")
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, title_area);

        let intro = Paragraph::new(INTRO)
            .wrap(Wrap { trim: true })
            .scroll((self.page_offset, 0))
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(intro, intro_area);

        let status = match &self.submission {
            Some(fields) => fields
                .iter()
                .map(|(name, value)| Line::from(format!("{name} = {value:?}")))
                .collect(),
            None => vec![Line::from(Span::styled(
                "Nothing submitted yet",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        frame.render_widget(
            Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Submission")),
            status_area,
        );

        let help = Paragraph::new(Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::raw(" next  "),
            Span::styled("↑↓", Style::default().fg(Color::Cyan)),
            Span::raw(" move  "),
            Span::styled("Enter", Style::default().fg(Color::Cyan)),
            Span::raw(" choose  "),
            Span::styled("Ctrl+S", Style::default().fg(Color::Cyan)),
            Span::raw(" submit  "),
            Span::styled("Esc", Style::default().fg(Color::Cyan)),
            Span::raw(" leave / quit"),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(help, help_area);

        // Fields last: an open list overlays whatever lies below its field.
        // The open one goes on top.
        let mut fields = [
            ("Pick-up", &self.pickup, pickup_area),
            ("Drop-off", &self.dropoff, dropoff_area),
        ];
        fields.sort_by_key(|(_, combo, _)| combo.is_open());
        for (label, combo, field_area) in fields {
            let block = field_block(label, combo.focused(), combo.selected_id());
            let inner = block.inner(field_area);
            frame.render_widget(block, field_area);
            combo.view(frame, inner);
        }
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        vec![terminal_events(|event| match event {
            TerminalEvent::Key(key) => Some(Msg::Key(key)),
            TerminalEvent::Mouse(mouse) => Some(Msg::Mouse(mouse)),
            TerminalEvent::Paste(text) => Some(Msg::Paste(text)),
            _ => None,
        })]
    }
}

impl PickupApp {
    fn on_key(&mut self, key: KeyEvent) -> Command<Msg> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                Command::message(Msg::Quit)
            }
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => {
                Command::message(Msg::Submit)
            }
            (KeyCode::Tab, KeyModifiers::NONE) => {
                let change = self.focus.focus_next();
                self.apply_focus(change)
            }
            (KeyCode::BackTab, _) => {
                let change = self.focus.focus_prev();
                self.apply_focus(change)
            }
            _ if self.focus.focused().is_some() => self.route(combobox::Message::Key(key)),
            (KeyCode::Esc, _) => Command::message(Msg::Quit),
            (KeyCode::Enter, _) => Command::message(Msg::Submit),
            _ => Command::none(),
        }
    }

    /// Send `msg` to the focused combobox.
    fn route(&mut self, msg: combobox::Message) -> Command<Msg> {
        match self.focus.focused() {
            Some(PICKUP) => self.pickup.update(msg).map(Msg::Pickup),
            Some(DROPOFF) => self.dropoff.update(msg).map(Msg::Dropoff),
            _ => Command::none(),
        }
    }

    fn apply_focus(&mut self, change: FocusChange) -> Command<Msg> {
        let blur = match change.blur {
            Some(index) => self.slot(index, combobox::Message::Blur(combobox::BlurTarget::Elsewhere)),
            None => Command::none(),
        };
        let focus = match change.focus {
            Some(index) => self.slot(index, combobox::Message::Focus),
            None => Command::none(),
        };
        Command::batch([blur, focus])
    }

    fn slot(&mut self, index: usize, msg: combobox::Message) -> Command<Msg> {
        if index == PICKUP {
            self.pickup.update(msg).map(Msg::Pickup)
        } else {
            self.dropoff.update(msg).map(Msg::Dropoff)
        }
    }

    fn scroll_page(&mut self, scroll: PageScroll) -> Command<Msg> {
        let room = INTRO_ROWS - self.page_offset;
        let rows = scroll.rows.min(room);
        tracing::debug!(rows, ?scroll.behavior, "scrolling page");
        match scroll.behavior {
            ScrollBehavior::Jump => {
                self.page_offset += rows;
                Command::none()
            }
            ScrollBehavior::Smooth => {
                let idle = self.pending_scroll == 0;
                self.pending_scroll = self.pending_scroll.max(rows);
                if idle && rows > 0 {
                    Command::message(Msg::ScrollStep)
                } else {
                    Command::none()
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), comboline::ProgramError> {
    let options = ProgramOptions {
        mouse_mode: Some(MouseMode::AllMotion),
        title: Some("comboline: pick-up".into()),
        log_file: Some("pickup.log".into()),
        ..ProgramOptions::default()
    };
    let app = comboline::run_with::<PickupApp>((), options).await?;
    if let Some(submission) = app.submission {
        for (name, value) in submission {
            println!("{name}={value}");
        }
    }
    Ok(())
}
