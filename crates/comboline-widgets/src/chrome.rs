//! Frame drawn around a labelled combobox.

use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders};

/// Bordered block titled with the field label.
///
/// Cyan when focused, dark gray otherwise. The selected item id, if any,
/// is shown on the right of the bottom border.
pub fn field_block<'a>(label: &'a str, focused: bool, selected_id: Option<&'a str>) -> Block<'a> {
    let color = if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::new()
        .borders(Borders::ALL)
        .title(label)
        .border_style(Style::default().fg(color));
    match selected_id {
        Some(id) => block.title_bottom(Line::from(format!(" id {id} ")).right_aligned()),
        None => block,
    }
}
