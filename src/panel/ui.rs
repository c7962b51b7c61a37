use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph};

use super::lcd::LcdBuffer;

const HELP_TEXT: &str = "←/→ menus  ↑/↓ move  Enter select  Ctrl+C quit";

/// Draw the character display centered in the terminal, with a key legend below.
pub fn draw_lcd(frame: &mut Frame, lcd: &LcdBuffer) {
    let area = frame.area();
    let (width, height) = framed_size(lcd.cols(), lcd.rows());
    let lcd_area = centered(area, width, height);

    let screen = Style::default().fg(Color::Black).bg(Color::LightGreen);
    let block = Block::bordered()
        .title(" netdimm-panel ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::horizontal(1));

    let (cursor_col, cursor_row) = lcd.cursor();
    let lines: Vec<Line> = lcd
        .lines()
        .into_iter()
        .enumerate()
        .map(|(row, text)| {
            if lcd.blink() && row == cursor_row as usize {
                blinking_line(text, cursor_col as usize, screen)
            } else {
                Line::from(Span::styled(text, screen))
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), lcd_area);

    let help_y = lcd_area.bottom();
    if help_y < area.bottom() {
        let help_area = Rect::new(area.x, help_y, area.width, 1);
        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(help, help_area);
    }
}

/// Split a row so the cell under the cursor blinks.
fn blinking_line(text: String, col: usize, base: Style) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    if col >= chars.len() {
        return Line::from(Span::styled(text, base));
    }
    let before: String = chars[..col].iter().collect();
    let at: String = chars[col].to_string();
    let after: String = chars[col + 1..].iter().collect();
    Line::from(vec![
        Span::styled(before, base),
        Span::styled(
            at,
            base.add_modifier(Modifier::SLOW_BLINK | Modifier::REVERSED),
        ),
        Span::styled(after, base),
    ])
}

/// Outer size of the display box: border on every side plus one column of
/// padding left and right.
fn framed_size(cols: u16, rows: u16) -> (u16, u16) {
    (cols.saturating_add(4), rows.saturating_add(2))
}

/// A `width`×`height` rect centered in `outer`, shrunk to fit.
fn centered(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect::new(
        outer.x + (outer.width - width) / 2,
        outer.y + (outer.height - height) / 2,
        width,
        height,
    )
}
