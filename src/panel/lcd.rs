//! Character-cell model of a small HD44780-style display.
//!
//! Text is written at the cursor; `\n` moves to the start of the next row and
//! characters past the last column are dropped.

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone)]
pub struct LcdBuffer {
    cols: u16,
    rows: u16,
    cells: Vec<char>,
    cursor: (u16, u16),
    blink: bool,
}

impl LcdBuffer {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![' '; cols as usize * rows as usize],
            cursor: (0, 0),
            blink: false,
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn blink(&self) -> bool {
        self.blink
    }

    /// Blank every cell and home the cursor. The blink state is kept.
    pub fn clear(&mut self) {
        self.cells.fill(' ');
        self.cursor = (0, 0);
    }

    pub fn write(&mut self, text: &str) {
        for ch in text.chars() {
            let (col, row) = self.cursor;
            if ch == '\n' {
                self.cursor = (0, (row + 1).min(self.rows.saturating_sub(1)));
                continue;
            }
            if col >= self.cols || row >= self.rows {
                continue;
            }
            // One glyph per cell: anything that is not single-width shows as '?'.
            let glyph = if ch.width() == Some(1) { ch } else { '?' };
            let idx = row as usize * self.cols as usize + col as usize;
            self.cells[idx] = glyph;
            self.cursor = (col + 1, row);
        }
    }

    pub fn set_cursor(&mut self, col: u16, row: u16) {
        self.cursor = (
            col.min(self.cols.saturating_sub(1)),
            row.min(self.rows.saturating_sub(1)),
        );
    }

    pub fn toggle_blink(&mut self) {
        self.blink = !self.blink;
    }

    /// Each row as a string of exactly `cols` characters.
    pub fn lines(&self) -> Vec<String> {
        if self.cols == 0 {
            return vec![String::new(); self.rows as usize];
        }
        self.cells
            .chunks(self.cols as usize)
            .map(|row| row.iter().collect())
            .collect()
    }

    /// Rows with trailing padding removed, joined by `\n`.
    pub fn text(&self) -> String {
        self.lines()
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_moves_to_second_row() {
        let mut lcd = LcdBuffer::new(16, 2);
        lcd.write("Transfer\nComplete!");
        assert_eq!(lcd.text(), "Transfer\nComplete!");
        assert_eq!(lcd.cursor(), (9, 1));
    }

    #[test]
    fn test_overflow_is_dropped() {
        let mut lcd = LcdBuffer::new(4, 1);
        lcd.write("abcdefg");
        assert_eq!(lcd.lines(), vec!["abcd"]);
    }

    #[test]
    fn test_write_without_clear_continues_at_cursor() {
        let mut lcd = LcdBuffer::new(16, 2);
        lcd.write("Scanning...");
        lcd.write("\n3 Games");
        assert_eq!(lcd.text(), "Scanning...\n3 Games");
    }

    #[test]
    fn test_clear_homes_cursor_and_keeps_blink() {
        let mut lcd = LcdBuffer::new(16, 2);
        lcd.write("hello");
        lcd.toggle_blink();
        lcd.clear();
        assert_eq!(lcd.text(), "\n");
        assert_eq!(lcd.cursor(), (0, 0));
        assert!(lcd.blink());
    }

    #[test]
    fn test_wide_chars_are_replaced() {
        let mut lcd = LcdBuffer::new(8, 1);
        lcd.write("a漢b");
        assert_eq!(lcd.text(), "a?b");
    }

    #[test]
    fn test_set_cursor_clamps() {
        let mut lcd = LcdBuffer::new(16, 2);
        lcd.set_cursor(40, 9);
        assert_eq!(lcd.cursor(), (15, 1));
    }
}
