//! Screen buffer types
//!
//! Provides a character-based screen buffer that remembers which rows
//! changed since the last render.

use heapless::String;

use crate::backend::{DisplayBackend, DisplayError};

/// Number of character rows kept in the buffer
pub const SCREEN_ROWS: usize = 4;

/// Number of character columns (128 px / 6 px glyphs)
pub const SCREEN_COLS: usize = 21;

/// Maximum characters per line
pub const LINE_LEN: usize = SCREEN_COLS;

/// Row-diffing screen buffer for text-mode displays
#[derive(Clone)]
pub struct Screen {
    /// Current display content
    lines: [String<LINE_LEN>; SCREEN_ROWS],
    /// Inverted region per row (start_col, end_col)
    highlights: [Option<(u8, u8)>; SCREEN_ROWS],
    /// Bit per row that must be redrawn
    dirty: u8,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    const ALL_ROWS: u8 = (1 << SCREEN_ROWS) - 1;

    /// Create a new empty screen; every row starts dirty
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            highlights: [None; SCREEN_ROWS],
            dirty: Self::ALL_ROWS,
        }
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for row in 0..SCREEN_ROWS {
            self.set_line(row, "");
            self.set_highlight(row, None);
        }
    }

    /// Set the content of a specific row
    ///
    /// The row is only marked dirty when its text actually changes.
    pub fn set_line(&mut self, row: usize, text: &str) {
        let Some(line) = self.lines.get_mut(row) else {
            return;
        };
        // Truncate if too long, on a char boundary
        let mut end = text.len().min(LINE_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let text = &text[..end];
        if line.as_str() == text {
            return;
        }
        line.clear();
        let _ = line.push_str(text);
        self.dirty |= 1 << row;
    }

    /// Get the content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Set or clear the inverted region for a row
    pub fn set_highlight(&mut self, row: usize, region: Option<(u8, u8)>) {
        if let Some(highlight) = self.highlights.get_mut(row) {
            if *highlight != region {
                *highlight = region;
                self.dirty |= 1 << row;
            }
        }
    }

    /// Get highlight region for a row
    pub fn get_highlight(&self, row: usize) -> Option<(u8, u8)> {
        self.highlights.get(row).copied().flatten()
    }

    /// Check if any row needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Check if a specific row needs redrawing
    pub fn is_row_dirty(&self, row: usize) -> bool {
        row < SCREEN_ROWS && self.dirty & (1 << row) != 0
    }

    /// Mark every row as needing a redraw
    pub fn mark_dirty(&mut self) {
        self.dirty = Self::ALL_ROWS;
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Draw the dirty rows and flush once
    ///
    /// Rows are padded to the full width so shorter text erases what was
    /// there before. Rows that fail to draw stay dirty.
    ///
    /// Returns the number of rows drawn.
    pub fn render<B: DisplayBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<usize, DisplayError> {
        if !self.is_dirty() {
            return Ok(0);
        }
        if !backend.is_ready() {
            return Err(DisplayError::NotInitialized);
        }

        let mut drawn = 0;
        for row in 0..SCREEN_ROWS {
            if !self.is_row_dirty(row) {
                continue;
            }
            let mut padded: String<LINE_LEN> = String::new();
            let _ = padded.push_str(&self.lines[row]);
            while padded.push(' ').is_ok() {}

            backend.draw_text(row as u8, 0, &padded)?;
            if let Some((start, end)) = self.highlights[row] {
                backend.invert_region(row as u8, start, end)?;
            }
            self.dirty &= !(1 << row);
            drawn += 1;
        }

        backend.flush()?;
        Ok(drawn)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}
