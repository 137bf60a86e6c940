//! Character-cell display seam
//!
//! [`Screen`](crate::Screen) only ever redraws whole rows, highlights a span
//! and pushes the result out, so that is all a panel driver has to offer.

/// Failure reported by a panel driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer to the panel failed
    Communication,
    /// Row or column outside the panel
    InvalidCoordinates,
    /// Panel has not been brought up yet
    NotInitialized,
}

/// Text panel addressed in character cells
pub trait DisplayBackend {
    /// Write `text` starting at cell (`row`, `col`), blanking the cells it
    /// covers first
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Invert cells `start_col..end_col` of `row`
    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError>;

    /// Push pending drawing to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// False until the panel accepts drawing
    fn is_ready(&self) -> bool;
}
