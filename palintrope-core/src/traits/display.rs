//! Character panel trait
//!
//! The operator panel is a two-line, 16-column character display. The core
//! pushes opaque row text to it and never reads anything back; wiring, bus
//! width and controller chip are implementation concerns.

/// Columns on the character panel.
pub const PANEL_COLUMNS: usize = 16;

/// Row on the two-line panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PanelRow {
    Top = 0,
    Bottom = 1,
}

/// Trait for the operator panel.
///
/// Implementations own the full row: `render` replaces the entire line, so
/// callers never need to pad or clear. Text longer than [`PANEL_COLUMNS`]
/// is truncated.
pub trait Panel {
    /// Replace one row of the panel with the given text.
    fn render(&mut self, row: PanelRow, text: &str);

    /// Render both rows at once.
    fn render_screen(&mut self, top: &str, bottom: &str) {
        self.render(PanelRow::Top, top);
        self.render(PanelRow::Bottom, bottom);
    }
}
