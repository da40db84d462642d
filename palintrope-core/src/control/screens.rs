//! Screen building
//!
//! Builds the two 16-character rows for every UI state. The controller
//! decides *which* screen to build; the panel driver decides how the rows
//! reach the glass. Nothing here reads state, so every builder is a pure
//! function of its arguments.

use core::fmt;

use heapless::String;

use crate::calibration::{CalibrationData, CalibrationPhase};
use crate::config::CycleSettings;
use crate::control::controller::NoticeKind;
use crate::menu::MenuCursor;
use crate::state::{EmergencyCause, FaultKind};
use crate::traits::{Direction, PanelRow, PANEL_COLUMNS};

/// A rendered screen: both panel rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    lines: [String<PANEL_COLUMNS>; 2],
}

impl Screen {
    /// An empty (blank) screen.
    pub const fn new() -> Self {
        Self {
            lines: [String::new(), String::new()],
        }
    }

    fn from_rows(top: &str, bottom: &str) -> Self {
        let mut screen = Self::new();
        screen.set_line(PanelRow::Top, top);
        screen.set_line(PanelRow::Bottom, bottom);
        screen
    }

    /// Replace one row, truncating to the panel width.
    pub fn set_line(&mut self, row: PanelRow, text: &str) {
        let line = &mut self.lines[row as usize];
        line.clear();
        let _ = line.push_str(&text[..text.len().min(PANEL_COLUMNS)]);
    }

    /// Text of one row.
    pub fn line(&self, row: PanelRow) -> &str {
        self.lines[row as usize].as_str()
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

fn write_to_string(s: &mut String<PANEL_COLUMNS>, args: fmt::Arguments<'_>) -> fmt::Result {
    use fmt::Write;
    s.write_fmt(args)
}

/// Boot welcome screen.
pub fn welcome() -> Screen {
    Screen::from_rows("   PALINTROPE", "starting up...")
}

/// Menu screen for the cursor position: the top-level label on the first
/// row; the second row names the highlighted child, or the gesture hints
/// at the root level.
pub fn menu(cursor: &MenuCursor) -> Screen {
    let mut screen = Screen::new();
    screen.set_line(PanelRow::Top, cursor.current_top().label);
    if cursor.at_top_level() {
        screen.set_line(PanelRow::Bottom, "A:next    B:open");
    } else {
        let mut line: String<PANEL_COLUMNS> = String::new();
        let _ = line.push_str("> ");
        let _ = line.push_str(cursor.current().label);
        screen.set_line(PanelRow::Bottom, &line);
    }
    screen
}

/// Dial screen for minutes per cycle.
pub fn setting_time(pending: u16) -> Screen {
    let mut screen = Screen::new();
    screen.set_line(PanelRow::Top, "Set time");
    let mut line: String<PANEL_COLUMNS> = String::new();
    let _ = write_to_string(&mut line, format_args!("{} min/cycle", pending));
    screen.set_line(PanelRow::Bottom, &line);
    screen
}

/// Dial screen for the cycle count.
pub fn setting_cycles(pending: u16) -> Screen {
    let mut screen = Screen::new();
    screen.set_line(PanelRow::Top, "Set cycles");
    let mut line: String<PANEL_COLUMNS> = String::new();
    let _ = write_to_string(&mut line, format_args!("{} cycles", pending));
    screen.set_line(PanelRow::Bottom, &line);
    screen
}

/// Run progress: pace and direction on top, cycle counter below.
pub fn running(minutes: u16, cycle: u16, total: u16, direction: Direction) -> Screen {
    let arrow = match direction {
        Direction::Left => '<',
        Direction::Right => '>',
    };
    let mut top: String<PANEL_COLUMNS> = String::new();
    let _ = write_to_string(&mut top, format_args!("Run {} {}m/cycle", arrow, minutes));
    let mut bottom: String<PANEL_COLUMNS> = String::new();
    let _ = write_to_string(&mut bottom, format_args!("cycle {} of {}", cycle, total));

    let mut screen = Screen::new();
    screen.set_line(PanelRow::Top, &top);
    screen.set_line(PanelRow::Bottom, &bottom);
    screen
}

/// Calibration progress.
pub fn calibrating(phase: CalibrationPhase) -> Screen {
    let detail = match phase {
        CalibrationPhase::SeekLeft => "seek left",
        CalibrationPhase::BackoffLeft => "backoff left",
        CalibrationPhase::SeekRight => "seek right",
        CalibrationPhase::BackoffRight => "backoff right",
        CalibrationPhase::Complete => "measuring done",
        CalibrationPhase::Faulted => "fault",
    };
    Screen::from_rows("Calibrating", detail)
}

/// Emergency screen with its cause.
pub fn emergency(cause: EmergencyCause) -> Screen {
    let detail = match cause {
        EmergencyCause::Operator => "operator stop",
        EmergencyCause::Fault(FaultKind::LeftLimitNotFound) => "no left limit",
        EmergencyCause::Fault(FaultKind::RightLimitNotFound) => "no right limit",
        EmergencyCause::Fault(FaultKind::TravelTooShort) => "travel too short",
        EmergencyCause::Fault(FaultKind::UnexpectedLimit) => "unexpected limit",
        EmergencyCause::Fault(FaultKind::InvalidTuning) => "bad tuning",
    };
    Screen::from_rows("!! EMERGENCY !!", detail)
}

/// Transient notice screens.
pub fn notice(
    kind: NoticeKind,
    working: CycleSettings,
    calibration: Option<CalibrationData>,
) -> Screen {
    match kind {
        NoticeKind::Welcome => welcome(),
        NoticeKind::ResetDone => Screen::from_rows("Reset done", "defaults loaded"),
        NoticeKind::CalibrationDone => {
            let mut bottom: String<PANEL_COLUMNS> = String::new();
            let steps = calibration.map(|c| c.steps_between_limits).unwrap_or(0);
            let _ = write_to_string(&mut bottom, format_args!("{} steps", steps));
            let mut screen = Screen::new();
            screen.set_line(PanelRow::Top, "Calibrated");
            screen.set_line(PanelRow::Bottom, &bottom);
            screen
        }
        NoticeKind::TimeSet => {
            let mut bottom: String<PANEL_COLUMNS> = String::new();
            let _ = write_to_string(
                &mut bottom,
                format_args!("{} min/cycle", working.cycle_minutes),
            );
            let mut screen = Screen::new();
            screen.set_line(PanelRow::Top, "Time set");
            screen.set_line(PanelRow::Bottom, &bottom);
            screen
        }
        NoticeKind::CyclesSet => {
            let mut bottom: String<PANEL_COLUMNS> = String::new();
            let _ = write_to_string(&mut bottom, format_args!("{} cycles", working.cycle_count));
            let mut screen = Screen::new();
            screen.set_line(PanelRow::Top, "Cycles set");
            screen.set_line(PanelRow::Bottom, &bottom);
            screen
        }
        NoticeKind::DataSaved => Screen::from_rows("Settings saved", ""),
        NoticeKind::SaveCancelled => Screen::from_rows("Save cancelled", "edits dropped"),
        NoticeKind::SaveFailed => Screen::from_rows("Save failed", "storage error"),
        NoticeKind::MustCalibrate => Screen::from_rows("Calibrate first", "then start a run"),
        NoticeKind::Info => {
            let mut top: String<PANEL_COLUMNS> = String::new();
            let _ = write_to_string(&mut top, format_args!("time   {} min", working.cycle_minutes));
            let mut bottom: String<PANEL_COLUMNS> = String::new();
            let _ = write_to_string(&mut bottom, format_args!("cycles {}", working.cycle_count));
            let mut screen = Screen::new();
            screen.set_line(PanelRow::Top, &top);
            screen.set_line(PanelRow::Bottom, &bottom);
            screen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_never_exceed_panel_width() {
        let screens = [
            welcome(),
            setting_time(3),
            setting_cycles(99),
            running(6, 10, 99, Direction::Right),
            calibrating(CalibrationPhase::BackoffRight),
            emergency(EmergencyCause::Fault(FaultKind::TravelTooShort)),
            notice(NoticeKind::Info, CycleSettings::new(6, 99), None),
        ];
        for screen in screens {
            assert!(screen.line(PanelRow::Top).len() <= PANEL_COLUMNS);
            assert!(screen.line(PanelRow::Bottom).len() <= PANEL_COLUMNS);
        }
    }

    #[test]
    fn test_menu_screen_shows_child_selection() {
        let mut cursor = MenuCursor::new();
        let screen = menu(&cursor);
        assert_eq!(screen.line(PanelRow::Top), "Start activity");
        assert_eq!(screen.line(PanelRow::Bottom), "A:next    B:open");

        cursor.confirm();
        let screen = menu(&cursor);
        assert_eq!(screen.line(PanelRow::Top), "Start activity");
        assert_eq!(screen.line(PanelRow::Bottom), "> Reset defaults");
    }

    #[test]
    fn test_running_screen_progress() {
        let screen = running(3, 2, 10, Direction::Left);
        assert_eq!(screen.line(PanelRow::Top), "Run < 3m/cycle");
        assert_eq!(screen.line(PanelRow::Bottom), "cycle 2 of 10");
    }

    #[test]
    fn test_set_line_truncates() {
        let mut screen = Screen::new();
        screen.set_line(PanelRow::Top, "0123456789abcdefOVERFLOW");
        assert_eq!(screen.line(PanelRow::Top), "0123456789abcdef");
    }
}
