//! HD44780 character panel driver (4-bit mode)
//!
//! Drives the ubiquitous 16x2 character modules over six GPIO lines:
//! RS, E and the upper data nibble D4-D7. R/W is assumed strapped to
//! ground, so the driver never reads the busy flag and paces itself with
//! worst-case execution delays instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use palintrope_core::traits::{Panel, PanelRow, PANEL_COLUMNS};

/// HD44780 instruction set
mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const ENTRY_MODE: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_DDRAM_ADDR: u8 = 0x80;

    /// Entry mode: cursor moves right after each write
    pub const ENTRY_INCREMENT: u8 = 0x02;
    /// Display control: display on, cursor and blink off
    pub const DISPLAY_ON: u8 = 0x04;
    /// Function set: two display lines, 5x8 font
    pub const TWO_LINES: u8 = 0x08;
}

/// DDRAM base address of a panel row.
fn row_address(row: PanelRow) -> u8 {
    match row {
        PanelRow::Top => 0x00,
        PanelRow::Bottom => 0x40,
    }
}

/// Map a byte onto the HD44780 character ROM.
///
/// The stock ROM carries ASCII in the 0x20-0x7D range; everything else
/// renders as a placeholder rather than a random katakana glyph.
fn glyph_for(byte: u8) -> u8 {
    if (0x20..=0x7D).contains(&byte) {
        byte
    } else {
        b'?'
    }
}

/// HD44780 panel driver
pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    d4: P,
    d5: P,
    d6: P,
    d7: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Take ownership of the six control pins. Call [`Hd44780::init`]
    /// before the first write.
    pub fn new(rs: P, en: P, d4: P, d5: P, d6: P, d7: P, delay: D) -> Self {
        Self {
            rs,
            en,
            d4,
            d5,
            d6,
            d7,
            delay,
        }
    }

    /// Bring the controller into 4-bit mode and clear the screen.
    ///
    /// The HD44780 needs 40 ms from Vcc rise before it accepts commands;
    /// the leading delay covers a firmware start racing the supply rail.
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.delay.delay_ms(40);
        self.rs.set_low()?;

        // Reset by instruction: the controller may wake in 8-bit mode or a
        // half-synced 4-bit state, three 0x3 nibbles force 8-bit first.
        self.write_nibble(0x03)?;
        self.delay.delay_ms(5);
        self.write_nibble(0x03)?;
        self.delay.delay_us(150);
        self.write_nibble(0x03)?;
        self.delay.delay_us(150);
        // Now switch to 4-bit mode.
        self.write_nibble(0x02)?;
        self.delay.delay_us(150);

        self.command(cmd::FUNCTION_SET | cmd::TWO_LINES)?;
        self.command(cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON)?;
        self.command(cmd::ENTRY_MODE | cmd::ENTRY_INCREMENT)?;
        self.clear()
    }

    /// Blank the whole display.
    pub fn clear(&mut self) -> Result<(), P::Error> {
        self.command(cmd::CLEAR)?;
        // Clear is the one slow instruction (1.52 ms execution time).
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Replace one row, padding with spaces to the full panel width so
    /// stale characters never survive a shorter line.
    pub fn write_row(&mut self, row: PanelRow, text: &str) -> Result<(), P::Error> {
        self.command(cmd::SET_DDRAM_ADDR | row_address(row))?;
        let mut written = 0;
        for byte in text.bytes().take(PANEL_COLUMNS) {
            self.data(glyph_for(byte))?;
            written += 1;
        }
        for _ in written..PANEL_COLUMNS {
            self.data(b' ')?;
        }
        Ok(())
    }

    fn command(&mut self, byte: u8) -> Result<(), P::Error> {
        self.rs.set_low()?;
        self.write_byte(byte)
    }

    fn data(&mut self, byte: u8) -> Result<(), P::Error> {
        self.rs.set_high()?;
        self.write_byte(byte)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        // Worst-case execution time for every instruction except clear.
        self.delay.delay_us(50);
        Ok(())
    }

    /// Put a nibble on D4-D7 and latch it with a falling edge on E.
    fn write_nibble(&mut self, nibble: u8) -> Result<(), P::Error> {
        set_level(&mut self.d4, nibble & 0x01 != 0)?;
        set_level(&mut self.d5, nibble & 0x02 != 0)?;
        set_level(&mut self.d6, nibble & 0x04 != 0)?;
        set_level(&mut self.d7, nibble & 0x08 != 0)?;
        self.en.set_high()?;
        self.delay.delay_us(1);
        self.en.set_low()?;
        self.delay.delay_us(1);
        Ok(())
    }
}

fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<P: OutputPin, D: DelayNs> Panel for Hd44780<P, D> {
    fn render(&mut self, row: PanelRow, text: &str) {
        // Write-only bus: there is no status to read back and no recovery
        // path for a wedged pin, so bus errors are dropped here.
        let _ = self.write_row(row, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock GPIO pin counting rising edges
    struct MockPin {
        high: bool,
        rises: u32,
    }

    impl MockPin {
        fn new() -> Self {
            Self {
                high: false,
                rises: 0,
            }
        }
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if !self.high {
                self.rises += 1;
            }
            self.high = true;
            Ok(())
        }
    }

    struct MockDelay;

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_row_addresses() {
        assert_eq!(row_address(PanelRow::Top), 0x00);
        assert_eq!(row_address(PanelRow::Bottom), 0x40);
    }

    #[test]
    fn test_glyph_mapping() {
        assert_eq!(glyph_for(b'A'), b'A');
        assert_eq!(glyph_for(b' '), b' ');
        assert_eq!(glyph_for(b'}'), b'}');
        // Outside the ASCII window of the stock ROM.
        assert_eq!(glyph_for(0x7E), b'?');
        assert_eq!(glyph_for(0x00), b'?');
        assert_eq!(glyph_for(0xFF), b'?');
    }

    #[test]
    fn test_render_always_writes_the_full_row() {
        let mut rs = MockPin::new();
        let mut en = MockPin::new();
        let mut d4 = MockPin::new();
        let mut d5 = MockPin::new();
        let mut d6 = MockPin::new();
        let mut d7 = MockPin::new();
        {
            let mut panel = Hd44780::new(
                &mut rs, &mut en, &mut d4, &mut d5, &mut d6, &mut d7, MockDelay,
            );
            panel.render(PanelRow::Top, "Hi");
        }
        // One address command plus sixteen data bytes, two E pulses each:
        // a short line still pads out the whole row.
        assert_eq!(en.rises, 34);
    }

    #[test]
    fn test_render_truncates_long_text() {
        let mut rs = MockPin::new();
        let mut en = MockPin::new();
        let mut d4 = MockPin::new();
        let mut d5 = MockPin::new();
        let mut d6 = MockPin::new();
        let mut d7 = MockPin::new();
        {
            let mut panel = Hd44780::new(
                &mut rs, &mut en, &mut d4, &mut d5, &mut d6, &mut d7, MockDelay,
            );
            panel.render(PanelRow::Bottom, "this line is much too long for the panel");
        }
        // Still exactly one row worth of writes.
        assert_eq!(en.rises, 34);
    }

    #[test]
    fn test_init_command_count() {
        let mut rs = MockPin::new();
        let mut en = MockPin::new();
        let mut d4 = MockPin::new();
        let mut d5 = MockPin::new();
        let mut d6 = MockPin::new();
        let mut d7 = MockPin::new();
        {
            let mut panel = Hd44780::new(
                &mut rs, &mut en, &mut d4, &mut d5, &mut d6, &mut d7, MockDelay,
            );
            panel.init().unwrap();
        }
        // Four reset nibbles, then four full commands of two nibbles each.
        assert_eq!(en.rises, 12);
    }
}
