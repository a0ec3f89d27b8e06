//! HD44780 16x2 character LCD behind a PCF8574 I²C backpack.
//!
//! The backpack exposes the LCD in 4-bit mode:
//!
//! ```text
//!  PCF8574   P7 P6 P5 P4 | P3 | P2 | P1 | P0
//!  HD44780   D7 D6 D5 D4 | BL | EN | RW | RS
//! ```
//!
//! Every byte goes out as two nibbles, each latched by an EN pulse.
//! Text is mapped to the A00 character ROM: printable ASCII as-is, `°`
//! to the ROM degree glyph, anything else to `?`.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::display::LCD_COLS;
use crate::error::DisplayError;

/// Default PCF8574 address (A0–A2 pulled high).
pub const DEFAULT_ADDRESS: u8 = 0x27;

/// Degree sign in the HD44780 A00 ROM.
pub const DEGREE_GLYPH: u8 = 0xDF;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

const LINE_ADDR: [u8; 2] = [0x00, 0x40];

/// ROM code for one character.
pub fn rom_code(c: char) -> u8 {
    match c {
        '\u{00b0}' => DEGREE_GLYPH,
        ' '..='~' => c as u8,
        _ => b'?',
    }
}

pub struct Lcd<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self { i2c, delay, address }
    }

    /// Power-on initialisation into 4-bit, two-line mode.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);

        // Three 8-bit "function set" nibbles, then switch to 4-bit.
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INC)
    }

    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Overwrite one whole line, padding with spaces and cutting at
    /// [`LCD_COLS`] characters.
    pub fn write_line(&mut self, row: usize, text: &str) -> Result<(), DisplayError> {
        let addr = LINE_ADDR.get(row).copied().ok_or(DisplayError::Bus)?;
        self.command(CMD_SET_DDRAM | addr)?;
        let mut chars = text.chars();
        for _ in 0..LCD_COLS {
            let code = chars.next().map_or(b' ', rom_code);
            self.send(code, RS)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.send(cmd, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), DisplayError> {
        let data = (nibble << 4) | mode | BACKLIGHT;
        self.i2c
            .write(self.address, &[data | EN, data])
            .map_err(|_| DisplayError::Bus)?;
        self.delay.delay_us(50);
        Ok(())
    }
}
