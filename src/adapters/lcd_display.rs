//! LCD display adapter.
//!
//! Implements [`DisplayPort`] with the HD44780 driver.  A failed write
//! is logged and dropped; the next refresh repaints the whole screen.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::drivers::lcd::Lcd;

pub struct LcdDisplay<I2C, D> {
    lcd: Lcd<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> LcdDisplay<I2C, D> {
    pub fn new(lcd: Lcd<I2C, D>) -> Self {
        Self { lcd }
    }
}

impl<I2C: I2c, D: DelayNs> DisplayPort for LcdDisplay<I2C, D> {
    fn show(&mut self, line1: &str, line2: &str) {
        let result = self
            .lcd
            .write_line(0, line1)
            .and_then(|()| self.lcd.write_line(1, line2));
        if let Err(e) = result {
            warn!("LCD: write failed: {}", e);
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.lcd.clear() {
            warn!("LCD: clear failed: {}", e);
        }
    }
}
