//! Wall-clock adapter over the DS3231.

use embedded_hal::i2c::I2c;
use log::debug;

use crate::app::ports::{WallClockPort, WallTime};
use crate::drivers::ds3231::Ds3231;

pub struct RtcClock<I2C> {
    rtc: Ds3231<I2C>,
}

impl<I2C: I2c> RtcClock<I2C> {
    pub fn new(rtc: Ds3231<I2C>) -> Self {
        Self { rtc }
    }
}

impl<I2C: I2c> WallClockPort for RtcClock<I2C> {
    fn wall_time(&mut self) -> Option<WallTime> {
        self.rtc
            .time()
            .inspect_err(|e| debug!("RTC: {}", e))
            .ok()
    }
}
