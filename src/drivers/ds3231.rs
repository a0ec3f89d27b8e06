//! DS3231 battery-backed real-time clock over I²C.
//!
//! Only the time-of-day registers are read; the date is not displayed.
//! Register values are BCD.  The hour register is either 24-hour or
//! 12-hour with an AM/PM bit, depending on how the clock was set.

use embedded_hal::i2c::I2c;

use crate::app::ports::WallTime;
use crate::error::RtcError;

pub const ADDRESS: u8 = 0x68;

const REG_SECONDS: u8 = 0x00;
const REG_STATUS: u8 = 0x0F;

/// Oscillator-stop flag: the clock lost power and the time is stale.
const STATUS_OSF: u8 = 0x80;

const HOUR_12H: u8 = 0x40;
const HOUR_PM: u8 = 0x20;

fn bcd(value: u8) -> Result<u8, RtcError> {
    let (hi, lo) = (value >> 4, value & 0x0F);
    if hi > 9 || lo > 9 {
        return Err(RtcError::InvalidTime);
    }
    Ok(hi * 10 + lo)
}

/// Decode the minutes and hours registers into a 24-hour time.
pub fn decode_time(minutes_reg: u8, hours_reg: u8) -> Result<WallTime, RtcError> {
    let minute = bcd(minutes_reg & 0x7F)?;

    let hour = if hours_reg & HOUR_12H != 0 {
        let h12 = bcd(hours_reg & 0x1F)?;
        if !(1..=12).contains(&h12) {
            return Err(RtcError::InvalidTime);
        }
        let pm = hours_reg & HOUR_PM != 0;
        match (h12, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        }
    } else {
        bcd(hours_reg & 0x3F)?
    };

    if hour > 23 || minute > 59 {
        return Err(RtcError::InvalidTime);
    }
    Ok(WallTime { hour, minute })
}

pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Current time of day.  A clock whose oscillator stopped reports
    /// `InvalidTime` until it is set again.
    pub fn time(&mut self) -> Result<WallTime, RtcError> {
        let mut status = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[REG_STATUS], &mut status)
            .map_err(|_| RtcError::Bus)?;
        if status[0] & STATUS_OSF != 0 {
            return Err(RtcError::InvalidTime);
        }

        let mut regs = [0u8; 3];
        self.i2c
            .write_read(ADDRESS, &[REG_SECONDS], &mut regs)
            .map_err(|_| RtcError::Bus)?;
        decode_time(regs[1], regs[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_24_hour_mode() {
        assert_eq!(decode_time(0x05, 0x14), Ok(WallTime { hour: 14, minute: 5 }));
        assert_eq!(decode_time(0x59, 0x23), Ok(WallTime { hour: 23, minute: 59 }));
    }

    #[test]
    fn decodes_12_hour_mode() {
        // 12:30 AM -> 00:30, 12:30 PM -> 12:30, 7 PM -> 19
        assert_eq!(decode_time(0x30, HOUR_12H | 0x12), Ok(WallTime { hour: 0, minute: 30 }));
        assert_eq!(
            decode_time(0x30, HOUR_12H | HOUR_PM | 0x12),
            Ok(WallTime { hour: 12, minute: 30 })
        );
        assert_eq!(
            decode_time(0x00, HOUR_12H | HOUR_PM | 0x07),
            Ok(WallTime { hour: 19, minute: 0 })
        );
    }

    #[test]
    fn rejects_non_bcd_and_out_of_range() {
        assert_eq!(decode_time(0x0A, 0x10), Err(RtcError::InvalidTime));
        assert_eq!(decode_time(0x60, 0x10), Err(RtcError::InvalidTime));
        assert_eq!(decode_time(0x00, 0x24), Err(RtcError::InvalidTime));
        assert_eq!(decode_time(0x00, HOUR_12H | 0x13), Err(RtcError::InvalidTime));
    }
}
