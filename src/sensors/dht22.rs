//! DHT22 / AM2302 temperature + humidity sensor (single-wire).
//!
//! ```text
//!  host:  ‾‾‾\____ ≥1 ms ____/‾‾ release
//!  dht:                        \_80µs_/‾80µs‾\  40 × ( \_50µs_/‾26µs‾\ = 0
//!                                                     \_50µs_/‾70µs‾\ = 1 )
//! ```
//!
//! Bits are decoded by sampling the line 35 µs after each rising edge:
//! still high means a long (1) pulse.  Frame: humidity ×10 (u16),
//! temperature ×10 (sign-magnitude u16), checksum = low byte of the sum
//! of the first four bytes.
//!
//! The data pin must be open-drain with a pull-up, so it implements both
//! `InputPin` and `OutputPin`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;

/// Valid temperature range (°C).
pub const TEMP_MIN_C: f32 = -40.0;
pub const TEMP_MAX_C: f32 = 80.0;

/// Valid humidity range (% RH).
pub const HUMIDITY_MIN: f32 = 0.0;
pub const HUMIDITY_MAX: f32 = 100.0;

const START_LOW_MS: u32 = 2;
const EDGE_TIMEOUT_US: u32 = 100;
const BIT_SAMPLE_US: u32 = 35;

/// One decoded frame, before range validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dht22Frame {
    pub humidity_pct: f32,
    pub temperature_c: f32,
}

/// Decode the five raw bytes received from the sensor.
pub fn decode(bytes: [u8; 5]) -> Result<Dht22Frame, SensorError> {
    let sum = bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != bytes[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = u16::from_be_bytes([bytes[0], bytes[1]]);
    let temp_raw = u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]]);
    let mut temperature_c = f32::from(temp_raw) / 10.0;
    if bytes[2] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }

    Ok(Dht22Frame {
        humidity_pct: f32::from(humidity) / 10.0,
        temperature_c,
    })
}

/// Range-check a temperature.
pub fn validate_temperature(t: f32) -> Result<f32, SensorError> {
    if (TEMP_MIN_C..=TEMP_MAX_C).contains(&t) {
        Ok(t)
    } else {
        Err(SensorError::OutOfRange)
    }
}

/// Range-check a relative humidity.
pub fn validate_humidity(h: f32) -> Result<f32, SensorError> {
    if (HUMIDITY_MIN..=HUMIDITY_MAX).contains(&h) {
        Ok(h)
    } else {
        Err(SensorError::OutOfRange)
    }
}

pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// The pin is left released (high via pull-up).
    pub fn new(mut pin: P, delay: D) -> Self {
        let _ = pin.set_high();
        Self { pin, delay }
    }

    /// Run one full transfer.  Takes about 5 ms; the sensor needs 2 s
    /// between reads.
    pub fn read(&mut self) -> Result<Dht22Frame, SensorError> {
        // Start signal
        self.pin.set_low().map_err(|_| SensorError::Gpio)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::Gpio)?;

        // Response: low 80 µs, high 80 µs, then the first bit's low phase
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut bytes = [0u8; 5];
        for byte in &mut bytes {
            for _ in 0..8 {
                self.wait_for(true)?;
                self.delay.delay_us(BIT_SAMPLE_US);
                let bit = self.pin.is_high().map_err(|_| SensorError::Gpio)?;
                *byte = (*byte << 1) | u8::from(bit);
                if bit {
                    self.wait_for(false)?;
                }
            }
        }

        decode(bytes)
    }

    /// Spin until the line reaches `high`, 1 µs per poll.
    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        for _ in 0..EDGE_TIMEOUT_US {
            if self.pin.is_high().map_err(|_| SensorError::Gpio)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}
