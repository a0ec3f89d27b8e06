//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces an
//! [`EnvironmentReading`] each telemetry tick.  It is the
//! [`EnvironmentPort`] implementation used on the device.

pub mod dht22;
pub mod leak;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::EnvironmentPort;
use crate::fsm::context::EnvironmentReading;
use dht22::{Dht22, validate_humidity, validate_temperature};
use leak::LeakSensor;

/// Aggregates all sensor drivers and produces a unified reading.
pub struct SensorHub<P, D> {
    pub climate: Dht22<P, D>,
    pub leak: LeakSensor,
}

impl<P, D> SensorHub<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Pass in pre-built drivers (built in main where peripheral
    /// ownership is established).
    pub fn new(climate: Dht22<P, D>, leak: LeakSensor) -> Self {
        Self { climate, leak }
    }

    /// Read every sensor.
    ///
    /// A failed climate transfer invalidates both climate fields; an
    /// out-of-range value invalidates only its own field.  The leak probe
    /// always yields a value.
    pub fn read_all(&mut self) -> EnvironmentReading {
        let leak_raw = self.leak.read();

        let (temperature_c, humidity_pct) = match self.climate.read() {
            Ok(frame) => {
                let t = validate_temperature(frame.temperature_c)
                    .inspect_err(|e| warn!("DHT22 temperature {:.1}: {}", frame.temperature_c, e))
                    .ok();
                let h = validate_humidity(frame.humidity_pct)
                    .inspect_err(|e| warn!("DHT22 humidity {:.1}: {}", frame.humidity_pct, e))
                    .ok();
                (t, h)
            }
            Err(e) => {
                warn!("DHT22 read failed: {}", e);
                (None, None)
            }
        };

        EnvironmentReading {
            temperature_c,
            humidity_pct,
            leak_raw,
        }
    }
}

impl<P, D> EnvironmentPort for SensorHub<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read(&mut self) -> EnvironmentReading {
        self.read_all()
    }
}
