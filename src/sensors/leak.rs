//! Resistive leak probe read via the ESP32-S3 ADC.
//!
//! Two exposed traces in a divider: water between them pulls the ADC
//! input up, so higher raw values mean a wetter probe.  The raw 12-bit
//! value is reported as-is; the LEAK/DRY decision is a threshold applied
//! by the telemetry and display code.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH4 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_LEAK_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_leak_adc(raw: u16) {
    SIM_LEAK_ADC.store(raw, Ordering::Relaxed);
}

/// Largest value a 12-bit conversion can return.
pub const ADC_MAX: u16 = 4095;

pub struct LeakSensor {
    _adc_gpio: i32,
}

impl LeakSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self { _adc_gpio: adc_gpio }
    }

    /// Raw probe value, 0 – 4095.
    pub fn read(&self) -> u16 {
        self.read_adc().min(ADC_MAX)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_LEAK)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_LEAK_ADC.load(Ordering::Relaxed)
    }
}
