//! Latch servo driver (SG90-class hobby servo on LEDC).
//!
//! Angle maps linearly onto a 500 – 2500 µs pulse inside the 20 ms
//! (50 Hz) frame.  [`ServoDriver::release`] writes duty 0: no pulses, so
//! the horn is unpowered and does not jitter while the box idles.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty register (channel set up by hw_init).
//! On host/test: only records the duty, readable through
//! [`ServoDriver::duty`].

use log::debug;

use crate::app::ports::LatchActuatorPort;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

pub const MIN_PULSE_US: u32 = 500;
pub const MAX_PULSE_US: u32 = 2_500;
pub const MAX_ANGLE_DEG: u8 = 180;

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const DUTY_MAX: u32 = (1 << pins::SERVO_PWM_RESOLUTION_BITS) - 1;

/// Pulse width for `angle_deg`, clamped to 0 – 180°.
pub fn angle_to_pulse_us(angle_deg: u8) -> u32 {
    let angle = u32::from(angle_deg.min(MAX_ANGLE_DEG));
    MIN_PULSE_US + angle * (MAX_PULSE_US - MIN_PULSE_US) / u32::from(MAX_ANGLE_DEG)
}

/// LEDC duty value producing `pulse_us` at the servo frame rate.
pub fn pulse_to_duty(pulse_us: u32) -> u32 {
    pulse_us * DUTY_MAX / FRAME_US
}

pub struct ServoDriver {
    duty: u32,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self { duty: 0 }
    }

    /// Start driving towards `angle_deg`.
    pub fn drive_to(&mut self, angle_deg: u8) {
        let pulse = angle_to_pulse_us(angle_deg);
        debug!("Servo: {}° ({} µs)", angle_deg, pulse);
        self.apply(pulse_to_duty(pulse));
    }

    /// Stop the pulse train.
    pub fn release(&mut self) {
        debug!("Servo: released");
        self.apply(0);
    }

    /// Duty value currently written.
    pub fn duty(&self) -> u32 {
        self.duty
    }

    fn apply(&mut self, duty: u32) {
        self.duty = duty;
        #[cfg(target_os = "espidf")]
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, duty);
    }
}

impl LatchActuatorPort for ServoDriver {
    fn drive_to(&mut self, angle_deg: u8) {
        ServoDriver::drive_to(self, angle_deg);
    }

    fn release(&mut self) {
        ServoDriver::release(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_endpoints() {
        assert_eq!(angle_to_pulse_us(0), 500);
        assert_eq!(angle_to_pulse_us(90), 1_500);
        assert_eq!(angle_to_pulse_us(180), 2_500);
    }

    #[test]
    fn angle_clamped_to_180() {
        assert_eq!(angle_to_pulse_us(255), 2_500);
    }

    #[test]
    fn duty_scales_with_frame() {
        // 1.5 ms of a 20 ms frame at 14 bits.
        assert_eq!(pulse_to_duty(1_500), 1_500 * 16_383 / 20_000);
        assert_eq!(pulse_to_duty(20_000), 16_383);
    }

    #[test]
    fn release_writes_zero_duty() {
        let mut servo = ServoDriver::new();
        servo.drive_to(90);
        assert!(servo.duty() > 0);
        servo.release();
        assert_eq!(servo.duty(), 0);
    }
}
