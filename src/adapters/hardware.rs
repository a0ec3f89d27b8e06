//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns one adapter per port and forwards each trait to it, so the
//! [`AppService`](crate::app::service::AppService) sees a single value
//! satisfying every port.  On the device the parameters are the RFID,
//! sensor, servo, LCD, serial and RTC adapters; any of them can be
//! swapped for a simulation without touching the rest.

use crate::app::ports::{
    CredentialReaderPort, DisplayPort, EnvironmentPort, LatchActuatorPort, TelemetryPort,
    WallClockPort, WallTime,
};
use crate::credential::CredentialId;
use crate::fsm::context::EnvironmentReading;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<R, E, A, D, T, C> {
    pub reader: R,
    pub sensors: E,
    pub latch: A,
    pub display: D,
    pub telemetry: T,
    pub clock: C,
}

impl<R, E, A, D, T, C> HardwareAdapter<R, E, A, D, T, C> {
    pub fn new(reader: R, sensors: E, latch: A, display: D, telemetry: T, clock: C) -> Self {
        Self {
            reader,
            sensors,
            latch,
            display,
            telemetry,
            clock,
        }
    }
}

// ── Port forwarding ───────────────────────────────────────────

impl<R: CredentialReaderPort, E, A, D, T, C> CredentialReaderPort for HardwareAdapter<R, E, A, D, T, C> {
    fn try_read(&mut self) -> Option<CredentialId> {
        self.reader.try_read()
    }
}

impl<R, E: EnvironmentPort, A, D, T, C> EnvironmentPort for HardwareAdapter<R, E, A, D, T, C> {
    fn read(&mut self) -> EnvironmentReading {
        self.sensors.read()
    }
}

impl<R, E, A: LatchActuatorPort, D, T, C> LatchActuatorPort for HardwareAdapter<R, E, A, D, T, C> {
    fn drive_to(&mut self, angle_deg: u8) {
        self.latch.drive_to(angle_deg);
    }

    fn release(&mut self) {
        self.latch.release();
    }
}

impl<R, E, A, D: DisplayPort, T, C> DisplayPort for HardwareAdapter<R, E, A, D, T, C> {
    fn show(&mut self, line1: &str, line2: &str) {
        self.display.show(line1, line2);
    }

    fn clear(&mut self) {
        self.display.clear();
    }
}

impl<R, E, A, D, T: TelemetryPort, C> TelemetryPort for HardwareAdapter<R, E, A, D, T, C> {
    fn send_line(&mut self, line: &str) {
        self.telemetry.send_line(line);
    }
}

impl<R, E, A, D, T, C: WallClockPort> WallClockPort for HardwareAdapter<R, E, A, D, T, C> {
    fn wall_time(&mut self) -> Option<WallTime> {
        self.clock.wall_time()
    }
}
