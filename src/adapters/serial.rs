//! Serial telemetry adapter.
//!
//! Implements [`TelemetryPort`] over any `std::io::Write`.  On the device
//! that is stdout, which ESP-IDF routes to the UART0 console at
//! 115200 baud; on the host it is usually a `Vec<u8>`.

use std::io::Write;

use log::warn;

use crate::app::ports::TelemetryPort;

pub struct SerialTelemetry<W> {
    out: W,
}

impl<W: Write> SerialTelemetry<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TelemetryPort for SerialTelemetry<W> {
    fn send_line(&mut self, line: &str) {
        let result = self
            .out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!("Telemetry write failed: {}", e);
        }
    }
}
