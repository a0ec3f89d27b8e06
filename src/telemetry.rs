//! Telemetry line encoding.
//!
//! One line per telemetry tick, four `|`-separated fields:
//!
//! ```text
//! <temp>|<humidity>|<LEAK|DRY>|<LOCKED|OPEN>
//! 23.40|45.10|DRY|LOCKED
//! ```
//!
//! If either climate field is invalid the whole line degrades to
//! [`SENTINEL_LINE`]; a partially valid line is never sent.

use core::fmt::Write;

use heapless::String;

use crate::fsm::context::{EnvironmentReading, LockState};

/// Line sent when temperature or humidity could not be read.
pub const SENTINEL_LINE: &str = "ERROR|ERROR|ERROR|ERROR";

/// Field separator.
pub const DELIMITER: char = '|';

/// Capacity of an encoded line (without the trailing newline).
pub const MAX_LINE_LEN: usize = 48;

/// Leak probe interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterStatus {
    Leak,
    Dry,
}

impl WaterStatus {
    /// Higher raw values mean a more conductive, wetter probe.  Strictly
    /// above the threshold is a leak.
    pub fn from_raw(raw: u16, threshold: u16) -> Self {
        if raw > threshold { Self::Leak } else { Self::Dry }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leak => "LEAK",
            Self::Dry => "DRY",
        }
    }
}

/// Everything one telemetry tick reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryFrame {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub water: WaterStatus,
    pub lock: LockState,
}

impl TelemetryFrame {
    pub fn new(reading: &EnvironmentReading, lock: LockState, leak_threshold: u16) -> Self {
        Self {
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            water: WaterStatus::from_raw(reading.leak_raw, leak_threshold),
            lock,
        }
    }

    /// True when this frame encodes to the sentinel line.
    pub fn is_degraded(&self) -> bool {
        self.temperature_c.is_none() || self.humidity_pct.is_none()
    }

    /// Encode the frame as a telemetry line (no trailing newline).
    pub fn encode(&self) -> String<MAX_LINE_LEN> {
        let mut line = String::new();
        let (Some(t), Some(h)) = (self.temperature_c, self.humidity_pct) else {
            let _ = line.push_str(SENTINEL_LINE);
            return line;
        };

        let written = write!(
            line,
            "{t:.2}{d}{h:.2}{d}{}{d}{}",
            self.water.as_str(),
            self.lock.as_str(),
            d = DELIMITER
        );
        if written.is_err() {
            // Only reachable with absurd magnitudes the sensor adapter
            // filters out; still never send a truncated line.
            line.clear();
            let _ = line.push_str(SENTINEL_LINE);
        }
        line
    }
}
