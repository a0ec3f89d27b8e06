//! Fuzz target: `TelemetryFrame::encode`
//!
//! Feeds arbitrary sensor values (NaN, infinities, huge magnitudes
//! included) into the encoder and asserts the line is either the
//! sentinel or exactly four fields.
//!
//! cargo fuzz run fuzz_telemetry_encode

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockbox::fsm::context::{EnvironmentReading, LockState};
use lockbox::telemetry::{DELIMITER, SENTINEL_LINE, TelemetryFrame};

fuzz_target!(|data: &[u8]| {
    if data.len() < 11 {
        return;
    }
    let f = |i: usize| f32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
    let reading = EnvironmentReading {
        temperature_c: (data[8] & 1 != 0).then(|| f(0)),
        humidity_pct: (data[8] & 2 != 0).then(|| f(4)),
        leak_raw: u16::from_le_bytes([data[9], data[10]]),
    };
    let lock = if data[8] & 4 != 0 { LockState::Open } else { LockState::Locked };

    let line = TelemetryFrame::new(&reading, lock, 300).encode();
    if line.as_str() != SENTINEL_LINE {
        assert_eq!(line.split(DELIMITER).count(), 4);
    }
});
