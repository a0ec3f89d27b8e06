//! Mock hardware adapter for integration tests.
//!
//! Records every latch and display call plus every telemetry line so
//! tests can assert on the full output history without touching real
//! SPI/I2C/PWM peripherals.

use std::collections::VecDeque;

use lockbox::app::events::AppEvent;
use lockbox::app::ports::{
    CredentialReaderPort, DisplayPort, EnvironmentPort, EventSink, LatchActuatorPort,
    MonotonicClock, TelemetryPort, WallClockPort, WallTime,
};
use lockbox::credential::CredentialId;
use lockbox::fsm::context::{EnvironmentReading, LockState};

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    DriveTo(u8),
    Release,
    Show(String, String),
    Clear,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub lines: Vec<String>,
    pub cards: VecDeque<CredentialId>,
    pub reading: EnvironmentReading,
    pub time: Option<WallTime>,
    pub polls: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            lines: Vec::new(),
            cards: VecDeque::new(),
            reading: EnvironmentReading {
                temperature_c: Some(22.5),
                humidity_pct: Some(41.0),
                leak_raw: 120,
            },
            time: Some(WallTime { hour: 14, minute: 5 }),
            polls: 0,
        }
    }

    /// Queue a card for the next poll.
    pub fn tap(&mut self, uid: &str) {
        self.cards.push_back(uid.parse().expect("test UID"));
    }

    pub fn servo_calls(&self) -> Vec<HwCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::DriveTo(_) | HwCall::Release))
            .cloned()
            .collect()
    }

    /// Screens shown whose first line is `line1`.
    pub fn shows(&self, line1: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::Show(l1, _) if l1 == line1))
            .count()
    }

    pub fn last_show(&self) -> Option<(&str, &str)> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Show(l1, l2) => Some((l1.as_str(), l2.as_str())),
            _ => None,
        })
    }

    pub fn clear_history(&mut self) {
        self.calls.clear();
        self.lines.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialReaderPort for MockHardware {
    fn try_read(&mut self) -> Option<CredentialId> {
        self.polls += 1;
        self.cards.pop_front()
    }
}

impl EnvironmentPort for MockHardware {
    fn read(&mut self) -> EnvironmentReading {
        self.reading
    }
}

impl LatchActuatorPort for MockHardware {
    fn drive_to(&mut self, angle_deg: u8) {
        self.calls.push(HwCall::DriveTo(angle_deg));
    }

    fn release(&mut self) {
        self.calls.push(HwCall::Release);
    }
}

impl DisplayPort for MockHardware {
    fn show(&mut self, line1: &str, line2: &str) {
        self.calls.push(HwCall::Show(line1.to_string(), line2.to_string()));
    }

    fn clear(&mut self) {
        self.calls.push(HwCall::Clear);
    }
}

impl TelemetryPort for MockHardware {
    fn send_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

impl WallClockPort for MockHardware {
    fn wall_time(&mut self) -> Option<WallTime> {
        self.time
    }
}

// ── MockClock ─────────────────────────────────────────────────

#[allow(dead_code)]
pub struct MockClock {
    pub now_ms: u64,
}

impl MonotonicClock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

// ── Recording event sink ──────────────────────────────────────

pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn granted(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::AccessGranted(_)))
            .count()
    }

    pub fn denied(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::AccessDenied(_)))
            .count()
    }

    /// Lock states in order, starting from `initial` and following every
    /// `LockChanged` event.
    pub fn lock_sequence(&self, initial: LockState) -> Vec<LockState> {
        let mut seq = vec![initial];
        for e in &self.events {
            if let AppEvent::LockChanged { to, .. } = e {
                seq.push(*to);
            }
        }
        seq
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
