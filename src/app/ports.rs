//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (card reader, sensors, latch servo, display, serial,
//! clocks) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the control loop never touches hardware
//! directly and runs unchanged against mocks on the host.
//!
//! None of the ports return errors: every fault the hardware can produce
//! maps to a value the control loop already handles (no card, no
//! reading, no wall time).  Adapters log the underlying driver error.

use crate::credential::CredentialId;
use crate::fsm::context::EnvironmentReading;

// ───────────────────────────────────────────────────────────────
// Credential reader port (driven adapter: RFID → domain)
// ───────────────────────────────────────────────────────────────

pub trait CredentialReaderPort {
    /// Non-blocking poll.  Returns a UID only when a new card is present
    /// and was fully read in this call; the card is halted afterwards so
    /// it is not reported again while it stays in the field.
    fn try_read(&mut self) -> Option<CredentialId>;
}

// ───────────────────────────────────────────────────────────────
// Environment port (driven adapter: sensors → domain)
// ───────────────────────────────────────────────────────────────

pub trait EnvironmentPort {
    /// Take a fresh reading.  Faulted climate fields come back as `None`.
    fn read(&mut self) -> EnvironmentReading;
}

// ───────────────────────────────────────────────────────────────
// Latch actuator port (driven adapter: domain → servo)
// ───────────────────────────────────────────────────────────────

/// Open-loop servo control.  There is no position feedback.
pub trait LatchActuatorPort {
    /// Start driving the servo towards `angle_deg`.
    fn drive_to(&mut self, angle_deg: u8);

    /// Stop driving the servo (no holding torque, no jitter).
    fn release(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → LCD)
// ───────────────────────────────────────────────────────────────

/// Two-line character display.
pub trait DisplayPort {
    /// Replace both lines.  Lines shorter than the display are padded.
    fn show(&mut self, line1: &str, line2: &str);

    /// Blank the display.
    fn clear(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → serial link)
// ───────────────────────────────────────────────────────────────

pub trait TelemetryPort {
    /// Transmit one telemetry line; the adapter appends the terminator.
    fn send_line(&mut self, line: &str);
}

// ───────────────────────────────────────────────────────────────
// Clock ports
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond time for scheduling.
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time of day, display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
}

/// Battery-backed real-time clock.
pub trait WallClockPort {
    /// Current time of day, or `None` if the clock cannot be read.
    fn wall_time(&mut self) -> Option<WallTime>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
