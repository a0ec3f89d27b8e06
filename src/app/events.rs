//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  On the device they become
//! the human-readable diagnostic lines on the serial console.

use crate::credential::CredentialId;
use crate::fsm::context::LockState;
use crate::telemetry::TelemetryFrame;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control loop has started; the startup relock is under way.
    Started,

    /// A card was read (before the authorization decision).
    CardRead(CredentialId),

    /// The card was authorized; an unlock session started.
    AccessGranted(CredentialId),

    /// The card was rejected.
    AccessDenied(CredentialId),

    /// The authoritative lock state changed.
    LockChanged { from: LockState, to: LockState },

    /// A telemetry line was transmitted.
    Telemetry(TelemetryFrame),

    /// The climate sensor faulted on this tick.
    SensorFault,
}
