//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the authoritative lock state, the latch commands the service
//! applies to the actuator and display, timing, and configuration.  It
//! replaces the process-wide flags a bare control loop would use.

use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Lock state
// ---------------------------------------------------------------------------

/// Authoritative state of the compartment latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    Open,
}

impl LockState {
    /// Wire form used in the telemetry line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Open => "OPEN",
        }
    }
}

// ---------------------------------------------------------------------------
// Environment reading (written by the sensor adapter each telemetry tick)
// ---------------------------------------------------------------------------

/// A point-in-time environment reading.  Each climate field is `None`
/// when the sensor faulted on this read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvironmentReading {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    /// Raw leak-probe ADC value (0 – 4095); higher = wetter.
    pub leak_raw: u16,
}

impl EnvironmentReading {
    /// Both climate fields valid.
    pub fn climate_ok(&self) -> bool {
        self.temperature_c.is_some() && self.humidity_pct.is_some()
    }
}

// ---------------------------------------------------------------------------
// Latch commands (written by state handlers; consumed by AppService)
// ---------------------------------------------------------------------------

/// Desired servo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCommand {
    /// No drive signal (servo limp, no holding torque).
    Released,
    /// Drive to the given angle in degrees.
    Drive(u8),
}

/// Which screen the display should show outside the periodic status view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Regular status view, repainted on each telemetry tick.
    Status,
    AccessGranted,
    AccessDenied,
    /// Display blanked; the next refresh paints the status view.
    Cleared,
}

/// Commands that state handlers write to request output changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchCommands {
    pub servo: ServoCommand,
    pub screen: Screen,
}

impl Default for LatchCommands {
    fn default() -> Self {
        Self {
            servo: ServoCommand::Released,
            screen: Screen::Status,
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Monotonic time of the current iteration (milliseconds).
    pub now_ms: u64,
    /// Monotonic time at which the current state was entered.
    pub state_entry_ms: u64,

    // -- Latch --
    /// Authoritative lock state.  Only state handlers write it.
    pub lock_state: LockState,
    /// Output requests applied by the service after each FSM step.
    pub commands: LatchCommands,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context.  The lock state starts LOCKED; the startup
    /// relock drives the servo to match.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            now_ms: 0,
            state_entry_ms: 0,
            lock_state: LockState::Locked,
            commands: LatchCommands::default(),
            config,
        }
    }

    /// Milliseconds elapsed since the current state was entered.
    pub fn ms_in_state(&self) -> u64 {
        self.now_ms.saturating_sub(self.state_entry_ms)
    }
}
