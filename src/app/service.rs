//! Application service: the control loop.
//!
//! [`AppService`] owns the latch FSM, its context, the authorized set and
//! the telemetry schedule.  One call to [`AppService::iterate`] is one pass
//! of the firmware main loop:
//!
//! ```text
//!  ┌─────────────┐   ┌──────────────────┐   ┌───────────────────────┐
//!  │ FSM step    │──▶│ card poll        │──▶│ telemetry tick (2 s)  │
//!  │ (timers)    │   │ (Locked only)    │   │ send line + repaint   │
//!  └─────────────┘   └──────────────────┘   └───────────────────────┘
//! ```
//!
//! All I/O flows through the port traits bundled in [`BoxHardware`].
//! Nothing here sleeps: every duration is a timestamp comparison in the
//! FSM, so telemetry keeps flowing while the box is open.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::credential::{AuthorizedSet, CredentialId};
use crate::display::{self, Frame};
use crate::fsm::context::{
    EnvironmentReading, FsmContext, LatchCommands, LockState, Screen, ServoCommand,
};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::telemetry::{TelemetryFrame, WaterStatus};

use super::events::AppEvent;
use super::ports::{
    ConfigError, CredentialReaderPort, DisplayPort, EnvironmentPort, EventSink,
    LatchActuatorPort, MonotonicClock, TelemetryPort, WallClockPort,
};

/// Every port the control loop talks to, as one bound.
pub trait BoxHardware:
    CredentialReaderPort + EnvironmentPort + LatchActuatorPort + DisplayPort + TelemetryPort + WallClockPort
{
}

impl<T> BoxHardware for T where
    T: CredentialReaderPort
        + EnvironmentPort
        + LatchActuatorPort
        + DisplayPort
        + TelemetryPort
        + WallClockPort
{
}

/// Outcome of presenting a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Authorized; an unlock session started.
    Granted,
    /// Not authorized; denial shown, lock state untouched.
    Denied,
    /// A session or denial dwell is already running; the card was ignored.
    Ignored,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    authorized: AuthorizedSet,
    last_telemetry_ms: u64,
    /// Commands last pushed to the hardware; `None` before the first apply.
    applied: Option<LatchCommands>,
    /// Reading from the last telemetry tick, reused by repaints between
    /// ticks (the DHT22 needs 2 s between conversions).
    last_reading: Option<EnvironmentReading>,
}

impl AppService {
    /// Construct the service with an explicit authorized set.
    ///
    /// Does **not** touch hardware: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, authorized: AuthorizedSet) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Relocking);
        Self {
            fsm,
            ctx,
            authorized,
            last_telemetry_ms: 0,
            applied: None,
            last_reading: None,
        }
    }

    /// Validate `config` and build the authorized set from it.
    pub fn from_config(config: SystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let authorized = config.authorized_set()?;
        Ok(Self::new(config, authorized))
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Show the boot screen and run the startup relock.  The telemetry
    /// schedule starts counting from `now_ms`.
    pub fn start(&mut self, now_ms: u64, hw: &mut impl BoxHardware, sink: &mut impl EventSink) {
        let boot = display::boot_frame();
        hw.show(&boot.line1, &boot.line2);

        self.fsm.start(&mut self.ctx, now_ms);
        self.apply_outputs(hw, true, false);
        self.last_telemetry_ms = now_ms;

        sink.emit(&AppEvent::Started);
        info!(
            "System ready: {} authorized credential(s), telemetry every {} ms",
            self.authorized.len(),
            self.ctx.config.telemetry_interval_ms
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One pass of the main loop at `now_ms`.
    pub fn iterate(&mut self, now_ms: u64, hw: &mut impl BoxHardware, sink: &mut impl EventSink) {
        // 1. Timed latch transitions
        let prev_lock = self.ctx.lock_state;
        let entered = self.fsm.step(&mut self.ctx, now_ms);
        self.after_fsm(prev_lock, entered, hw, sink);

        // 2. Card poll: only while idle-locked
        if self.fsm.current_state() == StateId::Locked {
            if let Some(id) = hw.try_read() {
                self.check_credential(id, now_ms, hw, sink);
            }
        }

        // 3. Telemetry + display refresh
        if now_ms.saturating_sub(self.last_telemetry_ms)
            >= u64::from(self.ctx.config.telemetry_interval_ms)
        {
            self.report(now_ms, hw, sink);
        }
    }

    /// [`iterate`](Self::iterate) at the clock's current time.
    pub fn iterate_with(
        &mut self,
        clock: &impl MonotonicClock,
        hw: &mut impl BoxHardware,
        sink: &mut impl EventSink,
    ) {
        self.iterate(clock.now_ms(), hw, sink);
    }

    // ── Commands ──────────────────────────────────────────────

    /// Decide on a presented credential.
    ///
    /// Only honoured while the latch is idle-locked; a card presented
    /// during an unlock session or a denial dwell is ignored, so nothing
    /// can extend or cut short a running session.
    pub fn check_credential(
        &mut self,
        id: CredentialId,
        now_ms: u64,
        hw: &mut impl BoxHardware,
        sink: &mut impl EventSink,
    ) -> AccessDecision {
        info!("Card UID: {}", id);
        sink.emit(&AppEvent::CardRead(id.clone()));

        if self.fsm.current_state() != StateId::Locked {
            info!("Card ignored: latch busy ({:?})", self.fsm.current_state());
            return AccessDecision::Ignored;
        }

        let prev_lock = self.ctx.lock_state;
        let decision = if self.authorized.contains(&id) {
            info!("Access granted");
            self.fsm.force_transition(StateId::Unlocking, &mut self.ctx, now_ms);
            sink.emit(&AppEvent::AccessGranted(id));
            AccessDecision::Granted
        } else {
            warn!("Access denied");
            self.fsm.force_transition(StateId::Denied, &mut self.ctx, now_ms);
            sink.emit(&AppEvent::AccessDenied(id));
            AccessDecision::Denied
        };
        self.after_fsm(prev_lock, true, hw, sink);
        decision
    }

    /// Drive the latch to the locked position.
    ///
    /// Idempotent while LOCKED (the servo is re-driven and released
    /// again).  Refused during an unlock session or denial dwell: the
    /// session relocks itself after its hold time.  Returns whether the
    /// request was carried out.
    pub fn lock(&mut self, now_ms: u64, hw: &mut impl BoxHardware, sink: &mut impl EventSink) -> bool {
        match self.fsm.current_state() {
            StateId::Locked | StateId::Relocking => {
                let prev_lock = self.ctx.lock_state;
                self.fsm.force_transition(StateId::Relocking, &mut self.ctx, now_ms);
                self.after_fsm(prev_lock, true, hw, sink);
                true
            }
            busy => {
                warn!("Lock request ignored during {:?}", busy);
                false
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Authoritative lock state.
    pub fn lock_state(&self) -> LockState {
        self.ctx.lock_state
    }

    /// Current latch FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Monotonic time of the last telemetry emission.
    pub fn last_telemetry_ms(&self) -> u64 {
        self.last_telemetry_ms
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Read sensors, transmit telemetry, repaint the display.
    fn report(&mut self, now_ms: u64, hw: &mut impl BoxHardware, sink: &mut impl EventSink) {
        let reading = hw.read();
        let frame = TelemetryFrame::new(&reading, self.ctx.lock_state, self.ctx.config.leak_threshold_raw);

        if frame.is_degraded() {
            warn!("Climate sensor fault, sending sentinel line");
            sink.emit(&AppEvent::SensorFault);
        }
        hw.send_line(&frame.encode());
        sink.emit(&AppEvent::Telemetry(frame));

        self.last_reading = Some(reading);
        let screen = self.screen_frame(&reading, hw);
        show(hw, &screen);

        self.last_telemetry_ms = now_ms;
    }

    /// Repaint the current screen outside a telemetry tick.
    fn repaint(&self, hw: &mut impl BoxHardware) {
        let reading = match self.last_reading {
            Some(reading) => reading,
            None => hw.read(),
        };
        let screen = self.screen_frame(&reading, hw);
        show(hw, &screen);
    }

    /// Frame for the commanded screen; a leak takes over line 2 whichever
    /// screen is up.
    fn screen_frame(&self, reading: &EnvironmentReading, hw: &mut impl BoxHardware) -> Frame {
        let threshold = self.ctx.config.leak_threshold_raw;
        let frame = match self.ctx.commands.screen {
            Screen::AccessGranted => display::granted_frame(),
            Screen::AccessDenied => display::denied_frame(),
            Screen::Status | Screen::Cleared => {
                display::status_frame(reading, self.ctx.lock_state, hw.wall_time(), threshold)
            }
        };
        if WaterStatus::from_raw(reading.leak_raw, threshold) == WaterStatus::Leak {
            frame.with_leak_alert()
        } else {
            frame
        }
    }

    /// Push changed commands to the hardware and report lock changes.
    fn after_fsm(
        &mut self,
        prev_lock: LockState,
        entered: bool,
        hw: &mut impl BoxHardware,
        sink: &mut impl EventSink,
    ) {
        let lock = self.ctx.lock_state;
        self.apply_outputs(hw, entered, lock != prev_lock);
        if lock != prev_lock {
            sink.emit(&AppEvent::LockChanged { from: prev_lock, to: lock });
        }
    }

    /// Translate FSM latch commands into port calls.  A state entry
    /// re-issues its drive command even when it equals the last one.
    /// The display is repainted whenever the commanded screen changes, and
    /// the status screen also whenever the lock state flips.
    fn apply_outputs(&mut self, hw: &mut impl BoxHardware, entered: bool, lock_changed: bool) {
        let cmds = self.ctx.commands;
        let prev = self.applied;
        self.applied = Some(cmds);

        let redrive = entered && matches!(cmds.servo, ServoCommand::Drive(_));
        if prev.map(|p| p.servo) != Some(cmds.servo) || redrive {
            match cmds.servo {
                ServoCommand::Drive(angle) => hw.drive_to(angle),
                ServoCommand::Released => hw.release(),
            }
        }

        // The boot screen stays up until the first telemetry tick.
        let Some(prev) = prev else { return };

        let screen_changed = prev.screen != cmds.screen;
        if screen_changed && cmds.screen == Screen::Cleared {
            hw.clear();
        }
        let shows_status = matches!(cmds.screen, Screen::Status | Screen::Cleared);
        if screen_changed || (lock_changed && shows_status) {
            self.repaint(hw);
        }
    }
}

fn show(hw: &mut impl DisplayPort, frame: &Frame) {
    hw.show(&frame.line1, &frame.line2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_rejects_invalid() {
        let cfg = SystemConfig {
            telemetry_interval_ms: 0,
            ..Default::default()
        };
        assert!(AppService::from_config(cfg).is_err());
    }

    #[test]
    fn new_service_is_locked_before_start() {
        let app = AppService::from_config(SystemConfig::default()).unwrap();
        assert_eq!(app.lock_state(), LockState::Locked);
        assert_eq!(app.state(), StateId::Relocking);
    }
}
