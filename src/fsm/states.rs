//! Concrete state handler functions and table builder.
//!
//! ```text
//!             [card ok]                 [settle]
//!  LOCKED ───────────────▶ UNLOCKING ───────────▶ OPEN
//!   ▲  │                                            │
//!   │  │ [card rejected]                      [hold elapsed]
//!   │  ▼                                            ▼
//!   │ DENIED ──[dwell]──▶ LOCKED ◀──[settle]── RELOCKING
//! ```
//!
//! The lock state flips to OPEN on entering Unlocking and back to LOCKED
//! on entering Relocking.  Nothing but the Open hold timer leads out of
//! an unlock session.

use super::context::{FsmContext, LockState, Screen, ServoCommand};
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Locked
        StateDescriptor {
            id: StateId::Locked,
            name: "Locked",
            on_enter: Some(locked_enter),
            on_exit: None,
            on_update: locked_update,
        },
        // Index 1: Unlocking
        StateDescriptor {
            id: StateId::Unlocking,
            name: "Unlocking",
            on_enter: Some(unlocking_enter),
            on_exit: None,
            on_update: unlocking_update,
        },
        // Index 2: Open
        StateDescriptor {
            id: StateId::Open,
            name: "Open",
            on_enter: Some(open_enter),
            on_exit: Some(open_exit),
            on_update: open_update,
        },
        // Index 3: Relocking
        StateDescriptor {
            id: StateId::Relocking,
            name: "Relocking",
            on_enter: Some(relocking_enter),
            on_exit: None,
            on_update: relocking_update,
        },
        // Index 4: Denied
        StateDescriptor {
            id: StateId::Denied,
            name: "Denied",
            on_enter: Some(denied_enter),
            on_exit: Some(denied_exit),
            on_update: denied_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOCKED: idle, servo limp, card polling enabled (by the service)
// ═══════════════════════════════════════════════════════════════════════════

fn locked_enter(ctx: &mut FsmContext) {
    // No holding torque: the latch geometry keeps the box shut.
    ctx.commands.servo = ServoCommand::Released;
}

fn locked_update(_ctx: &mut FsmContext) -> Option<StateId> {
    // Leaves only via AppService::check_credential.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNLOCKING: servo moving to the open angle
// ═══════════════════════════════════════════════════════════════════════════

fn unlocking_enter(ctx: &mut FsmContext) {
    ctx.lock_state = LockState::Open;
    ctx.commands.servo = ServoCommand::Drive(ctx.config.servo_open_deg);
    info!("Unlocking: servo -> {} deg", ctx.config.servo_open_deg);
}

fn unlocking_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.ms_in_state() >= u64::from(ctx.config.servo_settle_ms) {
        return Some(StateId::Open);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPEN: held open, relocks unconditionally after the hold time
// ═══════════════════════════════════════════════════════════════════════════

fn open_enter(ctx: &mut FsmContext) {
    ctx.commands.servo = ServoCommand::Released;
    ctx.commands.screen = Screen::AccessGranted;
    info!("Box open for {} ms", ctx.config.open_hold_ms);
}

fn open_exit(ctx: &mut FsmContext) {
    ctx.commands.screen = Screen::Status;
}

fn open_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.ms_in_state() >= u64::from(ctx.config.open_hold_ms) {
        return Some(StateId::Relocking);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RELOCKING: servo moving to the locked angle
// ═══════════════════════════════════════════════════════════════════════════

fn relocking_enter(ctx: &mut FsmContext) {
    ctx.lock_state = LockState::Locked;
    ctx.commands.servo = ServoCommand::Drive(ctx.config.servo_locked_deg);
    info!("Box locked");
}

fn relocking_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.ms_in_state() >= u64::from(ctx.config.servo_settle_ms) {
        return Some(StateId::Locked);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DENIED: rejection message dwell
// ═══════════════════════════════════════════════════════════════════════════

fn denied_enter(ctx: &mut FsmContext) {
    ctx.commands.screen = Screen::AccessDenied;
}

fn denied_exit(ctx: &mut FsmContext) {
    ctx.commands.screen = Screen::Cleared;
}

fn denied_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.ms_in_state() >= u64::from(ctx.config.deny_dwell_ms) {
        return Some(StateId::Locked);
    }
    None
}
