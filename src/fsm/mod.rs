//! Function-pointer finite state machine for the latch.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  StateTable                                               │
//! │  ┌───────────┬───────────┬──────────┬──────────────────┐  │
//! │  │ StateId   │ on_enter  │ on_exit  │ on_update        │  │
//! │  ├───────────┼───────────┼──────────┼──────────────────┤  │
//! │  │ Locked    │ fn(ctx)   │ —        │ fn(ctx)->Option  │  │
//! │  │ Unlocking │ fn(ctx)   │ —        │ fn(ctx)->Option  │  │
//! │  │ Open      │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option  │  │
//! │  │ Relocking │ fn(ctx)   │ —        │ fn(ctx)->Option  │  │
//! │  │ Denied    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option  │  │
//! │  └───────────┴───────────┴──────────┴──────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Each loop iteration the engine stamps `ctx.now_ms` and calls
//! `on_update` for the current state.  Timed states compare
//! `ctx.ms_in_state()` against their configured duration, so no handler
//! ever sleeps.  A returned `Some(next)` runs `on_exit` for the current
//! state, records the entry time, then runs `on_enter` for the next.

pub mod context;
pub mod states;

use context::FsmContext;
use log::debug;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all latch states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    /// Latched, servo released, polling for cards.
    Locked = 0,
    /// Servo driving to the open angle.
    Unlocking = 1,
    /// Open and holding; relocks automatically.
    Open = 2,
    /// Servo driving to the locked angle.
    Relocking = 3,
    /// Showing the denial message.
    Denied = 4,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Relocking` in release so the latch ends up
    /// locked.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Locked,
            1 => Self::Unlocking,
            2 => Self::Open,
            3 => Self::Relocking,
            4 => Self::Denied,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Relocking
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-iteration update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state at `now_ms`.
    /// Call once after construction, before the first `step()`.
    pub fn start(&mut self, ctx: &mut FsmContext, now_ms: u64) {
        debug!("FSM starting in state: {}", self.table[self.current].name);
        ctx.now_ms = now_ms;
        ctx.state_entry_ms = now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM to `now_ms`.
    ///
    /// At most one transition per step: the service applies the latch
    /// commands between steps, so every servo move is really driven for
    /// its full settle window even after a late iteration.  Returns
    /// whether a transition happened.
    pub fn step(&mut self, ctx: &mut FsmContext, now_ms: u64) -> bool {
        ctx.now_ms = now_ms;
        match (self.table[self.current].on_update)(ctx) {
            Some(next) => {
                self.transition(next, ctx);
                true
            }
            None => false,
        }
    }

    /// Force an immediate transition regardless of what `on_update` would
    /// return.  Re-entering the current state is allowed and re-runs its
    /// `on_enter` (a relock while relocking restarts the settle window).
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext, now_ms: u64) {
        ctx.now_ms = now_ms;
        self.transition(next, ctx);
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        debug!(
            "FSM transition: {} -> {} at {} ms",
            self.table[self.current].name, self.table[next_idx].name, ctx.now_ms
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        ctx.state_entry_ms = ctx.now_ms;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
