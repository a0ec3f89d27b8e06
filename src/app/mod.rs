//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the LockBox: credential
//! decisions, latch sequencing through the FSM, and the telemetry and
//! display schedule.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
