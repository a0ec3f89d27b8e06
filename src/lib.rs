//! LockBox firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod credential;
pub mod display;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod telemetry;

// Hardware-facing layers.  Drivers are generic over embedded-hal; the
// sys-level pieces carry their own cfg-gated simulation stubs.
pub mod adapters;
pub mod drivers;
pub mod sensors;
