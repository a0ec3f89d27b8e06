//! System configuration parameters
//!
//! All tunable parameters for the LockBox.  There is no runtime
//! configuration channel: [`SystemConfig::default()`] carries the
//! compile-time constants the firmware is built with.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::credential::{AuthorizedSet, CredentialId, MAX_AUTHORIZED, MAX_CANONICAL_LEN};

/// Card UID allowed to open the box in the default build.
pub const DEFAULT_AUTHORIZED_UID: &str = "0F B8 E2 29";

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Latch servo ---
    /// Servo angle (degrees) for the locked position
    pub servo_locked_deg: u8,
    /// Servo angle (degrees) for the open position
    pub servo_open_deg: u8,
    /// Time the servo is driven after a position command before the
    /// signal is released (milliseconds)
    pub servo_settle_ms: u32,

    // --- Access ---
    /// How long the box stays open after a granted card (milliseconds)
    pub open_hold_ms: u32,
    /// How long "Access Denied" stays on screen (milliseconds)
    pub deny_dwell_ms: u32,
    /// Card UIDs in canonical text form
    pub authorized_uids: Vec<String<MAX_CANONICAL_LEN>, MAX_AUTHORIZED>,

    // --- Environment ---
    /// Raw ADC value above which the leak probe reports LEAK
    pub leak_threshold_raw: u16,

    // --- Timing ---
    /// Telemetry + display refresh interval (milliseconds)
    pub telemetry_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut authorized_uids = Vec::new();
        let mut uid = String::new();
        let _ = uid.push_str(DEFAULT_AUTHORIZED_UID);
        let _ = authorized_uids.push(uid);

        Self {
            // Latch servo
            servo_locked_deg: 0,
            servo_open_deg: 90,
            servo_settle_ms: 500,

            // Access
            open_hold_ms: 5_000,
            deny_dwell_ms: 2_000,
            authorized_uids,

            // Environment
            leak_threshold_raw: 300,

            // Timing
            telemetry_interval_ms: 2_000,
        }
    }
}

impl SystemConfig {
    /// Minimum servo settle time; shorter commands may not finish moving.
    pub const MIN_SETTLE_MS: u32 = 500;

    /// Check value ranges and that every UID parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servo_locked_deg > 180 || self.servo_open_deg > 180 {
            return Err(ConfigError::ValidationFailed("servo angle above 180 degrees"));
        }
        if self.servo_locked_deg == self.servo_open_deg {
            return Err(ConfigError::ValidationFailed("locked and open angles are equal"));
        }
        if self.servo_settle_ms < Self::MIN_SETTLE_MS {
            return Err(ConfigError::ValidationFailed("servo_settle_ms below 500"));
        }
        if self.telemetry_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("telemetry_interval_ms is zero"));
        }
        if self.authorized_uids.is_empty() {
            return Err(ConfigError::ValidationFailed("no authorized UIDs"));
        }
        for uid in &self.authorized_uids {
            uid.parse::<CredentialId>()
                .map_err(|_| ConfigError::ValidationFailed("unparsable authorized UID"))?;
        }
        Ok(())
    }

    /// Build the authorized set from [`authorized_uids`](Self::authorized_uids).
    pub fn authorized_set(&self) -> Result<AuthorizedSet, ConfigError> {
        let mut set = AuthorizedSet::new();
        for uid in &self.authorized_uids {
            let id = uid
                .parse::<CredentialId>()
                .map_err(|_| ConfigError::ValidationFailed("unparsable authorized UID"))?;
            set.insert(id)
                .map_err(|_| ConfigError::ValidationFailed("too many authorized UIDs"))?;
        }
        if set.is_empty() {
            return Err(ConfigError::ValidationFailed("no authorized UIDs"));
        }
        Ok(set)
    }
}
