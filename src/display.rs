//! Screen rendering for the 16x2 status display.
//!
//! Pure text layout; the LCD driver maps the characters to its ROM.
//!
//! ```text
//! ┌────────────────┐
//! │T:23°C     14:05│   temperature (truncated) + wall time
//! │Status: SECURE  │   leak alert > OPEN/SECURE
//! └────────────────┘
//! ```

use core::fmt::Write;

use heapless::String;

use crate::app::ports::WallTime;
use crate::fsm::context::{EnvironmentReading, LockState};
use crate::telemetry::WaterStatus;

/// Character columns per line.
pub const LCD_COLS: usize = 16;

/// One display line.  Byte capacity is above [`LCD_COLS`] because the
/// degree sign is two bytes in UTF-8 but one glyph on the LCD.
pub type LcdLine = String<32>;

pub const LEAK_ALERT: &str = "!! LEAK ALERT !!";
pub const STATUS_OPEN: &str = "Status: OPEN";
pub const STATUS_SECURE: &str = "Status: SECURE";
pub const TEMP_ERROR: &str = "T:ERR";
pub const TIME_UNKNOWN: &str = "--:--";

/// A full two-line screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub line1: LcdLine,
    pub line2: LcdLine,
}

impl Frame {
    fn from_strs(line1: &str, line2: &str) -> Self {
        let mut frame = Self {
            line1: LcdLine::new(),
            line2: LcdLine::new(),
        };
        let _ = frame.line1.push_str(line1);
        let _ = frame.line2.push_str(line2);
        frame
    }

    /// Replace line 2 with the leak alert.  A leak outranks every other
    /// line-2 content, feedback screens included.
    pub fn with_leak_alert(mut self) -> Self {
        self.line2.clear();
        let _ = self.line2.push_str(LEAK_ALERT);
        self
    }
}

/// Periodic status screen.
pub fn status_frame(
    reading: &EnvironmentReading,
    lock: LockState,
    time: Option<WallTime>,
    leak_threshold: u16,
) -> Frame {
    let mut left: String<16> = String::new();
    match reading.temperature_c {
        // `as` truncates toward zero, which is the intended rounding.
        Some(t) => {
            let _ = write!(left, "T:{}\u{00b0}C", t as i32);
        }
        None => {
            let _ = left.push_str(TEMP_ERROR);
        }
    }

    let mut right: String<5> = String::new();
    match time {
        Some(WallTime { hour, minute }) => {
            let _ = write!(right, "{hour:02}:{minute:02}");
        }
        None => {
            let _ = right.push_str(TIME_UNKNOWN);
        }
    }

    let mut line1 = LcdLine::new();
    let _ = line1.push_str(&left);
    let used = left.chars().count() + right.chars().count();
    for _ in used..LCD_COLS {
        let _ = line1.push(' ');
    }
    let _ = line1.push_str(&right);

    let status = if WaterStatus::from_raw(reading.leak_raw, leak_threshold) == WaterStatus::Leak {
        LEAK_ALERT
    } else {
        match lock {
            LockState::Open => STATUS_OPEN,
            LockState::Locked => STATUS_SECURE,
        }
    };

    let mut line2 = LcdLine::new();
    let _ = line2.push_str(status);
    Frame { line1, line2 }
}

/// Shown while the box is held open after a granted card.
pub fn granted_frame() -> Frame {
    Frame::from_strs("Access Granted", "Box Open")
}

/// Shown for the denial dwell.
pub fn denied_frame() -> Frame {
    Frame::from_strs("Access Denied", "")
}

/// Shown once at power-up.
pub fn boot_frame() -> Frame {
    Frame::from_strs("LockBox", "Starting...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(t: Option<f32>, leak: u16) -> EnvironmentReading {
        EnvironmentReading {
            temperature_c: t,
            humidity_pct: Some(50.0),
            leak_raw: leak,
        }
    }

    const MORNING: Option<WallTime> = Some(WallTime { hour: 9, minute: 5 });

    #[test]
    fn line1_truncates_temperature_and_pads_time() {
        let f = status_frame(&reading(Some(23.9), 0), LockState::Locked, MORNING, 300);
        assert_eq!(f.line1.as_str(), "T:23\u{00b0}C     09:05");
        assert_eq!(f.line1.chars().count(), LCD_COLS);
    }

    #[test]
    fn negative_temperature_truncates_toward_zero() {
        let f = status_frame(&reading(Some(-3.7), 0), LockState::Locked, MORNING, 300);
        assert!(f.line1.starts_with("T:-3\u{00b0}C"));
    }

    #[test]
    fn missing_temperature_shows_error_marker() {
        let f = status_frame(&reading(None, 0), LockState::Locked, MORNING, 300);
        assert!(f.line1.starts_with(TEMP_ERROR));
        assert!(f.line1.ends_with("09:05"));
        assert_eq!(f.line1.chars().count(), LCD_COLS);
    }

    #[test]
    fn unreadable_clock_shows_placeholder() {
        let f = status_frame(&reading(Some(20.0), 0), LockState::Locked, None, 300);
        assert!(f.line1.ends_with(TIME_UNKNOWN));
    }

    #[test]
    fn line2_reflects_lock_state_when_dry() {
        let locked = status_frame(&reading(Some(20.0), 300), LockState::Locked, MORNING, 300);
        assert_eq!(locked.line2.as_str(), STATUS_SECURE);
        let open = status_frame(&reading(Some(20.0), 300), LockState::Open, MORNING, 300);
        assert_eq!(open.line2.as_str(), STATUS_OPEN);
    }

    #[test]
    fn leak_alert_overrides_lock_state() {
        for lock in [LockState::Locked, LockState::Open] {
            let f = status_frame(&reading(Some(20.0), 301), lock, MORNING, 300);
            assert_eq!(f.line2.as_str(), LEAK_ALERT);
        }
    }

    #[test]
    fn fixed_screens_fit_the_display() {
        for f in [granted_frame(), denied_frame(), boot_frame()] {
            assert!(f.line1.chars().count() <= LCD_COLS);
            assert!(f.line2.chars().count() <= LCD_COLS);
        }
        assert_eq!(LEAK_ALERT.len(), LCD_COLS);
    }

    #[test]
    fn leak_alert_overlays_feedback_screen() {
        let f = granted_frame().with_leak_alert();
        assert_eq!(f.line1.as_str(), "Access Granted");
        assert_eq!(f.line2.as_str(), LEAK_ALERT);
    }
}
