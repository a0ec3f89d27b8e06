//! Error types for the LockBox firmware.
//!
//! Every driver has its own small `Copy` error enum.  None of these ever
//! stop the control loop: adapters turn them into "no reading" / "no
//! card" values and log them.  The top-level [`Error`] only covers
//! bring-up, where a failure does abort startup.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor did not answer within its protocol window.
    Timeout,
    /// Frame received but the checksum byte does not match.
    Checksum,
    /// Reading decoded but is outside the physically plausible range.
    OutOfRange,
    /// GPIO access failed.
    Gpio,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Gpio => write!(f, "GPIO access failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// RFID reader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderError {
    /// SPI transfer failed.
    Bus,
    /// No card answered in the receive window.
    NoCard,
    /// Card answered but the frame was garbled (CRC, parity, BCC, collision).
    Protocol,
    /// The reader chip reported an internal error or buffer overflow.
    Chip,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "SPI bus error"),
            Self::NoCard => write!(f, "no card"),
            Self::Protocol => write!(f, "protocol error"),
            Self::Chip => write!(f, "reader chip error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// I2C write to the backpack failed.
    Bus,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C write failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// RTC errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcError {
    /// I2C transaction failed.
    Bus,
    /// Registers hold a value that is not valid BCD time.
    InvalidTime,
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C read failed"),
            Self::InvalidTime => write!(f, "invalid time registers"),
        }
    }
}

// ---------------------------------------------------------------------------
// Credential parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    /// A token was not exactly two hex digits.
    BadHexPair,
    /// Byte count is not a valid ISO 14443A UID size (4, 7 or 10).
    BadLength,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadHexPair => write!(f, "expected two hex digits per byte"),
            Self::BadLength => write!(f, "UID must be 4, 7 or 10 bytes"),
        }
    }
}
