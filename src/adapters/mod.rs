//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements           | Connects to               |
//! |----------------|----------------------|---------------------------|
//! | `hardware`     | all hardware ports   | the adapters below        |
//! | `rfid`         | CredentialReaderPort | MFRC522 over SPI          |
//! | `lcd_display`  | DisplayPort          | HD44780 via PCF8574 (I²C) |
//! | `rtc`          | WallClockPort        | DS3231 (I²C)              |
//! | `serial`       | TelemetryPort        | UART0 console (stdout)    |
//! | `log_sink`     | EventSink            | Serial log output         |
//! | `time`         | MonotonicClock       | ESP32 system timer        |
//!
//! The environment and latch ports are implemented directly by
//! [`SensorHub`](crate::sensors::SensorHub) and
//! [`ServoDriver`](crate::drivers::servo::ServoDriver).

pub mod hardware;
pub mod lcd_display;
pub mod log_sink;
pub mod rfid;
pub mod rtc;
pub mod serial;
pub mod time;
