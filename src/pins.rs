//! GPIO / peripheral pin assignments for the LockBox main board.
//!
//! Single source of truth; every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! `main.rs` takes the typed `esp_idf_hal` pins matching these numbers;
//! the raw numbers are used by the sys-level LEDC/ADC helpers in `hw_init`.

// ---------------------------------------------------------------------------
// Latch servo (SG90-class hobby servo)
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the latch servo signal line.
pub const SERVO_PWM_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// RFID reader (MFRC522 on SPI2)
// ---------------------------------------------------------------------------

pub const RFID_SCK_GPIO: i32 = 12;
pub const RFID_MOSI_GPIO: i32 = 11;
pub const RFID_MISO_GPIO: i32 = 13;
/// Chip select, active LOW.
pub const RFID_CS_GPIO: i32 = 10;
/// MFRC522 NRSTPD: held HIGH for normal operation.
pub const RFID_RST_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open-drain, external 10 kOhm pull-up).
pub const DHT_DATA_GPIO: i32 = 4;

/// Resistive leak probe: analog voltage via divider.
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const LEAK_ADC_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// I²C buses
// ---------------------------------------------------------------------------

/// I2C0: HD44780 LCD behind a PCF8574 backpack.
pub const LCD_SDA_GPIO: i32 = 14;
pub const LCD_SCL_GPIO: i32 = 15;

/// I2C1: DS3231 battery-backed RTC.
pub const RTC_SDA_GPIO: i32 = 16;
pub const RTC_SCL_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution for the servo channel (bits).
/// 14 bits at 50 Hz gives ~1.2 µs per step.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
