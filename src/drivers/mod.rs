//! Device drivers, hardware initialisation, and peripheral helpers.
//!
//! Bus drivers (`mfrc522`, `lcd`, `ds3231`) are generic over the
//! `embedded-hal` 1.0 traits; `servo` and `watchdog` go through raw
//! ESP-IDF calls set up by `hw_init`.

pub mod ds3231;
pub mod hw_init;
pub mod lcd;
pub mod mfrc522;
pub mod servo;
pub mod watchdog;
