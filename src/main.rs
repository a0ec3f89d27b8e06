//! LockBox Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RfidReader     SensorHub      ServoDriver     LcdDisplay      │
//! │  (CardReader)   (Environment)  (LatchActuator) (Display)       │
//! │  SerialTelemetry  RtcClock     LogEventSink    Esp32Time       │
//! │  (Telemetry)      (WallClock)  (EventSink)     (Monotonic)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Latch FSM · AuthorizedSet · Telemetry schedule        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_svc::hal::units::FromValueType;
use log::{info, warn};

use lockbox::adapters::hardware::HardwareAdapter;
use lockbox::adapters::lcd_display::LcdDisplay;
use lockbox::adapters::log_sink::LogEventSink;
use lockbox::adapters::rfid::RfidReader;
use lockbox::adapters::rtc::RtcClock;
use lockbox::adapters::serial::SerialTelemetry;
use lockbox::adapters::time::Esp32TimeAdapter;
use lockbox::app::ports::MonotonicClock;
use lockbox::app::service::AppService;
use lockbox::config::SystemConfig;
use lockbox::drivers::ds3231::Ds3231;
use lockbox::drivers::lcd::{self, Lcd};
use lockbox::drivers::mfrc522::Mfrc522;
use lockbox::drivers::servo::ServoDriver;
use lockbox::drivers::{hw_init, watchdog::Watchdog};
use lockbox::error::Error;
use lockbox::pins;
use lockbox::sensors::SensorHub;
use lockbox::sensors::dht22::Dht22;
use lockbox::sensors::leak::LeakSensor;

/// Pause between loop iterations.  Short enough that a card tap is
/// picked up immediately, long enough to let the idle task run.
const LOOP_PERIOD_MS: u32 = 10;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LockBox v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    info!("Config: {}", serde_json::to_string(&config)?);
    let mut app = AppService::from_config(config).map_err(Error::from)?;

    // ── 3. Raw peripherals (servo LEDC, leak ADC) ─────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    let watchdog = Watchdog::default();

    // ── 4. Bus peripherals ────────────────────────────────────
    let p = Peripherals::take()?;

    // SAFETY: each GPIO number comes from `pins` and is claimed exactly once.
    let (sck, mosi, miso, cs, rst, dht_io, lcd_sda, lcd_scl, rtc_sda, rtc_scl) = unsafe {
        (
            AnyIOPin::new(pins::RFID_SCK_GPIO),
            AnyIOPin::new(pins::RFID_MOSI_GPIO),
            AnyIOPin::new(pins::RFID_MISO_GPIO),
            AnyIOPin::new(pins::RFID_CS_GPIO),
            AnyOutputPin::new(pins::RFID_RST_GPIO),
            AnyIOPin::new(pins::DHT_DATA_GPIO),
            AnyIOPin::new(pins::LCD_SDA_GPIO),
            AnyIOPin::new(pins::LCD_SCL_GPIO),
            AnyIOPin::new(pins::RTC_SDA_GPIO),
            AnyIOPin::new(pins::RTC_SCL_GPIO),
        )
    };

    // RFID reader on SPI2
    let spi_bus = SpiDriver::new(p.spi2, sck, mosi, Some(miso), &SpiDriverConfig::new())?;
    let spi = SpiDeviceDriver::new(spi_bus, Some(cs), &SpiConfig::new().baudrate(4.MHz().into()))?;
    let mut chip = Mfrc522::new(spi, PinDriver::output(rst)?);
    if let Err(e) = chip.init(&mut Ets) {
        // Keep running: telemetry and the display still work, polls
        // simply never see a card.
        warn!("RFID init failed: {}, card access unavailable", e);
    }

    // DHT22 + leak probe
    let mut dht_pin = PinDriver::input_output_od(dht_io)?;
    dht_pin.set_pull(Pull::Up)?;
    let sensors = SensorHub::new(Dht22::new(dht_pin, Ets), LeakSensor::new(pins::LEAK_ADC_GPIO));

    // LCD on I2C0
    let i2c_cfg = I2cConfig::new().baudrate(100.kHz().into());
    let lcd_bus = I2cDriver::new(p.i2c0, lcd_sda, lcd_scl, &i2c_cfg)?;
    let mut lcd = Lcd::new(lcd_bus, Ets, lcd::DEFAULT_ADDRESS);
    if let Err(e) = lcd.init() {
        warn!("LCD init failed: {}", e);
    }

    // RTC on I2C1
    let rtc_bus = I2cDriver::new(p.i2c1, rtc_sda, rtc_scl, &i2c_cfg)?;

    let mut hw = HardwareAdapter::new(
        RfidReader::new(chip),
        sensors,
        ServoDriver::new(),
        LcdDisplay::new(lcd),
        SerialTelemetry::new(std::io::stdout()),
        RtcClock::new(Ds3231::new(rtc_bus)),
    );

    // ── 5. Control loop ───────────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();

    app.start(clock.now_ms(), &mut hw, &mut sink);

    loop {
        app.iterate_with(&clock, &mut hw, &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
