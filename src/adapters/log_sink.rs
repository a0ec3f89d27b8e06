//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to the UART0 console in production).
//! Telemetry lines themselves go out through the telemetry port; this
//! sink only records that one was sent.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | startup relock");
            }
            AppEvent::CardRead(id) => {
                info!("CARD  | {}", id);
            }
            AppEvent::AccessGranted(id) => {
                info!("ACCESS | granted {}", id);
            }
            AppEvent::AccessDenied(id) => {
                warn!("ACCESS | denied {}", id);
            }
            AppEvent::LockChanged { from, to } => {
                info!("LOCK  | {} -> {}", from.as_str(), to.as_str());
            }
            AppEvent::Telemetry(t) => {
                debug!(
                    "TELEM | water={} lock={} degraded={}",
                    t.water.as_str(),
                    t.lock.as_str(),
                    t.is_degraded()
                );
            }
            AppEvent::SensorFault => {
                warn!("FAULT | climate sensor");
            }
        }
    }
}
