//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured cycle events to the
//! ESP-IDF logger (UART / USB-CDC in production). A radio uplink adapter
//! would implement the same trait.

use log::{info, warn};

use crate::cycle::events::CycleEvent;
use crate::cycle::ports::EventSink;
use crate::timefmt;

/// Adapter that logs every [`CycleEvent`] to the serial console.
pub struct LogEventSink {
    utc_offset_minutes: i16,
}

impl LogEventSink {
    pub fn new(utc_offset_minutes: i16) -> Self {
        Self { utc_offset_minutes }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &CycleEvent) {
        match event {
            CycleEvent::ClockResolved(c) => {
                info!(
                    "CLOCK | {} hour={} trusted={}",
                    timefmt::format_iso8601(c.epoch, self.utc_offset_minutes),
                    c.hour,
                    c.trusted,
                );
            }
            CycleEvent::ReadingTaken(r) => {
                info!(
                    "READ  | air={:.1}\u{00b0}C rh={:.1}% p={:.1}hPa | water={:.1}\u{00b0}C level={:.1}cm",
                    r.air_temp_c, r.humidity_pct, r.pressure_hpa, r.water_temp_c, r.water_level_cm,
                );
            }
            CycleEvent::RecordStored => {
                info!("STORE | record appended");
            }
            CycleEvent::StorageUnavailable(e) => {
                warn!("STORE | unavailable: {}", e);
            }
            CycleEvent::Scheduled(d) => {
                info!("SCHED | tier={} interval={}s", d.tier, d.interval_secs);
            }
            CycleEvent::Summary(s) => {
                info!(
                    "CYCLE | tier={} sleep={}s stored={} | clock={} atmosphere={} water_temp={}",
                    s.tier,
                    s.sleep_secs,
                    s.stored,
                    if s.clock_trusted { "ok" } else { "fallback" },
                    if s.atmosphere_ok { "ok" } else { "degraded" },
                    if s.water_temp_ok { "ok" } else { "degraded" },
                );
            }
        }
    }
}
