//! Deep-sleep entry and wake-reason reporting.
//!
//! The node spends almost all of its life in deep sleep; waking is a full
//! reboot. `deep_sleep` arms the RTC wake timer and powers down, and on
//! ESP32 it does not return. The host build only logs and returns, so
//! simulation runs and tests keep executing past the power-down.

use log::info;

use crate::cycle::ports::PowerPort;

/// Why the chip is running this boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// RTC timer expired. The steady-state duty-cycle path.
    Timer,
    /// Cold boot: first install, battery swap, or reset button.
    PowerOn,
    /// A wake source this firmware never arms (ULP, GPIO, ...).
    Other(u32),
}

impl core::fmt::Display for WakeReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timer => write!(f, "timer"),
            Self::PowerOn => write!(f, "power-on"),
            Self::Other(code) => write!(f, "other({})", code),
        }
    }
}

/// Read the wake cause for this boot.
#[cfg(target_os = "espidf")]
pub fn wake_reason() -> WakeReason {
    use esp_idf_svc::sys::*;
    // SAFETY: reads a cause latched by the bootloader; no preconditions.
    let cause = unsafe { esp_sleep_get_wakeup_cause() };
    if cause == esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER {
        WakeReason::Timer
    } else if cause == esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED {
        WakeReason::PowerOn
    } else {
        WakeReason::Other(cause as u32)
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn wake_reason() -> WakeReason {
    WakeReason::PowerOn
}

/// Arm the RTC wake timer and enter deep sleep.
///
/// Free function so the panic guard and boot-failure paths can power down
/// without an [`EspPower`] instance. The interval is clamped to at least
/// one second; a zero would arm an immediate wake.
pub fn emergency_deep_sleep(interval_secs: u32) {
    let secs = interval_secs.max(1);

    #[cfg(target_os = "espidf")]
    {
        use esp_idf_svc::sys::*;
        info!("POWER | entering deep sleep for {}s", secs);
        // SAFETY: arming the wake timer and entering deep sleep take no
        // pointers and are valid from any task context. Execution does not
        // continue past esp_deep_sleep_start.
        unsafe {
            esp_sleep_enable_timer_wakeup(u64::from(secs) * 1_000_000);
            esp_deep_sleep_start();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    info!("POWER | deep sleep for {}s (simulation, returning)", secs);
}

/// [`PowerPort`] backed by the ESP32 RTC deep-sleep timer.
#[derive(Default)]
pub struct EspPower;

impl EspPower {
    pub fn new() -> Self {
        Self
    }
}

impl PowerPort for EspPower {
    fn deep_sleep(&mut self, interval_secs: u32) {
        emergency_deep_sleep(interval_secs);
    }
}
