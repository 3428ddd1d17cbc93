//! Wall-clock time source and the boot-time network seed.
//!
//! The ESP32 RTC counter survives deep sleep, so once SNTP has seeded it
//! the node keeps usable civil time across many cycles without touching
//! the radio again. [`RtcTimeSource::now`] reads the system clock and
//! rejects obviously unseeded values (anything before 2020), falling back
//! to the fixed noon fallback instead of failing.
//!
//! [`seed_clock_from_network`] is the one network operation the firmware
//! has: associate, run SNTP against the default pool, wait out a bounded
//! deadline, tear the radio down. Whether it runs at all is decided at
//! runtime from config, so a node can be provisioned or de-provisioned
//! without reflashing.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI64, Ordering};

use crate::cycle::ports::{TimeSource, WallClock};
use crate::timefmt;

/// Anything earlier than 2020-01-01T00:00:00Z means the RTC was never
/// seeded and the value is boot-counter noise, not civil time.
pub const EPOCH_2020: i64 = 1_577_836_800;

#[cfg(not(target_os = "espidf"))]
static SIM_EPOCH: AtomicI64 = AtomicI64::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_epoch(epoch: i64) {
    SIM_EPOCH.store(epoch, Ordering::Relaxed);
}

pub struct RtcTimeSource {
    utc_offset_minutes: i16,
}

impl RtcTimeSource {
    pub fn new(utc_offset_minutes: i16) -> Self {
        Self { utc_offset_minutes }
    }

    #[cfg(target_os = "espidf")]
    fn epoch_now(&self) -> Option<i64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: gettimeofday only writes into the struct we hand it.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = tv.tv_sec as i64;
        (secs >= EPOCH_2020).then_some(secs)
    }

    #[cfg(not(target_os = "espidf"))]
    fn epoch_now(&self) -> Option<i64> {
        let secs = SIM_EPOCH.load(Ordering::Relaxed);
        (secs >= EPOCH_2020).then_some(secs)
    }
}

impl TimeSource for RtcTimeSource {
    fn now(&self) -> WallClock {
        match self.epoch_now() {
            Some(epoch) => WallClock {
                epoch,
                hour: timefmt::hour_of_day(epoch, self.utc_offset_minutes),
                trusted: true,
            },
            None => WallClock::fallback(),
        }
    }
}

/// Bring WiFi up, run one bounded SNTP sync, and drop the radio.
///
/// Consumes the modem for the duration of the call; both the WiFi driver
/// and the SNTP client are torn down on return, success or not. A node in
/// a dead spot burns the timeout once per boot and then runs on the RTC.
#[cfg(target_os = "espidf")]
pub fn seed_clock_from_network(
    cfg: &crate::config::NodeConfig,
    modem: esp_idf_hal::modem::Modem,
    sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
) -> Result<(), crate::error::TimeSyncError> {
    use std::time::Duration;

    use esp_idf_svc::sntp::{EspSntp, SyncStatus};
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use crate::error::TimeSyncError;

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))
        .map_err(|_| TimeSyncError::WifiConnectFailed)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)
        .map_err(|_| TimeSyncError::WifiConnectFailed)?;

    let auth_method = if cfg.wifi_password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPAWPA2Personal
    };
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: cfg
            .wifi_ssid
            .as_str()
            .try_into()
            .map_err(|_| TimeSyncError::CredentialsInvalid)?,
        password: cfg
            .wifi_password
            .as_str()
            .try_into()
            .map_err(|_| TimeSyncError::CredentialsInvalid)?,
        auth_method,
        ..Default::default()
    }))
    .map_err(|_| TimeSyncError::WifiConnectFailed)?;

    wifi.start().map_err(|_| TimeSyncError::WifiConnectFailed)?;
    wifi.connect()
        .map_err(|_| TimeSyncError::WifiConnectFailed)?;
    wifi.wait_netif_up()
        .map_err(|_| TimeSyncError::WifiConnectFailed)?;
    info!("CLOCK | associated to `{}`", cfg.wifi_ssid);

    let sntp = EspSntp::new_default().map_err(|_| TimeSyncError::SyncTimedOut)?;

    // Poll at 200 ms against a hard deadline; the cycle must not hang
    // awake on a dead NTP path.
    let polls = cfg.sntp_timeout_secs.saturating_mul(5).max(1);
    for _ in 0..polls {
        if sntp.get_sync_status() == SyncStatus::Completed {
            info!("CLOCK | SNTP sync completed");
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(200));
    }

    warn!(
        "CLOCK | SNTP sync not completed within {}s",
        cfg.sntp_timeout_secs
    );
    Err(TimeSyncError::SyncTimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test body: the cases share the simulated RTC static and must not
    // interleave under the parallel test runner.
    #[test]
    fn rtc_trust_and_fallback() {
        let clock = RtcTimeSource::new(540);

        // Unseeded RTC falls back to the noon sentinel, untrusted.
        sim_set_epoch(0);
        let now = clock.now();
        assert_eq!(now, WallClock::fallback());
        assert_eq!(now.hour, 12);
        assert!(!now.trusted);

        // Anything before 2020 is treated as unsynced.
        sim_set_epoch(EPOCH_2020 - 1);
        assert!(!clock.now().trusted);

        // 2024-06-01T00:00:00Z is 09:00 at +09:00.
        sim_set_epoch(1_717_200_000);
        let now = clock.now();
        assert!(now.trusted);
        assert_eq!(now.epoch, 1_717_200_000);
        assert_eq!(now.hour, 9);

        sim_set_epoch(0);
    }
}
