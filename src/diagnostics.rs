//! Crash note persistence and the panic guard.
//!
//! A single crash note (uptime plus truncated reason) is kept in the
//! "crash" NVS namespace. The panic guard writes it best-effort, then puts
//! the node back to sleep on the safe default interval so a panicking
//! cycle reschedules instead of stranding the node awake until the battery
//! dies. The note is reported and cleared on the next boot.

use serde::{Deserialize, Serialize};

use crate::adapters::nvs::NvsConfigStore;

const CRASH_NAMESPACE: &str = "crash";
const CRASH_KEY: &str = "note";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashNote {
    pub uptime_secs: u32,
    pub reason: heapless::String<96>,
}

impl CrashNote {
    /// Build a note, truncating the reason at whole characters.
    pub fn new(uptime_secs: u32, reason: &str) -> Self {
        let mut r = heapless::String::new();
        for c in reason.chars() {
            if r.push(c).is_err() {
                break;
            }
        }
        Self {
            uptime_secs,
            reason: r,
        }
    }
}

/// Persist a crash note. Returns whether the write succeeded.
pub fn store_crash_note(store: &mut NvsConfigStore, note: &CrashNote) -> bool {
    match postcard::to_allocvec(note) {
        Ok(bytes) => store.write_blob(CRASH_NAMESPACE, CRASH_KEY, &bytes).is_ok(),
        Err(_) => false,
    }
}

/// Read and clear the crash note from the previous run, if any.
///
/// An undecodable note is cleared and reported as absent, so one corrupt
/// blob cannot wedge every subsequent boot.
pub fn take_crash_note(store: &mut NvsConfigStore) -> Option<CrashNote> {
    let mut buf = [0u8; 160];
    let len = store.read_blob(CRASH_NAMESPACE, CRASH_KEY, &mut buf).ok()?;
    let note = postcard::from_bytes::<CrashNote>(&buf[..len]).ok();
    let _ = store.delete_blob(CRASH_NAMESPACE, CRASH_KEY);
    note
}

/// Install a panic hook that persists the reason and reschedules the node.
///
/// Must be called first thing in `main()`, before anything that can fail.
/// On panic the hook logs the reason, best-effort writes a [`CrashNote`],
/// and (on device) arms the wake timer with the safe default interval and
/// enters deep sleep. On the host it only logs.
pub fn install_panic_guard(safe_default_interval_secs: u32) {
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        log::error!("PANIC: {}", reason);

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: esp_timer_get_time is a plain counter read with no
            // allocation, safe from panic context.
            let uptime = (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1_000_000) as u32;
            let note = CrashNote::new(uptime, reason);

            // NVS may be uninitialised if the panic happened early in
            // main(); nvs_flash_init is idempotent so retrying here is fine.
            match NvsConfigStore::new() {
                Ok(mut store) => {
                    if !store_crash_note(&mut store, &note) {
                        log::error!("panic guard: crash note not persisted");
                    }
                }
                Err(_) => {
                    log::error!("panic guard: NVS unavailable, crash note lost");
                }
            }

            crate::power::emergency_deep_sleep(safe_default_interval_secs);
        }

        #[cfg(not(target_os = "espidf"))]
        log::error!(
            "panic guard (simulation): would reschedule in {}s",
            safe_default_interval_secs
        );
    }));
}
