//! Wear-levelled FAT volume on the internal flash `storage` partition.
//!
//! Mounted once per boot through the ESP-IDF VFS so the CSV store can use
//! plain `std::fs`. There is deliberately no unmount: deep sleep tears the
//! whole process down, and the store fsyncs every append, so the volume is
//! always clean at power-down.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::{info, warn};

use crate::error::StorageError;

/// VFS mount point; record paths in config must live under it.
pub const MOUNT_POINT: &str = "/flash";

#[cfg(target_os = "espidf")]
const MOUNT_POINT_C: &core::ffi::CStr = c"/flash";
#[cfg(target_os = "espidf")]
const PARTITION_LABEL_C: &core::ffi::CStr = c"storage";

#[cfg(target_os = "espidf")]
static mut WL_HANDLE: wl_handle_t = WL_INVALID_HANDLE as wl_handle_t;

/// Mount the data volume. A first boot (or a corrupted volume) formats it;
/// losing an unreadable log beats never logging again.
#[cfg(target_os = "espidf")]
pub fn mount() -> Result<(), StorageError> {
    let mount_cfg = esp_vfs_fat_mount_config_t {
        format_if_mount_failed: true,
        max_files: 2,
        allocation_unit_size: 4096,
        ..Default::default()
    };
    // SAFETY: called once from main() before any file access; WL_HANDLE
    // is written only here, on the single boot thread.
    let ret = unsafe {
        esp_vfs_fat_spiflash_mount_rw_wl(
            MOUNT_POINT_C.as_ptr(),
            PARTITION_LABEL_C.as_ptr(),
            &mount_cfg,
            &raw mut WL_HANDLE,
        )
    };
    if ret != ESP_OK as i32 {
        warn!("flash_fs: mount failed (rc={})", ret);
        return Err(StorageError::MountFailed);
    }
    info!("flash_fs: FAT volume mounted at {}", MOUNT_POINT);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn mount() -> Result<(), StorageError> {
    log::info!("flash_fs(sim): mount skipped");
    Ok(())
}
