//! NVS (Non-Volatile Storage) adapter.
//!
//! Persists the node configuration and small diagnostic blobs across deep
//! sleeps and reflashes. Config values are range-checked before they are
//! written; a stored config that fails to decode is reported as corrupted
//! rather than silently replaced, so the caller decides to fall back.
//!
//! On ESP-IDF this wraps the raw NVS C API (namespaced, committed blob
//! writes are atomic). On the host it is an in-memory map, which is what
//! the tests run against.

use log::{info, warn};

use crate::config::NodeConfig;
use crate::error::ConfigError;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "tanbo";
const CONFIG_KEY: &str = "nodecfg";
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsConfigStore {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, Vec<u8>>,
}

impl NvsConfigStore {
    /// Create the store and initialise NVS flash.
    ///
    /// On first boot or after a partition version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single boot-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("nvs: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("nvs: flash initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("nvs: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = namespace.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// Load the node configuration. Missing config (first boot) yields
    /// defaults; a blob that fails to decode is reported as corrupted.
    pub fn load(&self) -> Result<NodeConfig, ConfigError> {
        match self.read_blob_vec(CONFIG_NAMESPACE, CONFIG_KEY) {
            Ok(bytes) => {
                let cfg: NodeConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("nvs: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            Err(ConfigError::NotFound) => {
                info!("nvs: no stored config, using defaults");
                Ok(NodeConfig::default())
            }
            Err(e) => {
                warn!("nvs: read error ({}), using defaults", e);
                Ok(NodeConfig::default())
            }
        }
    }

    /// Validate and persist the configuration.
    pub fn save(&mut self, cfg: &NodeConfig) -> Result<(), ConfigError> {
        validate_config(cfg)?;
        let bytes = postcard::to_allocvec(cfg).map_err(|_| ConfigError::IoError)?;
        self.write_blob(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)?;
        info!("nvs: config saved ({} bytes)", bytes.len());
        Ok(())
    }

    // ── Raw blob access (diagnostics) ─────────────────────────

    /// Read a blob into an owned buffer.
    pub fn read_blob_vec(&self, namespace: &str, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let len = self.read_blob(namespace, key, &mut buf)?;
        Ok(buf[..len].to_vec())
    }

    /// Read a blob. Returns the number of bytes written to `buf`.
    pub fn read_blob(
        &self,
        namespace: &str,
        key: &str,
        buf: &mut [u8],
    ) -> Result<usize, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(ConfigError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut key_buf = [0u8; 16];
                let kb = key.as_bytes();
                let kl = kb.len().min(15);
                key_buf[..kl].copy_from_slice(&kb[..kl]);

                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(ConfigError::NotFound),
                Err(_) => Err(ConfigError::IoError),
            }
        }
    }

    /// Write a blob atomically (set + commit).
    pub fn write_blob(
        &mut self,
        namespace: &str,
        key: &str,
        data: &[u8],
    ) -> Result<(), ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let mut key_buf = [0u8; 16];
                let kb = key.as_bytes();
                let kl = kb.len().min(15);
                key_buf[..kl].copy_from_slice(&kb[..kl]);

                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| ConfigError::IoError)
        }
    }

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    pub fn delete_blob(&mut self, namespace: &str, key: &str) -> Result<(), ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let mut key_buf = [0u8; 16];
                let kb = key.as_bytes();
                let kl = kb.len().min(15);
                key_buf[..kl].copy_from_slice(&kb[..kl]);

                let ret = unsafe { nvs_erase_key(handle, key_buf.as_ptr() as *const _) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| ConfigError::IoError)
        }
    }
}

fn validate_config(cfg: &NodeConfig) -> Result<(), ConfigError> {
    if !(60..=86_400).contains(&cfg.normal_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "normal_interval_secs must be 60–86400",
        ));
    }
    if !(60..=86_400).contains(&cfg.night_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "night_interval_secs must be 60–86400",
        ));
    }
    if !(60..=86_400).contains(&cfg.safe_default_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "safe_default_interval_secs must be 60–86400",
        ));
    }
    if !(30..=86_400).contains(&cfg.high_risk_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "high_risk_interval_secs must be 30–86400",
        ));
    }
    if cfg.night_start_hour > 23 || cfg.night_end_hour > 23 {
        return Err(ConfigError::ValidationFailed(
            "night window hours must be 0–23",
        ));
    }
    if !(0.0..=40.0).contains(&cfg.risk_temp_min_c) {
        return Err(ConfigError::ValidationFailed(
            "risk_temp_min_c must be 0.0–40.0",
        ));
    }
    if !(0.0..=60.0).contains(&cfg.risk_temp_max_c) {
        return Err(ConfigError::ValidationFailed(
            "risk_temp_max_c must be 0.0–60.0",
        ));
    }
    if cfg.risk_temp_min_c >= cfg.risk_temp_max_c {
        return Err(ConfigError::ValidationFailed(
            "risk_temp_min_c must be < risk_temp_max_c",
        ));
    }
    if !(0.0..=100.0).contains(&cfg.risk_humidity_pct) {
        return Err(ConfigError::ValidationFailed(
            "risk_humidity_pct must be 0.0–100.0",
        ));
    }
    if !(1.0..=3.6).contains(&cfg.level_vref) {
        return Err(ConfigError::ValidationFailed(
            "level_vref must be 1.0–3.6",
        ));
    }
    if cfg.level_v0 < 0.0 || cfg.level_v0 >= cfg.level_vref {
        return Err(ConfigError::ValidationFailed(
            "level_v0 must be >= 0.0 and < level_vref",
        ));
    }
    if !(1.0..=100.0).contains(&cfg.level_max_cm) {
        return Err(ConfigError::ValidationFailed(
            "level_max_cm must be 1.0–100.0",
        ));
    }
    if cfg.log_path.is_empty() || !cfg.log_path.starts_with('/') {
        return Err(ConfigError::ValidationFailed(
            "log_path must be an absolute path",
        ));
    }
    if !(-720..=840).contains(&cfg.utc_offset_minutes) {
        return Err(ConfigError::ValidationFailed(
            "utc_offset_minutes must be -720–840",
        ));
    }
    if !(1..=300).contains(&cfg.sntp_timeout_secs) {
        return Err(ConfigError::ValidationFailed(
            "sntp_timeout_secs must be 1–300",
        ));
    }
    Ok(())
}
