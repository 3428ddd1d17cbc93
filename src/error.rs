//! Unified error types for the field-node firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! boot path's error handling uniform.  All variants are `Copy` so they can
//! be cheaply passed through the measurement cycle without allocation.
//!
//! Most failures here are *degradations*, not aborts: a dead sensor becomes
//! a sentinel value in the record, a failed time sync becomes the fallback
//! timestamp, a failed write skips the record.  The node sleeps no matter
//! what.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be initialised or read.
    Sensor(SensorError),
    /// The record store (FAT flash) failed.
    Storage(StorageError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// Network time sync failed.
    TimeSync(TimeSyncError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::TimeSync(e) => write!(f, "time sync: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not respond on the bus (unplugged, wrong address).
    BusNotDetected,
    /// The device responded but the measurement transaction failed.
    ReadFailed,
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// ADC reading pinned at a supply rail — probe open or shorted.
    Saturated,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusNotDetected => write!(f, "device not detected on bus"),
            Self::ReadFailed => write!(f, "measurement read failed"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::Saturated => write!(f, "reading pinned at supply rail"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The FAT partition could not be mounted.
    MountFailed,
    /// The record file could not be opened or created.
    OpenFailed,
    /// Appending the record failed mid-write.
    WriteFailed,
    /// Flush/close failed — the record may not have reached flash.
    SyncFailed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MountFailed => write!(f, "mount failed"),
            Self::OpenFailed => write!(f, "open failed"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::SyncFailed => write!(f, "sync failed"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the NVS backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Time sync errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSyncError {
    /// Stored WiFi credentials are malformed (too long, bad UTF-8).
    CredentialsInvalid,
    /// Association or DHCP did not complete within the attempt budget.
    WifiConnectFailed,
    /// SNTP did not deliver a plausible time before the deadline.
    SyncTimedOut,
}

impl fmt::Display for TimeSyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialsInvalid => write!(f, "WiFi credentials invalid"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::SyncTimedOut => write!(f, "SNTP sync timed out"),
        }
    }
}

impl From<TimeSyncError> for Error {
    fn from(e: TimeSyncError) -> Self {
        Self::TimeSync(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
