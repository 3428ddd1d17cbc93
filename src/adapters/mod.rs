//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                    |
//! |------------|-------------|--------------------------------|
//! | `clock`    | TimeSource  | ESP32 RTC, WiFi + SNTP seeding |
//! | `log_sink` | EventSink   | Serial log output              |
//! | `nvs`      | config/blob | NVS / in-memory store          |

pub mod clock;
pub mod log_sink;
pub mod nvs;
