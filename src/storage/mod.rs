//! Durable record storage — the FAT volume on internal flash and the
//! append-only CSV store that lives on it.

pub mod csv_store;
pub mod flash_fs;
