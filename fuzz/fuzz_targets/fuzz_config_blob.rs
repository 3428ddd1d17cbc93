//! Fuzz target: NVS blob decoding
//!
//! Writes arbitrary bytes where the node persists its config blob and its
//! crash note, then exercises the load paths and asserts:
//! - No panics under any byte sequence
//! - `load` yields a config or a typed corruption error
//! - `take_crash_note` always consumes the note, decodable or not
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use tanbo_node::adapters::nvs::NvsConfigStore;
use tanbo_node::diagnostics;

fuzz_target!(|data: &[u8]| {
    let Ok(mut store) = NvsConfigStore::new() else {
        return;
    };

    // Arbitrary bytes where the config blob lives: load must decode or
    // report corruption, never panic.
    store
        .write_blob("tanbo", "nodecfg", data)
        .expect("in-memory write cannot fail");
    let _ = store.load();

    // Arbitrary bytes where the crash note lives: take must consume the
    // key whether or not the note decodes.
    store
        .write_blob("crash", "note", data)
        .expect("in-memory write cannot fail");
    let _ = diagnostics::take_crash_note(&mut store);

    let mut buf = [0u8; 16];
    assert!(
        store.read_blob("crash", "note", &mut buf).is_err(),
        "crash note survived take_crash_note"
    );
});
