//! Fuzz target: stored configuration blob
//!
//! Feeds arbitrary bytes to the config store and checks:
//! - No panics on decode
//! - Anything that decodes also passes validation
//! - A decoded config re-saves and reloads
//!
//! cargo fuzz run fuzz_config_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use subcore::adapters::memory_store::{MemoryConfigStore, decode_config};
use subcore::app::ports::ConfigPort;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = decode_config(data) else {
        return;
    };
    assert!(cfg.validate().is_ok(), "decoded config failed validation");

    let mut store = MemoryConfigStore::new();
    store.save(&cfg).expect("valid config must save");
    store.load().expect("saved config must load");
});
