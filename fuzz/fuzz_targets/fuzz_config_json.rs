#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = verifactu::Config::from_json(s) {
            // A config that loads must also pass its own validation.
            assert!(config.validate().is_ok());
        }
    }
});
