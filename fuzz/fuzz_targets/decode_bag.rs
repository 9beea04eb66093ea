#![no_main]

use hostlog_pipeline::decode_bag;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let _ = decode_bag(line, 1);
    }
});
