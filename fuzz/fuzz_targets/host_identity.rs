#![no_main]

use hostlog_pipeline::resolve_host_identity;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|origin: &str| {
    let identity = resolve_host_identity(origin);
    // 정규화 결과는 다시 정규화해도 바뀌지 않아야 함
    assert_eq!(resolve_host_identity(&identity), identity);
});
