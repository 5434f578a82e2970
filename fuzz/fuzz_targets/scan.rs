#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate zstd_size;

fuzz_target!(|data: &[u8]| {
    // A known total means every frame was parsed without error
    if let Ok(zstd_size::ContentSize::Known(_)) = zstd_size::scan(data) {
        assert!(zstd_size::frames(data).all(|frame| frame.is_ok()));
    }
});
