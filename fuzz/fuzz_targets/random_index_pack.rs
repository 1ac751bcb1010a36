#![no_main]

//! Fuzz target for locating the random index pack at the end of a resource.

use imf_mxf::{MemoryByteRangeProvider, RandomIndexPack};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let provider = MemoryByteRangeProvider::new(data.to_vec());
    if let Ok(rip) = RandomIndexPack::locate(&provider) {
        let offsets = rip.partition_byte_offsets();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        assert!(offsets.iter().all(|&o| o < rip.byte_offset));
    }
});
