#![no_main]

//! Fuzz target for partition pack decoding.

use imf_mxf::{MemoryByteRangeProvider, PartitionPack};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let provider = MemoryByteRangeProvider::new(data.to_vec());
    if let Ok(pack) = PartitionPack::read(&provider, 0) {
        let mut out = Vec::new();
        let _ = pack.write(&mut out);
    }
});
