#![no_main]

//! Fuzz target for header partition metadata.
//!
//! Decodes the primer and every metadata set, then walks the strong
//! reference graph the way descriptor projection does.

use imf_mxf::HeaderPartition;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 256 * 1024 {
        return;
    }
    if let Ok(header) = HeaderPartition::parse(data, 0) {
        let _ = header.track_file_id();
        for descriptor in header.essence_descriptors() {
            let _ = header.sub_descriptors(descriptor);
        }
    }
});
