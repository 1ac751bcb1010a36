#![no_main]

//! Fuzz target for KLV framing.
//!
//! Walks arbitrary bytes as a KLV stream and as a local set, and checks that
//! BER lengths survive an encode/decode cycle.

use arbitrary::Arbitrary;
use imf_mxf::klv::{decode_ber_length, encode_ber_length, read_local_set};
use imf_mxf::KlvReader;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct KlvInput {
    data: Vec<u8>,
    base_offset: u32,
    operation: KlvOperation,
}

#[derive(Arbitrary, Debug)]
enum KlvOperation {
    /// Read units until the stream ends or fails
    ReadStream,
    /// Decode a local set value
    ReadLocalSet,
    /// Decode a BER length
    ReadBerLength,
    /// Encode then decode a BER length
    BerRoundtrip { length: u64 },
}

fuzz_target!(|input: KlvInput| {
    if input.data.len() > 64 * 1024 {
        return;
    }
    let base = input.base_offset as u64;

    match input.operation {
        KlvOperation::ReadStream => {
            let mut reader = KlvReader::new(&input.data, base);
            while let Ok(Some((header, value))) = reader.read_klv() {
                assert_eq!(value.len() as u64, header.value_size);
                assert!(reader.position() <= input.data.len());
            }
        }

        KlvOperation::ReadLocalSet => {
            let _ = read_local_set(&input.data, base);
        }

        KlvOperation::ReadBerLength => {
            if let Ok((_, size)) = decode_ber_length(&input.data, base) {
                assert!(size <= input.data.len());
            }
        }

        KlvOperation::BerRoundtrip { length } => {
            let encoded = encode_ber_length(length);
            let (decoded, size) = decode_ber_length(&encoded, 0).expect("encoded length decodes");
            assert_eq!(decoded, length);
            assert_eq!(size, encoded.len());
        }
    }
});
