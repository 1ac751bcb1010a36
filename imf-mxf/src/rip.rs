//! Random Index Pack location and decoding
//!
//! The random index pack is the last KLV unit of a file. Its final four
//! bytes hold the pack's overall length, which is read first to find where
//! the pack starts.

use crate::byte_range::ResourceByteRangeProvider;
use crate::error::{MxfError, Result};
use crate::klv::{encode_ber_length, KlvHeader};
use crate::ul::labels;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::{Cursor, Write};

/// Size of the trailing overall-length field
pub const OVERALL_LENGTH_SIZE: u64 = 4;

/// Size of one (body SID, byte offset) entry
pub const RIP_ENTRY_SIZE: u64 = 12;

/// Smallest possible pack: key, one-byte length, overall length
const MIN_PACK_SIZE: u64 = 16 + 1 + OVERALL_LENGTH_SIZE;

/// Random Index Pack entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RipEntry {
    /// Body SID (0 for partitions without essence)
    pub body_sid: u32,
    /// Byte offset of partition
    pub byte_offset: u64,
}

/// Random Index Pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomIndexPack {
    /// Entries in file order
    pub entries: Vec<RipEntry>,
    /// Overall length of the pack, as stored in its last four bytes
    pub pack_length: u32,
    /// Absolute offset of the pack's key
    pub byte_offset: u64,
}

impl RandomIndexPack {
    /// Locate and decode the pack at the end of a resource
    pub fn locate<P>(provider: &P) -> Result<Self>
    where
        P: ResourceByteRangeProvider + ?Sized,
    {
        let size = provider.resource_size();
        if size < OVERALL_LENGTH_SIZE {
            return Err(MxfError::MissingIndex {
                resource_size: size,
                message: "resource is smaller than the random index pack length field".into(),
            });
        }

        let tail = provider.byte_range_as_bytes(size - OVERALL_LENGTH_SIZE, size - 1)?;
        let pack_length = Cursor::new(&tail).read_u32::<BigEndian>()?;
        let length = pack_length as u64;

        if length > size {
            return Err(MxfError::MissingIndex {
                resource_size: size,
                message: format!(
                    "declared random index pack length {} exceeds resource size",
                    length
                ),
            });
        }
        if length < MIN_PACK_SIZE {
            return Err(MxfError::MissingIndex {
                resource_size: size,
                message: format!("declared random index pack length {} is too small", length),
            });
        }

        let byte_offset = size - length;
        let bytes = provider.byte_range_as_bytes(byte_offset, size - 1)?;
        let header = KlvHeader::decode(&bytes, byte_offset)?;

        if !header.key.is_random_index_pack() {
            return Err(MxfError::MissingIndex {
                resource_size: size,
                message: format!(
                    "unit at offset {} is {}, not a random index pack",
                    byte_offset,
                    header.key.name()
                ),
            });
        }

        let pack = Self::parse(&header, &bytes[header.key_length_size as usize..])?;
        pack.check_offsets()?;

        tracing::debug!(
            offset = byte_offset,
            partitions = pack.entries.len(),
            "Located random index pack"
        );
        Ok(pack)
    }

    /// Decode the pack value following `header`
    pub fn parse(header: &KlvHeader, value: &[u8]) -> Result<Self> {
        let malformed = |message: String| MxfError::MalformedIndex {
            offset: header.byte_offset,
            message,
        };

        if header.value_size != value.len() as u64 {
            return Err(malformed(format!(
                "declared value length {} disagrees with the {} bytes before the end of the resource",
                header.value_size,
                value.len()
            )));
        }
        if header.value_size < OVERALL_LENGTH_SIZE
            || (header.value_size - OVERALL_LENGTH_SIZE) % RIP_ENTRY_SIZE != 0
        {
            return Err(malformed(format!(
                "value length {} is not a whole number of entries",
                header.value_size
            )));
        }

        let count = (header.value_size - OVERALL_LENGTH_SIZE) / RIP_ENTRY_SIZE;
        let mut cursor = Cursor::new(value);
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let body_sid = cursor.read_u32::<BigEndian>()?;
            let byte_offset = cursor.read_u64::<BigEndian>()?;
            entries.push(RipEntry {
                body_sid,
                byte_offset,
            });
        }

        let pack_length = cursor.read_u32::<BigEndian>()?;
        if pack_length as u64 != header.total_size() {
            return Err(malformed(format!(
                "trailing length {} disagrees with unit size {}",
                pack_length,
                header.total_size()
            )));
        }

        Ok(RandomIndexPack {
            entries,
            pack_length,
            byte_offset: header.byte_offset,
        })
    }

    fn check_offsets(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(MxfError::MalformedIndex {
                offset: self.byte_offset,
                message: "random index pack lists no partitions".into(),
            });
        }
        for pair in self.entries.windows(2) {
            if pair[1].byte_offset <= pair[0].byte_offset {
                return Err(MxfError::MalformedIndex {
                    offset: self.byte_offset,
                    message: format!(
                        "partition offsets not ascending: {} then {}",
                        pair[0].byte_offset, pair[1].byte_offset
                    ),
                });
            }
        }
        if let Some(last) = self.entries.last() {
            if last.byte_offset >= self.byte_offset {
                return Err(MxfError::MalformedIndex {
                    offset: self.byte_offset,
                    message: format!(
                        "partition offset {} is not before the random index pack",
                        last.byte_offset
                    ),
                });
            }
        }
        Ok(())
    }

    /// Partition offsets in ascending order
    pub fn partition_byte_offsets(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.byte_offset).collect()
    }

    /// Write the pack
    pub fn write<W: Write>(entries: &[RipEntry], writer: &mut W) -> Result<usize> {
        let value_size = entries.len() as u64 * RIP_ENTRY_SIZE + OVERALL_LENGTH_SIZE;

        writer.write_all(&labels::RANDOM_INDEX_PACK)?;

        let len_bytes = encode_ber_length(value_size);
        writer.write_all(&len_bytes)?;

        for entry in entries {
            writer.write_u32::<BigEndian>(entry.body_sid)?;
            writer.write_u64::<BigEndian>(entry.byte_offset)?;
        }

        let overall_length = (16 + len_bytes.len() as u64 + value_size) as u32;
        writer.write_u32::<BigEndian>(overall_length)?;

        Ok(overall_length as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_range::MemoryByteRangeProvider;

    fn resource_with_rip(entries: &[RipEntry], body_len: usize) -> Vec<u8> {
        let mut data = vec![0u8; body_len];
        RandomIndexPack::write(entries, &mut data).unwrap();
        data
    }

    fn entry(body_sid: u32, byte_offset: u64) -> RipEntry {
        RipEntry {
            body_sid,
            byte_offset,
        }
    }

    #[test]
    fn test_locate() {
        let entries = [entry(0, 0), entry(1, 1000), entry(0, 5000)];
        let data = resource_with_rip(&entries, 6000);
        let provider = MemoryByteRangeProvider::new(data);

        let rip = RandomIndexPack::locate(&provider).unwrap();
        assert_eq!(rip.partition_byte_offsets(), vec![0, 1000, 5000]);
        assert_eq!(rip.byte_offset, 6000);
        assert_eq!(rip.pack_length as u64, 16 + 1 + 36 + 4);
    }

    #[test]
    fn test_missing_index_when_length_exceeds_size() {
        let mut data = vec![0u8; 100];
        data.extend_from_slice(&1000u32.to_be_bytes());
        let provider = MemoryByteRangeProvider::new(data);

        let err = RandomIndexPack::locate(&provider).unwrap_err();
        assert!(matches!(err, MxfError::MissingIndex { resource_size: 104, .. }));
    }

    #[test]
    fn test_missing_index_when_not_a_rip() {
        // length fits but the unit found there is not a random index pack
        let mut data = vec![0u8; 100];
        data.extend_from_slice(&40u32.to_be_bytes());
        let provider = MemoryByteRangeProvider::new(data);

        let err = RandomIndexPack::locate(&provider).unwrap_err();
        assert!(matches!(err, MxfError::MissingIndex { .. }));
    }

    #[test]
    fn test_missing_index_tiny_resource() {
        let provider = MemoryByteRangeProvider::new(vec![0u8, 1]);
        assert!(matches!(
            RandomIndexPack::locate(&provider),
            Err(MxfError::MissingIndex { .. })
        ));
    }

    #[test]
    fn test_non_ascending_offsets() {
        let entries = [entry(0, 0), entry(1, 5000), entry(0, 1000)];
        let provider = MemoryByteRangeProvider::new(resource_with_rip(&entries, 6000));

        assert!(matches!(
            RandomIndexPack::locate(&provider),
            Err(MxfError::MalformedIndex { offset: 6000, .. })
        ));
    }

    #[test]
    fn test_offset_inside_pack() {
        let entries = [entry(0, 0), entry(0, 7000)];
        let provider = MemoryByteRangeProvider::new(resource_with_rip(&entries, 6000));

        assert!(matches!(
            RandomIndexPack::locate(&provider),
            Err(MxfError::MalformedIndex { .. })
        ));
    }
}
