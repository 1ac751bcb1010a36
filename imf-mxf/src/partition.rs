//! MXF partition handling
//!
//! MXF files are divided into partitions:
//! - Header partition (required)
//! - Body partitions (optional)
//! - Footer partition (required for closed/complete files)
//!
//! Each partition starts with a partition pack whose key encodes the
//! partition kind (byte 14) and status (byte 15).

use crate::byte_range::ResourceByteRangeProvider;
use crate::error::{MxfError, Result};
use crate::klv::{encode_ber_length, encode_ber_length_long, fetch_unit_with, probe_header, KlvHeader};
use crate::ul::{labels, UniversalLabel};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read, Write};

/// Size of the fixed fields preceding the essence container batch
const FIXED_FIELDS_SIZE: u64 = 80;

/// Size of a batch header: item count and item size
const BATCH_HEADER_SIZE: u64 = 8;

/// Size of one essence container label
const BATCH_ITEM_SIZE: u32 = 16;

/// Partition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    /// Header partition
    Header,
    /// Body partition
    Body,
    /// Footer partition
    Footer,
}

impl PartitionKind {
    fn key_byte(self) -> u8 {
        match self {
            PartitionKind::Header => 0x02,
            PartitionKind::Body => 0x03,
            PartitionKind::Footer => 0x04,
        }
    }
}

/// Partition status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStatus {
    /// Open and incomplete
    OpenIncomplete,
    /// Closed and incomplete
    ClosedIncomplete,
    /// Open and complete
    OpenComplete,
    /// Closed and complete
    ClosedComplete,
}

impl PartitionStatus {
    fn from_key_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(PartitionStatus::OpenIncomplete),
            0x02 => Some(PartitionStatus::ClosedIncomplete),
            0x03 => Some(PartitionStatus::OpenComplete),
            0x04 => Some(PartitionStatus::ClosedComplete),
            _ => None,
        }
    }

    fn key_byte(self) -> u8 {
        match self {
            PartitionStatus::OpenIncomplete => 0x01,
            PartitionStatus::ClosedIncomplete => 0x02,
            PartitionStatus::OpenComplete => 0x03,
            PartitionStatus::ClosedComplete => 0x04,
        }
    }

    /// True for closed partitions
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            PartitionStatus::ClosedIncomplete | PartitionStatus::ClosedComplete
        )
    }

    /// True for complete partitions
    pub fn is_complete(self) -> bool {
        matches!(
            self,
            PartitionStatus::OpenComplete | PartitionStatus::ClosedComplete
        )
    }
}

/// MXF partition pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionPack {
    /// Absolute offset of the pack's key
    pub byte_offset: u64,
    /// Partition kind
    pub kind: PartitionKind,
    /// Open/closed and complete/incomplete flags
    pub status: PartitionStatus,
    /// Major version (should be 1)
    pub major_version: u16,
    /// Minor version (should be 2 or 3)
    pub minor_version: u16,
    /// KAG size (key alignment grid)
    pub kag_size: u32,
    /// This partition offset in file
    pub this_partition: u64,
    /// Previous partition offset
    pub previous_partition: u64,
    /// Footer partition offset
    pub footer_partition: u64,
    /// Header metadata byte count (bytes after the partition pack)
    pub header_byte_count: u64,
    /// Index byte count
    pub index_byte_count: u64,
    /// Index SID (stream ID for index)
    pub index_sid: u32,
    /// Body offset (for body partitions)
    pub body_offset: u64,
    /// Body SID (stream ID for essence)
    pub body_sid: u32,
    /// Operational pattern
    pub operational_pattern: UniversalLabel,
    /// Essence containers
    pub essence_containers: Vec<UniversalLabel>,
    length_field_size: usize,
    value_size: u64,
}

impl PartitionPack {
    /// Create a pack with default field values
    pub fn new(kind: PartitionKind, status: PartitionStatus) -> Self {
        PartitionPack {
            byte_offset: 0,
            kind,
            status,
            major_version: 1,
            minor_version: 3,
            kag_size: 1,
            this_partition: 0,
            previous_partition: 0,
            footer_partition: 0,
            header_byte_count: 0,
            index_byte_count: 0,
            index_sid: 0,
            body_offset: 0,
            body_sid: 0,
            operational_pattern: UniversalLabel(labels::OP1A),
            essence_containers: Vec::new(),
            length_field_size: 0,
            value_size: 0,
        }
    }

    /// Read the partition pack at `offset`
    ///
    /// Fetches a bounded probe window to decode the KLV header, then fetches
    /// exactly the declared unit (clamped to the end of the resource).
    pub fn read<P>(provider: &P, offset: u64) -> Result<Self>
    where
        P: ResourceByteRangeProvider + ?Sized,
    {
        let header = probe_header(provider, offset)?;
        if !header.key.is_partition_pack() {
            return Err(MxfError::MalformedPartition {
                offset,
                message: format!("expected a partition pack, found {}", header.key.name()),
            });
        }

        let bytes = fetch_unit_with(provider, &header)?;
        let pack = Self::parse(&header, &bytes[header.key_length_size as usize..])?;
        tracing::debug!(
            offset,
            kind = ?pack.kind,
            status = ?pack.status,
            "Found partition"
        );
        Ok(pack)
    }

    /// Decode a partition pack value following `header`
    pub fn parse(header: &KlvHeader, value: &[u8]) -> Result<Self> {
        let offset = header.byte_offset;
        let malformed = |message: String| MxfError::MalformedPartition { offset, message };

        if !header.key.is_partition_pack() {
            return Err(malformed(format!(
                "expected a partition pack, found {}",
                header.key.name()
            )));
        }

        let key = header.key.as_bytes();
        let kind = match key[13] {
            0x02 => PartitionKind::Header,
            0x03 => PartitionKind::Body,
            _ => PartitionKind::Footer,
        };
        let status = PartitionStatus::from_key_byte(key[14])
            .ok_or_else(|| malformed(format!("unknown partition status {:02x}", key[14])))?;

        if (value.len() as u64) < header.value_size {
            return Err(malformed(format!(
                "pack declares {} value bytes but only {} remain in the resource",
                header.value_size,
                value.len()
            )));
        }
        let value = &value[..header.value_size as usize];
        if header.value_size < FIXED_FIELDS_SIZE + BATCH_HEADER_SIZE {
            return Err(malformed(format!(
                "value of {} bytes is shorter than the {} fixed bytes",
                header.value_size,
                FIXED_FIELDS_SIZE + BATCH_HEADER_SIZE
            )));
        }

        let mut cursor = Cursor::new(value);
        let major_version = cursor.read_u16::<BigEndian>()?;
        let minor_version = cursor.read_u16::<BigEndian>()?;
        let kag_size = cursor.read_u32::<BigEndian>()?;
        let this_partition = cursor.read_u64::<BigEndian>()?;
        let previous_partition = cursor.read_u64::<BigEndian>()?;
        let footer_partition = cursor.read_u64::<BigEndian>()?;
        let header_byte_count = cursor.read_u64::<BigEndian>()?;
        let index_byte_count = cursor.read_u64::<BigEndian>()?;
        let index_sid = cursor.read_u32::<BigEndian>()?;
        let body_offset = cursor.read_u64::<BigEndian>()?;
        let body_sid = cursor.read_u32::<BigEndian>()?;

        let mut operational_pattern = [0u8; 16];
        cursor.read_exact(&mut operational_pattern)?;

        // Read essence container batch
        let batch_count = cursor.read_u32::<BigEndian>()?;
        let batch_item_size = cursor.read_u32::<BigEndian>()?;
        let remaining = header.value_size - cursor.position();
        let batch_bytes = batch_count as u64 * batch_item_size as u64;

        if batch_bytes > remaining {
            return Err(malformed(format!(
                "essence container batch of {} x {} bytes exceeds the {} bytes remaining",
                batch_count, batch_item_size, remaining
            )));
        }
        if batch_count > 0 && batch_item_size != BATCH_ITEM_SIZE {
            return Err(malformed(format!(
                "essence container batch item size {} is not {}",
                batch_item_size, BATCH_ITEM_SIZE
            )));
        }

        let mut essence_containers = Vec::with_capacity(batch_count as usize);
        for _ in 0..batch_count {
            let mut ul = [0u8; 16];
            cursor.read_exact(&mut ul)?;
            essence_containers.push(UniversalLabel(ul));
        }

        Ok(PartitionPack {
            byte_offset: offset,
            kind,
            status,
            major_version,
            minor_version,
            kag_size,
            this_partition,
            previous_partition,
            footer_partition,
            header_byte_count,
            index_byte_count,
            index_sid,
            body_offset,
            body_sid,
            operational_pattern: UniversalLabel(operational_pattern),
            essence_containers,
            length_field_size: header.length_field_size() as usize,
            value_size: header.value_size,
        })
    }

    /// The partition pack key for this kind and status
    pub fn pack_key(&self) -> UniversalLabel {
        let mut key = labels::PARTITION_PACK_BASE;
        key[13] = self.kind.key_byte();
        key[14] = self.status.key_byte();
        UniversalLabel(key)
    }

    /// Bytes taken by the pack's key and length fields
    pub fn klv_header_size(&self) -> u64 {
        16 + self.encoded_length_field().len() as u64
    }

    /// Total size of the partition pack unit
    pub fn encoded_len(&self) -> u64 {
        self.klv_header_size() + self.encoded_value_size()
    }

    /// Whether this partition carries an index table
    pub fn index_table_present(&self) -> bool {
        self.index_byte_count > 0
    }

    /// Whether this partition carries header metadata
    pub fn has_header_metadata(&self) -> bool {
        self.header_byte_count > 0
    }

    /// Whether this partition carries essence
    pub fn has_essence(&self) -> bool {
        self.body_sid != 0
    }

    /// Number of essence container labels
    pub fn essence_container_count(&self) -> usize {
        self.essence_containers.len()
    }

    /// Add essence container
    pub fn add_essence_container(&mut self, ul: UniversalLabel) {
        if !self.essence_containers.contains(&ul) {
            self.essence_containers.push(ul);
        }
    }

    fn encoded_value_size(&self) -> u64 {
        let minimal = FIXED_FIELDS_SIZE
            + BATCH_HEADER_SIZE
            + self.essence_containers.len() as u64 * BATCH_ITEM_SIZE as u64;
        minimal.max(self.value_size)
    }

    fn encoded_length_field(&self) -> Vec<u8> {
        let value_size = self.encoded_value_size();
        if self.length_field_size > 1 {
            if let Some(bytes) = encode_ber_length_long(value_size, self.length_field_size - 1) {
                return bytes;
            }
        }
        encode_ber_length(value_size)
    }

    /// Write the partition pack
    ///
    /// A pack decoded from a file is written back with its original length
    /// field width and declared value size, trailing bytes zero-filled.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(self.pack_key().as_bytes())?;

        let len_bytes = self.encoded_length_field();
        writer.write_all(&len_bytes)?;

        let value_size = self.encoded_value_size();
        let mut value = Vec::with_capacity(value_size as usize);
        value.write_u16::<BigEndian>(self.major_version)?;
        value.write_u16::<BigEndian>(self.minor_version)?;
        value.write_u32::<BigEndian>(self.kag_size)?;
        value.write_u64::<BigEndian>(self.this_partition)?;
        value.write_u64::<BigEndian>(self.previous_partition)?;
        value.write_u64::<BigEndian>(self.footer_partition)?;
        value.write_u64::<BigEndian>(self.header_byte_count)?;
        value.write_u64::<BigEndian>(self.index_byte_count)?;
        value.write_u32::<BigEndian>(self.index_sid)?;
        value.write_u64::<BigEndian>(self.body_offset)?;
        value.write_u32::<BigEndian>(self.body_sid)?;
        value.write_all(self.operational_pattern.as_bytes())?;

        value.write_u32::<BigEndian>(self.essence_containers.len() as u32)?;
        value.write_u32::<BigEndian>(BATCH_ITEM_SIZE)?;
        for ec in &self.essence_containers {
            value.write_all(ec.as_bytes())?;
        }
        value.resize(value_size as usize, 0);
        writer.write_all(&value)?;

        Ok(16 + len_bytes.len() + value.len())
    }
}
