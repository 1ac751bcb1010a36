//! Primer pack: local tag to Universal Label mapping
//!
//! Every metadata set in a header partition encodes its properties with
//! 2-byte local tags. The primer pack, which immediately follows the
//! partition pack, maps each tag to the property's full label. Tags at or
//! above 0x8000 are dynamically allocated per file, so properties must be
//! identified by label, never by tag.

use crate::error::{MxfError, Result};
use crate::klv::{encode_ber_length, KlvHeader};
use crate::ul::{labels, UniversalLabel, UL};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

/// Size of one primer entry: tag plus label
const PRIMER_ITEM_SIZE: u32 = 18;

/// Primer pack for local tag mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimerPack {
    mappings: BTreeMap<u16, UniversalLabel>,
    byte_offset: u64,
}

impl PrimerPack {
    /// Create an empty primer pack
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the primer pack value following `header`
    pub fn parse(header: &KlvHeader, value: &[u8]) -> Result<Self> {
        let offset = header.byte_offset;
        if !header.key.is_primer_pack() {
            return Err(MxfError::klv(
                offset,
                format!("expected a primer pack, found {}", header.key.name()),
            ));
        }

        if value.len() < 8 {
            return Err(MxfError::klv(offset, "primer pack shorter than its batch header"));
        }

        let mut cursor = Cursor::new(value);
        let count = cursor.read_u32::<BigEndian>()?;
        let item_size = cursor.read_u32::<BigEndian>()?;
        if count > 0 && item_size != PRIMER_ITEM_SIZE {
            return Err(MxfError::klv(
                offset,
                format!("primer item size {} is not {}", item_size, PRIMER_ITEM_SIZE),
            ));
        }
        let needed = 8 + count as u64 * PRIMER_ITEM_SIZE as u64;
        if needed > value.len() as u64 {
            return Err(MxfError::klv(
                offset,
                format!("primer declares {} entries but holds {} bytes", count, value.len()),
            ));
        }

        let mut mappings = BTreeMap::new();
        for _ in 0..count {
            let tag = cursor.read_u16::<BigEndian>()?;
            let mut ul: UL = [0u8; 16];
            cursor.read_exact(&mut ul)?;
            if mappings.insert(tag, UniversalLabel(ul)).is_some() {
                tracing::warn!(offset, tag, "Duplicate primer tag");
            }
        }

        tracing::debug!(offset, entries = mappings.len(), "Parsed primer pack");
        Ok(PrimerPack {
            mappings,
            byte_offset: offset,
        })
    }

    /// Add mapping
    pub fn add(&mut self, tag: u16, ul: UL) {
        self.mappings.entry(tag).or_insert(UniversalLabel(ul));
    }

    /// Lookup UL by tag
    pub fn lookup(&self, tag: u16) -> Option<&UniversalLabel> {
        self.mappings.get(&tag)
    }

    /// Lookup tag by UL, ignoring the version byte
    pub fn reverse_lookup(&self, ul: &UL) -> Option<u16> {
        self.mappings
            .iter()
            .find(|(_, u)| u.matches(ul))
            .map(|(t, _)| *t)
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// True if the primer holds no mappings
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Absolute offset of the primer pack's key
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Write primer pack
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut value = Vec::new();
        value.write_u32::<BigEndian>(self.mappings.len() as u32)?;
        value.write_u32::<BigEndian>(PRIMER_ITEM_SIZE)?;
        for (tag, ul) in &self.mappings {
            value.write_u16::<BigEndian>(*tag)?;
            value.extend_from_slice(ul.as_bytes());
        }

        writer.write_all(&labels::PRIMER_PACK)?;
        let len_bytes = encode_ber_length(value.len() as u64);
        writer.write_all(&len_bytes)?;
        writer.write_all(&value)?;
        Ok(16 + len_bytes.len() + value.len())
    }
}
