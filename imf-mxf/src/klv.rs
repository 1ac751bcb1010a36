//! KLV (Key-Length-Value) triplet handling
//!
//! All data in MXF files is encoded as KLV triplets:
//! - Key: 16-byte Universal Label identifying the data
//! - Length: BER-encoded length of the value
//! - Value: The actual data
//!
//! The length field is between 1 and 9 bytes, so its size is unknown until
//! its first byte is read. [`probe_header`] and [`fetch_unit`] implement the
//! two-phase "fetch a bounded window, decode the header, then fetch exactly
//! the unit" pattern used for every self-describing record read from a
//! provider.

use crate::byte_range::ResourceByteRangeProvider;
use crate::error::{MxfError, Result};
use crate::ul::{UniversalLabel, UL};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Write};

/// Size of the key field
pub const KEY_FIELD_SIZE: usize = 16;

/// Largest length field accepted: one prefix byte plus eight length bytes
pub const LENGTH_FIELD_MAX_SIZE: usize = 9;

/// Conservative window that always holds a complete KLV header
pub const MAX_HEADER_SIZE: usize = KEY_FIELD_SIZE + LENGTH_FIELD_MAX_SIZE;

/// Decoded key and length of one KLV unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KlvHeader {
    /// Universal Label (key)
    pub key: UniversalLabel,
    /// Bytes taken by the key and length fields together
    pub key_length_size: u64,
    /// Decoded length of the value
    pub value_size: u64,
    /// Absolute offset of the key
    pub byte_offset: u64,
}

impl KlvHeader {
    /// Decode a header from `data`, which starts at the key located at
    /// absolute offset `byte_offset`
    pub fn decode(data: &[u8], byte_offset: u64) -> Result<Self> {
        let key = UniversalLabel::from_slice(data).ok_or_else(|| {
            MxfError::klv(
                byte_offset,
                format!("need {} key bytes, have {}", KEY_FIELD_SIZE, data.len()),
            )
        })?;

        let (value_size, length_size) = decode_ber_length(
            &data[KEY_FIELD_SIZE..],
            byte_offset + KEY_FIELD_SIZE as u64,
        )?;

        Ok(KlvHeader {
            key,
            key_length_size: (KEY_FIELD_SIZE + length_size) as u64,
            value_size,
            byte_offset,
        })
    }

    /// Size of the length field alone
    pub fn length_field_size(&self) -> u64 {
        self.key_length_size - KEY_FIELD_SIZE as u64
    }

    /// Total unit size: key, length and value
    pub fn total_size(&self) -> u64 {
        self.key_length_size.saturating_add(self.value_size)
    }

    /// Absolute offset of the first value byte
    pub fn value_offset(&self) -> u64 {
        self.byte_offset + self.key_length_size
    }

    /// Absolute offset one past the last value byte
    pub fn end_offset(&self) -> u64 {
        self.byte_offset.saturating_add(self.total_size())
    }
}

/// Fetch a bounded window at `offset` and decode the KLV header found there
pub fn probe_header<P>(provider: &P, offset: u64) -> Result<KlvHeader>
where
    P: ResourceByteRangeProvider + ?Sized,
{
    let size = provider.resource_size();
    if offset >= size {
        return Err(MxfError::OutOfRange {
            start: offset,
            end: offset,
            size,
        });
    }
    let end = offset
        .saturating_add(MAX_HEADER_SIZE as u64)
        .min(size)
        - 1;
    let window = provider.byte_range_as_bytes(offset, end)?;
    KlvHeader::decode(&window, offset)
}

/// Probe the header at `offset`, then fetch the whole unit
///
/// The second fetch is clamped to the end of the resource, so the returned
/// buffer may be shorter than `header.total_size()` for a truncated file.
pub fn fetch_unit<P>(provider: &P, offset: u64) -> Result<(KlvHeader, Vec<u8>)>
where
    P: ResourceByteRangeProvider + ?Sized,
{
    let header = probe_header(provider, offset)?;
    let bytes = fetch_unit_with(provider, &header)?;
    Ok((header, bytes))
}

/// Fetch the whole unit described by an already probed `header`
pub fn fetch_unit_with<P>(provider: &P, header: &KlvHeader) -> Result<Vec<u8>>
where
    P: ResourceByteRangeProvider + ?Sized,
{
    let end = header
        .end_offset()
        .min(provider.resource_size())
        .saturating_sub(1);
    provider.byte_range_as_bytes(header.byte_offset, end)
}

/// A KLV triplet with an owned value
#[derive(Debug, Clone)]
pub struct Klv {
    /// Universal Label (key)
    pub key: UniversalLabel,
    /// Value data
    pub value: Vec<u8>,
}

impl Klv {
    /// Create new KLV
    pub fn new(key: UL, value: Vec<u8>) -> Self {
        Klv {
            key: UniversalLabel(key),
            value,
        }
    }

    /// Total size including key and length encoding
    pub fn total_size(&self) -> usize {
        KEY_FIELD_SIZE + ber_length_size(self.value.len() as u64) + self.value.len()
    }

    /// Write KLV to writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(self.key.as_bytes())?;

        let len_bytes = encode_ber_length(self.value.len() as u64);
        writer.write_all(&len_bytes)?;

        writer.write_all(&self.value)?;

        Ok(KEY_FIELD_SIZE + len_bytes.len() + self.value.len())
    }
}

/// Sequential KLV reader over an in-memory region of a resource
pub struct KlvReader<'a> {
    data: &'a [u8],
    position: usize,
    base_offset: u64,
}

impl<'a> KlvReader<'a> {
    /// Create a reader over `data`, which begins at absolute `base_offset`
    pub fn new(data: &'a [u8], base_offset: u64) -> Self {
        KlvReader {
            data,
            position: 0,
            base_offset,
        }
    }

    /// Current position relative to the start of the region
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current absolute offset
    pub fn offset(&self) -> u64 {
        self.base_offset + self.position as u64
    }

    /// Seek to a position relative to the start of the region
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    /// Check if there's more data
    pub fn has_more(&self) -> bool {
        self.position < self.data.len()
    }

    /// Peek at the next header without consuming it
    pub fn peek_header(&self) -> Result<Option<KlvHeader>> {
        if !self.has_more() {
            return Ok(None);
        }
        KlvHeader::decode(&self.data[self.position..], self.offset()).map(Some)
    }

    /// Read the next unit, returning its header and a borrowed value
    pub fn read_klv(&mut self) -> Result<Option<(KlvHeader, &'a [u8])>> {
        let header = match self.peek_header()? {
            Some(header) => header,
            None => return Ok(None),
        };

        let value_start = self.position + header.key_length_size as usize;
        let available = (self.data.len() - value_start) as u64;
        if header.value_size > available {
            return Err(MxfError::klv(
                header.byte_offset,
                format!(
                    "value of {} bytes runs past the end of the region ({} available)",
                    header.value_size, available
                ),
            ));
        }

        let value_end = value_start + header.value_size as usize;
        self.position = value_end;
        Ok(Some((header, &self.data[value_start..value_end])))
    }
}

/// Calculate minimal BER length encoding size
pub fn ber_length_size(length: u64) -> usize {
    if length < 0x80 {
        1
    } else {
        1 + significant_bytes(length)
    }
}

fn significant_bytes(length: u64) -> usize {
    (8 - (length.leading_zeros() / 8) as usize).max(1)
}

/// Encode length as minimal BER
pub fn encode_ber_length(length: u64) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    encode_ber_length_long(length, significant_bytes(length)).unwrap_or_default()
}

/// Encode length in long form with a fixed number of length bytes
///
/// MXF writers commonly use 4- or 8-byte lengths to allow in-place
/// rewriting. Returns `None` if `length` does not fit or `bytes` is not in
/// `1..=8`.
pub fn encode_ber_length_long(length: u64, bytes: usize) -> Option<Vec<u8>> {
    if !(1..=8).contains(&bytes) || significant_bytes(length) > bytes {
        return None;
    }
    let mut out = Vec::with_capacity(1 + bytes);
    out.push(0x80 | bytes as u8);
    out.extend_from_slice(&length.to_be_bytes()[8 - bytes..]);
    Some(out)
}

/// Decode a BER length from bytes
///
/// Returns the decoded length and the size of the length field. `offset` is
/// the absolute offset of the length field, used for error reporting.
pub fn decode_ber_length(data: &[u8], offset: u64) -> Result<(u64, usize)> {
    let first_byte = *data
        .first()
        .ok_or_else(|| MxfError::klv(offset, "no data for length field"))?;

    if first_byte < 0x80 {
        return Ok((first_byte as u64, 1));
    }

    let num_bytes = (first_byte & 0x7F) as usize;
    if num_bytes == 0 {
        return Err(MxfError::klv(
            offset,
            "long-form length declares zero length bytes",
        ));
    }
    if num_bytes > 8 {
        return Err(MxfError::klv(
            offset,
            format!("long-form length declares {} length bytes", num_bytes),
        ));
    }
    if data.len() < 1 + num_bytes {
        return Err(MxfError::klv(
            offset,
            format!(
                "need {} length bytes, have {}",
                num_bytes,
                data.len() - 1
            ),
        ));
    }

    let length = data[1..=num_bytes]
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | *byte as u64);

    Ok((length, 1 + num_bytes))
}

/// One entry of a local set: a 2-byte tag and its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSetEntry<'a> {
    /// Local tag
    pub tag: u16,
    /// Raw value bytes
    pub value: &'a [u8],
    /// Absolute offset of the tag
    pub byte_offset: u64,
}

/// Split a local set value into its (tag, length, value) entries
pub fn read_local_set(data: &[u8], base_offset: u64) -> Result<Vec<LocalSetEntry<'_>>> {
    let mut entries = Vec::new();
    let mut position = 0usize;

    while position < data.len() {
        let offset = base_offset + position as u64;
        if data.len() - position < 4 {
            return Err(MxfError::klv(offset, "truncated local set entry header"));
        }

        let mut cursor = Cursor::new(&data[position..]);
        let tag = cursor.read_u16::<BigEndian>()?;
        let length = cursor.read_u16::<BigEndian>()? as usize;

        let start = position + 4;
        if start + length > data.len() {
            return Err(MxfError::klv(
                offset,
                format!(
                    "local tag {:04x} declares {} bytes, {} available",
                    tag,
                    length,
                    data.len() - start
                ),
            ));
        }

        entries.push(LocalSetEntry {
            tag,
            value: &data[start..start + length],
            byte_offset: offset,
        });
        position = start + length;
    }

    Ok(entries)
}

/// Write a local set entry (2-byte tag, 2-byte length)
pub fn write_local_set<W: Write>(writer: &mut W, tag: u16, value: &[u8]) -> Result<usize> {
    writer.write_u16::<BigEndian>(tag)?;
    writer.write_u16::<BigEndian>(value.len() as u16)?;
    writer.write_all(value)?;
    Ok(4 + value.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_range::MemoryByteRangeProvider;

    const KEY: UL = [0x06, 0x0E, 0x2B, 0x34, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

    #[test]
    fn test_ber_length_short() {
        let encoded = encode_ber_length(100);
        assert_eq!(encoded, vec![100]);

        let (decoded, size) = decode_ber_length(&encoded, 0).unwrap();
        assert_eq!(decoded, 100);
        assert_eq!(size, 1);
    }

    #[test]
    fn test_ber_length_long() {
        let encoded = encode_ber_length(1000);
        assert_eq!(encoded, vec![0x82, 0x03, 0xE8]);

        let (decoded, size) = decode_ber_length(&encoded, 0).unwrap();
        assert_eq!(decoded, 1000);
        assert_eq!(size, 3);
    }

    #[test]
    fn test_ber_length_fixed_width() {
        let encoded = encode_ber_length_long(0x1234, 8).unwrap();
        assert_eq!(encoded.len(), 9);
        assert_eq!(encoded[0], 0x88);
        assert_eq!(decode_ber_length(&encoded, 0).unwrap(), (0x1234, 9));

        assert!(encode_ber_length_long(0x1_0000, 2).is_none());
        assert!(encode_ber_length_long(1, 9).is_none());
    }

    #[test]
    fn test_ber_length_invalid() {
        // long form with no length bytes
        let err = decode_ber_length(&[0x80], 40).unwrap_err();
        assert!(matches!(err, MxfError::MalformedKlv { offset: 40, .. }));

        // more than eight length bytes
        assert!(decode_ber_length(&[0x89, 0, 0, 0, 0, 0, 0, 0, 0, 1], 0).is_err());

        // truncated long form
        assert!(decode_ber_length(&[0x83, 0x01], 0).is_err());

        assert!(decode_ber_length(&[], 0).is_err());
    }

    #[test]
    fn test_header_decode() {
        let mut data = KEY.to_vec();
        data.extend_from_slice(&[0x83, 0x00, 0x01, 0x00]);
        let header = KlvHeader::decode(&data, 500).unwrap();

        assert_eq!(header.key, UniversalLabel(KEY));
        assert_eq!(header.key_length_size, 20);
        assert_eq!(header.length_field_size(), 4);
        assert_eq!(header.value_size, 256);
        assert_eq!(header.total_size(), 276);
        assert_eq!(header.value_offset(), 520);
        assert_eq!(header.end_offset(), 776);
    }

    #[test]
    fn test_header_decode_short_key() {
        let err = KlvHeader::decode(&KEY[..10], 7).unwrap_err();
        assert!(matches!(err, MxfError::MalformedKlv { offset: 7, .. }));
    }

    #[test]
    fn test_klv_write() {
        let klv = Klv::new(KEY, vec![1, 2, 3, 4]);

        let mut buffer = Vec::new();
        let size = klv.write(&mut buffer).unwrap();

        assert_eq!(size, 16 + 1 + 4);
        assert_eq!(size, klv.total_size());
        assert_eq!(buffer[16], 4);
        assert_eq!(&buffer[17..21], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_klv_reader() {
        let mut data = Vec::new();
        Klv::new(KEY, vec![0xAA, 0xBB, 0xCC]).write(&mut data).unwrap();
        Klv::new(KEY, vec![0u8; 200]).write(&mut data).unwrap();

        let mut reader = KlvReader::new(&data, 1000);
        let (first, value) = reader.read_klv().unwrap().unwrap();
        assert_eq!(first.byte_offset, 1000);
        assert_eq!(value, &[0xAA, 0xBB, 0xCC]);

        let (second, value) = reader.read_klv().unwrap().unwrap();
        assert_eq!(second.byte_offset, 1020);
        assert_eq!(second.length_field_size(), 2);
        assert_eq!(value.len(), 200);

        assert!(reader.read_klv().unwrap().is_none());
    }

    #[test]
    fn test_klv_reader_truncated_value() {
        let mut data = KEY.to_vec();
        data.push(10);
        data.extend_from_slice(&[1, 2, 3]);

        let mut reader = KlvReader::new(&data, 0);
        assert!(matches!(
            reader.read_klv(),
            Err(MxfError::MalformedKlv { offset: 0, .. })
        ));
    }

    #[test]
    fn test_probe_and_fetch_unit() {
        let mut data = vec![0u8; 8];
        Klv::new(KEY, vec![7u8; 300]).write(&mut data).unwrap();
        let provider = MemoryByteRangeProvider::new(data);

        let header = probe_header(&provider, 8).unwrap();
        assert_eq!(header.value_size, 300);

        let (header, bytes) = fetch_unit(&provider, 8).unwrap();
        assert_eq!(bytes.len() as u64, header.total_size());
    }

    #[test]
    fn test_fetch_unit_clamps_to_resource_end() {
        let mut data = KEY.to_vec();
        data.push(50);
        data.extend_from_slice(&[1u8; 10]);
        let provider = MemoryByteRangeProvider::new(data);

        let (header, bytes) = fetch_unit(&provider, 0).unwrap();
        assert_eq!(header.value_size, 50);
        assert_eq!(bytes.len(), 27);
    }

    #[test]
    fn test_probe_near_end() {
        // header shorter than the probe window, at the very end of the resource
        let mut data = KEY.to_vec();
        data.push(0);
        let provider = MemoryByteRangeProvider::new(data);
        let header = probe_header(&provider, 0).unwrap();
        assert_eq!(header.total_size(), 17);

        assert!(matches!(
            probe_header(&provider, 17),
            Err(MxfError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_local_set() {
        let mut buffer = Vec::new();
        write_local_set(&mut buffer, 0x1234, &[1, 2, 3]).unwrap();
        write_local_set(&mut buffer, 0x3C0A, &[9; 16]).unwrap();

        let entries = read_local_set(&buffer, 100).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tag, 0x1234);
        assert_eq!(entries[0].value, &[1, 2, 3]);
        assert_eq!(entries[1].byte_offset, 107);
    }

    #[test]
    fn test_local_set_overrun() {
        let buffer = [0x12, 0x34, 0x00, 0x10, 0x01];
        assert!(read_local_set(&buffer, 0).is_err());
    }
}
