//! MXF value types and property value decoding
//!
//! Property values in local sets are raw big-endian byte strings whose
//! layout is implied by the property's label. The decoders here check the
//! exact size of each value and report the property's offset on mismatch.

use crate::error::{MxfError, Result};
use crate::ul::UniversalLabel;
use byteorder::{BigEndian, ReadBytesExt};
use imf_core::Rational;
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use uuid::Uuid;

/// SMPTE UMID (32-byte basic form)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Umid(pub [u8; 32]);

impl Umid {
    /// Create new UMID
    pub fn new(bytes: [u8; 32]) -> Self {
        Umid(bytes)
    }

    /// Build a UMID whose material number is `material`
    pub fn from_material_number(material: Uuid) -> Self {
        let mut bytes = [0u8; 32];

        // Bytes 0-11: Universal Label (SMPTE 330M)
        bytes[0..12].copy_from_slice(&[
            0x06, 0x0A, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x05, 0x01, 0x01, 0x0F, 0x20,
        ]);

        // Byte 12: Length (13h = remaining bytes)
        bytes[12] = 0x13;

        // Bytes 16-31: Material number
        bytes[16..32].copy_from_slice(material.as_bytes());

        Umid(bytes)
    }

    /// Check if this is a zero UMID
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The material number (bytes 17-32) as a UUID
    ///
    /// IMF uses the file package's material number as the track file id.
    pub fn material_number(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.0[16..32]);
        Uuid::from_bytes(bytes)
    }

    /// Format as a `urn:smpte:umid:` URN
    pub fn to_urn(&self) -> String {
        let groups: Vec<String> = self
            .0
            .chunks(4)
            .map(|c| c.iter().map(|b| format!("{:02x}", b)).collect())
            .collect();
        format!("urn:smpte:umid:{}", groups.join("."))
    }
}

impl fmt::Debug for Umid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UMID(")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 && i % 4 == 0 {
                write!(f, "-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Umid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_urn())
    }
}

impl Serialize for Umid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_urn())
    }
}

/// MXF timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MxfTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Fraction of a second in units of 4 ms
    pub quarter_msec: u8,
}

impl MxfTimestamp {
    /// Parse from 8-byte MXF format
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 8 {
            return None;
        }

        Some(MxfTimestamp {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day: bytes[3],
            hour: bytes[4],
            minute: bytes[5],
            second: bytes[6],
            quarter_msec: bytes[7],
        })
    }

    /// Convert to 8-byte MXF format
    pub fn to_bytes(&self) -> [u8; 8] {
        let year_bytes = self.year.to_be_bytes();
        [
            year_bytes[0],
            year_bytes[1],
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.quarter_msec,
        ]
    }
}

impl fmt::Display for MxfTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.quarter_msec as u32 * 4
        )
    }
}

impl Serialize for MxfTimestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn expect_len(value: &[u8], len: usize, offset: u64, what: &str) -> Result<()> {
    if value.len() != len {
        return Err(MxfError::klv(
            offset,
            format!("{} value must be {} bytes, found {}", what, len, value.len()),
        ));
    }
    Ok(())
}

/// Decode a 16-byte UUID
pub fn decode_uuid(value: &[u8], offset: u64) -> Result<Uuid> {
    expect_len(value, 16, offset, "UUID")?;
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(value);
    Ok(Uuid::from_bytes(bytes))
}

/// Decode a 16-byte Universal Label
pub fn decode_ul(value: &[u8], offset: u64) -> Result<UniversalLabel> {
    expect_len(value, 16, offset, "UL")?;
    UniversalLabel::from_slice(value).ok_or_else(|| MxfError::klv(offset, "short UL"))
}

/// Decode a 32-byte UMID
pub fn decode_umid(value: &[u8], offset: u64) -> Result<Umid> {
    expect_len(value, 32, offset, "UMID")?;
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(value);
    Ok(Umid(bytes))
}

/// Decode a big-endian unsigned integer of 1, 2, 4 or 8 bytes
pub fn decode_uint(value: &[u8], offset: u64) -> Result<u64> {
    let mut cursor = Cursor::new(value);
    let n = match value.len() {
        1 => cursor.read_u8()? as u64,
        2 => cursor.read_u16::<BigEndian>()? as u64,
        4 => cursor.read_u32::<BigEndian>()? as u64,
        8 => cursor.read_u64::<BigEndian>()?,
        len => {
            return Err(MxfError::klv(
                offset,
                format!("integer value of {} bytes", len),
            ))
        }
    };
    Ok(n)
}

/// Decode a big-endian unsigned 32-bit integer
pub fn decode_u32(value: &[u8], offset: u64) -> Result<u32> {
    expect_len(value, 4, offset, "UInt32")?;
    Ok(Cursor::new(value).read_u32::<BigEndian>()?)
}

/// Decode a big-endian signed integer of 1, 2, 4 or 8 bytes
pub fn decode_int(value: &[u8], offset: u64) -> Result<i64> {
    let mut cursor = Cursor::new(value);
    let n = match value.len() {
        1 => cursor.read_i8()? as i64,
        2 => cursor.read_i16::<BigEndian>()? as i64,
        4 => cursor.read_i32::<BigEndian>()? as i64,
        8 => cursor.read_i64::<BigEndian>()?,
        len => {
            return Err(MxfError::klv(
                offset,
                format!("integer value of {} bytes", len),
            ))
        }
    };
    Ok(n)
}

/// Decode a one-byte boolean
pub fn decode_bool(value: &[u8], offset: u64) -> Result<bool> {
    expect_len(value, 1, offset, "Boolean")?;
    Ok(value[0] != 0)
}

/// Decode a rational stored as two big-endian `i32`s
pub fn decode_rational(value: &[u8], offset: u64) -> Result<Rational> {
    expect_len(value, 8, offset, "Rational")?;
    let mut cursor = Cursor::new(value);
    let num = cursor.read_i32::<BigEndian>()? as i64;
    let den = cursor.read_i32::<BigEndian>()? as i64;
    Rational::try_new(num, den)
        .map_err(|_| MxfError::klv(offset, format!("rational {}/{} has a zero denominator", num, den)))
}

/// Decode a UTF-16BE string, dropping trailing NULs
pub fn decode_utf16(value: &[u8], offset: u64) -> Result<String> {
    if value.len() % 2 != 0 {
        return Err(MxfError::klv(offset, "UTF-16 string has an odd byte count"));
    }
    let units: Vec<u16> = value
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    let text = String::from_utf16(&units)
        .map_err(|_| MxfError::klv(offset, "invalid UTF-16 string"))?;
    Ok(text.trim_end_matches('\0').to_string())
}

/// Decode an 8-byte timestamp
pub fn decode_timestamp(value: &[u8], offset: u64) -> Result<MxfTimestamp> {
    MxfTimestamp::from_bytes(value).ok_or_else(|| {
        MxfError::klv(
            offset,
            format!("Timestamp value must be 8 bytes, found {}", value.len()),
        )
    })
}

/// Split a batch or array (count, item size, items) into its items
pub fn decode_batch(value: &[u8], offset: u64) -> Result<Vec<&[u8]>> {
    if value.len() < 8 {
        return Err(MxfError::klv(offset, "batch shorter than its 8-byte header"));
    }
    let mut cursor = Cursor::new(value);
    let count = cursor.read_u32::<BigEndian>()? as u64;
    let item_size = cursor.read_u32::<BigEndian>()? as u64;
    let available = value.len() as u64 - 8;
    if count * item_size != available {
        return Err(MxfError::klv(
            offset,
            format!(
                "batch of {} x {} bytes disagrees with {} value bytes",
                count, item_size, available
            ),
        ));
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    Ok(value[8..].chunks_exact(item_size as usize).collect())
}

/// Decode a batch of UUIDs (strong or weak reference array)
pub fn decode_uuid_batch(value: &[u8], offset: u64) -> Result<Vec<Uuid>> {
    decode_batch(value, offset)?
        .into_iter()
        .map(|item| decode_uuid(item, offset))
        .collect()
}

/// Decode a batch of Universal Labels
pub fn decode_ul_batch(value: &[u8], offset: u64) -> Result<Vec<UniversalLabel>> {
    decode_batch(value, offset)?
        .into_iter()
        .map(|item| decode_ul(item, offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(items: &[&[u8]]) -> Vec<u8> {
        let mut out = (items.len() as u32).to_be_bytes().to_vec();
        let size = items.first().map(|i| i.len()).unwrap_or(0) as u32;
        out.extend_from_slice(&size.to_be_bytes());
        for item in items {
            out.extend_from_slice(item);
        }
        out
    }

    #[test]
    fn test_umid_material_number() {
        let id = Uuid::new_v4();
        let umid = Umid::from_material_number(id);
        assert!(!umid.is_zero());
        assert_eq!(umid.material_number(), id);
        assert!(umid.to_urn().starts_with("urn:smpte:umid:060a2b34."));
    }

    #[test]
    fn test_timestamp() {
        let ts = MxfTimestamp {
            year: 2024,
            month: 6,
            day: 15,
            hour: 14,
            minute: 30,
            second: 45,
            quarter_msec: 50,
        };
        let parsed = MxfTimestamp::from_bytes(&ts.to_bytes()).unwrap();
        assert_eq!(parsed, ts);
        assert_eq!(ts.to_string(), "2024-06-15T14:30:45.200Z");
        assert!(MxfTimestamp::from_bytes(&[0u8; 7]).is_none());
    }

    #[test]
    fn test_integers() {
        assert_eq!(decode_uint(&[0x01, 0x00], 0).unwrap(), 256);
        assert_eq!(decode_int(&[0xFF, 0xFF, 0xFF, 0xFF], 0).unwrap(), -1);
        assert_eq!(decode_u32(&[0, 0, 0, 7], 0).unwrap(), 7);
        assert!(decode_uint(&[1, 2, 3], 9).is_err());
        assert!(decode_u32(&[0, 7], 0).is_err());
    }

    #[test]
    fn test_rational() {
        let mut value = 24000i32.to_be_bytes().to_vec();
        value.extend_from_slice(&1001i32.to_be_bytes());
        assert_eq!(decode_rational(&value, 0).unwrap(), Rational::new(24000, 1001));

        let zero_den = [0, 0, 0, 24, 0, 0, 0, 0];
        assert!(matches!(
            decode_rational(&zero_den, 12),
            Err(MxfError::MalformedKlv { offset: 12, .. })
        ));
    }

    #[test]
    fn test_utf16() {
        let value: Vec<u8> = "Main\0"
            .encode_utf16()
            .flat_map(|u| u.to_be_bytes())
            .collect();
        assert_eq!(decode_utf16(&value, 0).unwrap(), "Main");
        assert!(decode_utf16(&[0x00], 0).is_err());
    }

    #[test]
    fn test_batches() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let value = batch(&[a.as_bytes(), b.as_bytes()]);
        assert_eq!(decode_uuid_batch(&value, 0).unwrap(), vec![a, b]);

        assert!(decode_uuid_batch(&batch(&[]), 0).unwrap().is_empty());

        let mut short = value.clone();
        short.truncate(20);
        assert!(decode_uuid_batch(&short, 0).is_err());
    }
}
