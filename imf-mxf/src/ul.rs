//! Universal Label (UL) types for MXF
//!
//! Universal Labels are 16-byte identifiers defined by SMPTE for
//! identifying all elements in MXF files. Byte 8 of a label is a registry
//! version number; labels are compared with that byte masked out.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 16-byte Universal Label
pub type UL = [u8; 16];

const VERSION_BYTE: usize = 7;

/// Universal Label wrapper with helper methods
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniversalLabel(pub UL);

impl UniversalLabel {
    /// Create from raw bytes
    pub fn new(bytes: UL) -> Self {
        UniversalLabel(bytes)
    }

    /// Create from the first 16 bytes of a slice
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let ul: UL = bytes.get(..16)?.try_into().ok()?;
        Some(UniversalLabel(ul))
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &UL {
        &self.0
    }

    /// Check if this is a SMPTE-registered label (starts with 06 0E 2B 34)
    pub fn is_smpte(&self) -> bool {
        self.0[0..4] == labels::SMPTE_PREFIX
    }

    /// Get the category code (byte 5)
    pub fn category(&self) -> u8 {
        self.0[4]
    }

    /// Get version (byte 8)
    pub fn version(&self) -> u8 {
        self.0[VERSION_BYTE]
    }

    /// Compare with another label, ignoring the version byte
    pub fn matches(&self, other: &UL) -> bool {
        self.0
            .iter()
            .zip(other.iter())
            .enumerate()
            .all(|(i, (a, b))| i == VERSION_BYTE || a == b)
    }

    /// Copy of this label with the version byte zeroed
    pub fn normalized(&self) -> UniversalLabel {
        let mut ul = self.0;
        ul[VERSION_BYTE] = 0;
        UniversalLabel(ul)
    }

    /// Check if this is a partition pack
    pub fn is_partition_pack(&self) -> bool {
        // Primer pack has byte 14 = 0x05, so exclude it
        masked_prefix_eq(&self.0, &labels::PARTITION_PACK_BASE, 13)
            && (0x02..=0x04).contains(&self.0[13])
    }

    /// Check if this is a primer pack
    pub fn is_primer_pack(&self) -> bool {
        self.matches(&labels::PRIMER_PACK)
    }

    /// Check if this is a fill item
    pub fn is_fill_item(&self) -> bool {
        masked_prefix_eq(&self.0, &labels::FILL_ITEM, 13)
    }

    /// Check if this is an index table segment
    pub fn is_index_table_segment(&self) -> bool {
        self.matches(&labels::INDEX_TABLE_SEGMENT)
    }

    /// Check if this is the random index pack
    pub fn is_random_index_pack(&self) -> bool {
        self.matches(&labels::RANDOM_INDEX_PACK)
    }

    /// Check if this is essence data
    pub fn is_essence(&self) -> bool {
        // Essence elements have category 01
        self.is_smpte() && self.0[4] == 0x01 && !self.is_fill_item()
    }

    /// Check if this is a metadata set
    pub fn is_metadata(&self) -> bool {
        // Local sets have category 02
        self.is_smpte()
            && self.0[4] == 0x02
            && self.0[5] == 0x53
            && !self.is_index_table_segment()
    }

    /// Get kind description
    pub fn kind(&self) -> LabelKind {
        if self.is_partition_pack() {
            LabelKind::PartitionPack
        } else if self.is_primer_pack() {
            LabelKind::PrimerPack
        } else if self.is_fill_item() {
            LabelKind::FillItem
        } else if self.is_index_table_segment() {
            LabelKind::IndexTable
        } else if self.is_random_index_pack() {
            LabelKind::RandomIndexPack
        } else if self.is_essence() {
            LabelKind::EssenceElement
        } else if self.is_metadata() {
            LabelKind::MetadataSet
        } else {
            LabelKind::Unknown
        }
    }

    /// Human-readable name for well-known labels
    pub fn name(&self) -> &'static str {
        labels::lookup_name(&self.0)
    }

    /// Format as a `urn:smpte:ul:` URN
    pub fn to_urn(&self) -> String {
        let hex: Vec<String> = self
            .0
            .chunks(4)
            .map(|c| c.iter().map(|b| format!("{:02x}", b)).collect())
            .collect();
        format!("urn:smpte:ul:{}", hex.join("."))
    }

    /// Parse a `urn:smpte:ul:` URN or a bare dotted/undotted hex label
    pub fn parse_urn(value: &str) -> Option<Self> {
        let bare = value.trim().strip_prefix("urn:smpte:ul:").unwrap_or(value.trim());
        let digits: String = bare.chars().filter(|c| *c != '.').collect();
        if digits.len() != 32 {
            return None;
        }
        let mut ul = [0u8; 16];
        for (i, byte) in ul.iter_mut().enumerate() {
            *byte = u8::from_str_radix(digits.get(i * 2..i * 2 + 2)?, 16).ok()?;
        }
        Some(UniversalLabel(ul))
    }
}

fn masked_prefix_eq(a: &UL, b: &UL, len: usize) -> bool {
    (0..len).all(|i| i == VERSION_BYTE || a[i] == b[i])
}

impl fmt::Debug for UniversalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UL({:02x}.{:02x}.{:02x}.{:02x}.{:02x}.{:02x}.{:02x}.{:02x}.\
             {:02x}.{:02x}.{:02x}.{:02x}.{:02x}.{:02x}.{:02x}.{:02x})",
            self.0[0],
            self.0[1],
            self.0[2],
            self.0[3],
            self.0[4],
            self.0[5],
            self.0[6],
            self.0[7],
            self.0[8],
            self.0[9],
            self.0[10],
            self.0[11],
            self.0[12],
            self.0[13],
            self.0[14],
            self.0[15]
        )
    }
}

impl fmt::Display for UniversalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_urn())
    }
}

impl From<UL> for UniversalLabel {
    fn from(bytes: UL) -> Self {
        UniversalLabel(bytes)
    }
}

impl From<&[u8; 16]> for UniversalLabel {
    fn from(bytes: &[u8; 16]) -> Self {
        UniversalLabel(*bytes)
    }
}

impl Serialize for UniversalLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_urn())
    }
}

impl<'de> Deserialize<'de> for UniversalLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        UniversalLabel::parse_urn(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid universal label: {}", text)))
    }
}

/// Kind of Universal Label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Partition pack
    PartitionPack,
    /// Primer pack
    PrimerPack,
    /// Fill item (KLV fill)
    FillItem,
    /// Essence element
    EssenceElement,
    /// Metadata set
    MetadataSet,
    /// Index table
    IndexTable,
    /// Random index pack
    RandomIndexPack,
    /// Unknown
    Unknown,
}

/// Well-known Universal Labels
pub mod labels {
    use super::UL;

    /// SMPTE Label prefix
    pub const SMPTE_PREFIX: [u8; 4] = [0x06, 0x0E, 0x2B, 0x34];

    /// Partition pack base (bytes 14 and 15 vary)
    pub const PARTITION_PACK_BASE: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Primer pack
    pub const PRIMER_PACK: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x05, 0x01,
        0x00,
    ];

    /// Fill item
    pub const FILL_ITEM: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x02, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Index table segment
    pub const INDEX_TABLE_SEGMENT: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x10, 0x01,
        0x00,
    ];

    /// Random index pack
    pub const RANDOM_INDEX_PACK: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x11, 0x01,
        0x00,
    ];

    /// Operational pattern 1A (byte 15 carries qualifier bits)
    pub const OP1A: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x01, 0x09,
        0x00,
    ];

    /// Build a metadata set key from its set-specific byte
    pub const fn set_key(id: u8) -> UL {
        [
            0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, id,
            0x00,
        ]
    }

    // Structural metadata sets

    pub const PREFACE: UL = set_key(0x2F);
    pub const IDENTIFICATION: UL = set_key(0x30);
    pub const CONTENT_STORAGE: UL = set_key(0x18);
    pub const ESSENCE_CONTAINER_DATA: UL = set_key(0x23);
    pub const MATERIAL_PACKAGE: UL = set_key(0x36);
    pub const SOURCE_PACKAGE: UL = set_key(0x37);
    pub const EVENT_TRACK: UL = set_key(0x39);
    pub const STATIC_TRACK: UL = set_key(0x3A);
    pub const TIMELINE_TRACK: UL = set_key(0x3B);
    pub const SEQUENCE: UL = set_key(0x0F);
    pub const SOURCE_CLIP: UL = set_key(0x11);
    pub const TIMECODE_COMPONENT: UL = set_key(0x14);

    // Essence descriptors

    pub const FILE_DESCRIPTOR: UL = set_key(0x25);
    pub const GENERIC_PICTURE_DESCRIPTOR: UL = set_key(0x27);
    pub const CDCI_DESCRIPTOR: UL = set_key(0x28);
    pub const RGBA_DESCRIPTOR: UL = set_key(0x29);
    pub const GENERIC_SOUND_DESCRIPTOR: UL = set_key(0x42);
    pub const GENERIC_DATA_DESCRIPTOR: UL = set_key(0x43);
    pub const MULTIPLE_DESCRIPTOR: UL = set_key(0x44);
    pub const AES3_AUDIO_DESCRIPTOR: UL = set_key(0x47);
    pub const WAVE_AUDIO_DESCRIPTOR: UL = set_key(0x48);

    // Sub-descriptors

    pub const JPEG2000_SUB_DESCRIPTOR: UL = set_key(0x5A);
    pub const AUDIO_CHANNEL_LABEL_SUB_DESCRIPTOR: UL = set_key(0x6B);
    pub const SOUNDFIELD_GROUP_LABEL_SUB_DESCRIPTOR: UL = set_key(0x6C);
    pub const GROUP_OF_SOUNDFIELD_GROUPS_LABEL_SUB_DESCRIPTOR: UL = set_key(0x6D);

    // Essence container labels

    /// JPEG 2000 frame-wrapped
    pub const ESSENCE_JPEG2000: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x07, 0x0D, 0x01, 0x03, 0x01, 0x02, 0x0C, 0x01,
        0x00,
    ];

    /// Broadcast wave clip-wrapped
    pub const ESSENCE_WAVE_CLIP: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x01, 0x02, 0x06, 0x02,
        0x00,
    ];

    /// Uncompressed picture
    pub const ESSENCE_UNCOMPRESSED: UL = [
        0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x01, 0x02, 0x05, 0x00,
        0x00,
    ];

    /// Lookup human-readable name for a UL
    pub fn lookup_name(ul: &UL) -> &'static str {
        let label = super::UniversalLabel(*ul);

        // Check primer pack first (before partition packs, as they share bytes 0..13)
        if label.is_primer_pack() {
            return "Primer Pack";
        }

        if label.is_partition_pack() {
            return match ul[13..15] {
                [0x02, 0x01] => "Header Partition (Open Incomplete)",
                [0x02, 0x02] => "Header Partition (Closed Incomplete)",
                [0x02, 0x03] => "Header Partition (Open Complete)",
                [0x02, 0x04] => "Header Partition (Closed Complete)",
                [0x03, _] => "Body Partition",
                [0x04, _] => "Footer Partition",
                _ => "Partition Pack (Unknown)",
            };
        }

        if label.is_fill_item() {
            return "Fill Item";
        }
        if label.is_index_table_segment() {
            return "Index Table Segment";
        }
        if label.is_random_index_pack() {
            return "Random Index Pack";
        }

        const NAMED: &[(UL, &str)] = &[
            (PREFACE, "Preface"),
            (IDENTIFICATION, "Identification"),
            (CONTENT_STORAGE, "Content Storage"),
            (ESSENCE_CONTAINER_DATA, "Essence Container Data"),
            (MATERIAL_PACKAGE, "Material Package"),
            (SOURCE_PACKAGE, "Source Package"),
            (EVENT_TRACK, "Event Track"),
            (STATIC_TRACK, "Static Track"),
            (TIMELINE_TRACK, "Timeline Track"),
            (SEQUENCE, "Sequence"),
            (SOURCE_CLIP, "Source Clip"),
            (TIMECODE_COMPONENT, "Timecode Component"),
            (FILE_DESCRIPTOR, "File Descriptor"),
            (GENERIC_PICTURE_DESCRIPTOR, "Generic Picture Essence Descriptor"),
            (CDCI_DESCRIPTOR, "CDCI Descriptor"),
            (RGBA_DESCRIPTOR, "RGBA Descriptor"),
            (GENERIC_SOUND_DESCRIPTOR, "Generic Sound Essence Descriptor"),
            (GENERIC_DATA_DESCRIPTOR, "Generic Data Essence Descriptor"),
            (MULTIPLE_DESCRIPTOR, "Multiple Descriptor"),
            (AES3_AUDIO_DESCRIPTOR, "AES3 Audio Descriptor"),
            (WAVE_AUDIO_DESCRIPTOR, "Wave Audio Descriptor"),
            (JPEG2000_SUB_DESCRIPTOR, "JPEG 2000 Picture Sub-Descriptor"),
            (AUDIO_CHANNEL_LABEL_SUB_DESCRIPTOR, "Audio Channel Label Sub-Descriptor"),
            (SOUNDFIELD_GROUP_LABEL_SUB_DESCRIPTOR, "Soundfield Group Label Sub-Descriptor"),
            (
                GROUP_OF_SOUNDFIELD_GROUPS_LABEL_SUB_DESCRIPTOR,
                "Group Of Soundfield Groups Label Sub-Descriptor",
            ),
        ];
        if let Some((_, name)) = NAMED.iter().find(|(known, _)| label.matches(known)) {
            return name;
        }

        if label.is_essence() {
            return "Essence Element";
        }
        if label.is_metadata() {
            return "Metadata Set";
        }

        "Unknown"
    }
}

/// Property (element) labels resolved through the primer pack
pub mod elements {
    use super::UL;

    const fn el(version: u8, tail: [u8; 8]) -> UL {
        [
            0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, version, tail[0], tail[1], tail[2], tail[3],
            tail[4], tail[5], tail[6], tail[7],
        ]
    }

    // InterchangeObject
    pub const INSTANCE_UID: UL = el(0x01, [0x01, 0x01, 0x15, 0x02, 0, 0, 0, 0]);
    pub const GENERATION_UID: UL = el(0x02, [0x05, 0x20, 0x07, 0x01, 0x08, 0, 0, 0]);

    // Preface
    pub const LAST_MODIFIED_DATE: UL = el(0x02, [0x07, 0x02, 0x01, 0x10, 0x02, 0x04, 0, 0]);
    pub const VERSION: UL = el(0x02, [0x03, 0x01, 0x02, 0x01, 0x05, 0, 0, 0]);
    pub const IDENTIFICATIONS: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x06, 0x04, 0, 0]);
    pub const CONTENT_STORAGE: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x02, 0x01, 0, 0]);
    pub const OPERATIONAL_PATTERN: UL = el(0x05, [0x01, 0x02, 0x02, 0x03, 0, 0, 0, 0]);
    pub const ESSENCE_CONTAINERS: UL = el(0x05, [0x01, 0x02, 0x02, 0x10, 0x02, 0x01, 0, 0]);
    pub const DM_SCHEMES: UL = el(0x05, [0x01, 0x02, 0x02, 0x10, 0x02, 0x02, 0, 0]);
    pub const PRIMARY_PACKAGE: UL = el(0x04, [0x06, 0x01, 0x01, 0x04, 0x01, 0x08, 0, 0]);

    // Identification
    pub const THIS_GENERATION_UID: UL = el(0x02, [0x05, 0x20, 0x07, 0x01, 0x01, 0, 0, 0]);
    pub const COMPANY_NAME: UL = el(0x02, [0x05, 0x20, 0x07, 0x01, 0x02, 0x01, 0, 0]);
    pub const PRODUCT_NAME: UL = el(0x02, [0x05, 0x20, 0x07, 0x01, 0x03, 0x01, 0, 0]);
    pub const VERSION_STRING: UL = el(0x02, [0x05, 0x20, 0x07, 0x01, 0x05, 0x01, 0, 0]);
    pub const PRODUCT_UID: UL = el(0x02, [0x05, 0x20, 0x07, 0x01, 0x07, 0, 0, 0]);
    pub const MODIFICATION_DATE: UL = el(0x02, [0x07, 0x02, 0x01, 0x10, 0x02, 0x03, 0, 0]);

    // ContentStorage
    pub const PACKAGES: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x05, 0x01, 0, 0]);
    pub const ESSENCE_CONTAINER_DATA: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x05, 0x02, 0, 0]);

    // EssenceContainerData
    pub const LINKED_PACKAGE_UID: UL = el(0x02, [0x06, 0x01, 0x01, 0x06, 0x01, 0, 0, 0]);
    pub const INDEX_SID: UL = el(0x04, [0x01, 0x03, 0x04, 0x05, 0, 0, 0, 0]);
    pub const BODY_SID: UL = el(0x04, [0x01, 0x03, 0x04, 0x04, 0, 0, 0, 0]);

    // GenericPackage
    pub const PACKAGE_UID: UL = el(0x01, [0x01, 0x01, 0x15, 0x10, 0, 0, 0, 0]);
    pub const PACKAGE_NAME: UL = el(0x01, [0x01, 0x03, 0x03, 0x02, 0x01, 0, 0, 0]);
    pub const PACKAGE_CREATION_DATE: UL = el(0x02, [0x07, 0x02, 0x01, 0x10, 0x01, 0x03, 0, 0]);
    pub const PACKAGE_MODIFIED_DATE: UL = el(0x02, [0x07, 0x02, 0x01, 0x10, 0x02, 0x05, 0, 0]);
    pub const TRACKS: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x06, 0x05, 0, 0]);
    pub const DESCRIPTOR: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x02, 0x03, 0, 0]);

    // Track
    pub const TRACK_ID: UL = el(0x02, [0x01, 0x07, 0x01, 0x01, 0, 0, 0, 0]);
    pub const TRACK_NUMBER: UL = el(0x02, [0x01, 0x04, 0x01, 0x03, 0, 0, 0, 0]);
    pub const TRACK_NAME: UL = el(0x02, [0x01, 0x07, 0x01, 0x02, 0x01, 0, 0, 0]);
    pub const TRACK_SEQUENCE: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x02, 0x04, 0, 0]);
    pub const EDIT_RATE: UL = el(0x02, [0x05, 0x30, 0x04, 0x05, 0, 0, 0, 0]);
    pub const ORIGIN: UL = el(0x02, [0x07, 0x02, 0x01, 0x03, 0x01, 0x03, 0, 0]);

    // StructuralComponent
    pub const DATA_DEFINITION: UL = el(0x02, [0x04, 0x07, 0x01, 0, 0, 0, 0, 0]);
    pub const DURATION: UL = el(0x02, [0x07, 0x02, 0x02, 0x01, 0x01, 0, 0, 0]);

    // Sequence
    pub const STRUCTURAL_COMPONENTS: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x06, 0x09, 0, 0]);

    // SourceClip
    pub const START_POSITION: UL = el(0x02, [0x07, 0x02, 0x01, 0x03, 0x01, 0x04, 0, 0]);
    pub const SOURCE_PACKAGE_ID: UL = el(0x02, [0x06, 0x01, 0x01, 0x03, 0x01, 0, 0, 0]);
    pub const SOURCE_TRACK_ID: UL = el(0x02, [0x06, 0x01, 0x01, 0x03, 0x02, 0, 0, 0]);

    // TimecodeComponent
    pub const ROUNDED_TIMECODE_BASE: UL = el(0x02, [0x04, 0x04, 0x01, 0x01, 0x02, 0x06, 0, 0]);
    pub const START_TIMECODE: UL = el(0x02, [0x07, 0x02, 0x01, 0x03, 0x01, 0x05, 0, 0]);
    pub const DROP_FRAME: UL = el(0x01, [0x04, 0x04, 0x01, 0x01, 0x05, 0, 0, 0]);

    // GenericDescriptor / FileDescriptor
    pub const LOCATORS: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x06, 0x03, 0, 0]);
    pub const SUB_DESCRIPTORS: UL = el(0x09, [0x06, 0x01, 0x01, 0x04, 0x06, 0x10, 0, 0]);
    pub const LINKED_TRACK_ID: UL = el(0x05, [0x06, 0x01, 0x01, 0x03, 0x05, 0, 0, 0]);
    pub const SAMPLE_RATE: UL = el(0x01, [0x04, 0x06, 0x01, 0x01, 0, 0, 0, 0]);
    pub const CONTAINER_DURATION: UL = el(0x01, [0x04, 0x06, 0x01, 0x02, 0, 0, 0, 0]);
    pub const ESSENCE_CONTAINER: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x01, 0x02, 0, 0]);
    pub const CODEC: UL = el(0x02, [0x06, 0x01, 0x01, 0x04, 0x01, 0x03, 0, 0]);

    // MultipleDescriptor
    pub const FILE_DESCRIPTORS: UL = el(0x04, [0x06, 0x01, 0x01, 0x04, 0x06, 0x0B, 0, 0]);

    // GenericPictureEssenceDescriptor
    pub const PICTURE_ESSENCE_CODING: UL = el(0x02, [0x04, 0x01, 0x06, 0x01, 0, 0, 0, 0]);
    pub const FRAME_LAYOUT: UL = el(0x01, [0x04, 0x01, 0x03, 0x01, 0x04, 0, 0, 0]);
    pub const STORED_WIDTH: UL = el(0x01, [0x04, 0x01, 0x05, 0x02, 0x02, 0, 0, 0]);
    pub const STORED_HEIGHT: UL = el(0x01, [0x04, 0x01, 0x05, 0x02, 0x01, 0, 0, 0]);
    pub const DISPLAY_WIDTH: UL = el(0x01, [0x04, 0x01, 0x05, 0x01, 0x0C, 0, 0, 0]);
    pub const DISPLAY_HEIGHT: UL = el(0x01, [0x04, 0x01, 0x05, 0x01, 0x0B, 0, 0, 0]);
    pub const ASPECT_RATIO: UL = el(0x01, [0x04, 0x01, 0x01, 0x01, 0x01, 0, 0, 0]);
    pub const TRANSFER_CHARACTERISTIC: UL = el(0x02, [0x04, 0x01, 0x02, 0x01, 0x01, 0x01, 0x02, 0]);
    pub const COLOR_PRIMARIES: UL = el(0x09, [0x04, 0x01, 0x02, 0x01, 0x01, 0x06, 0x01, 0]);
    pub const CODING_EQUATIONS: UL = el(0x02, [0x04, 0x01, 0x02, 0x01, 0x01, 0x03, 0x01, 0]);

    // CDCIDescriptor
    pub const COMPONENT_DEPTH: UL = el(0x02, [0x04, 0x01, 0x05, 0x03, 0x0A, 0, 0, 0]);
    pub const HORIZONTAL_SUBSAMPLING: UL = el(0x01, [0x04, 0x01, 0x05, 0x01, 0x05, 0, 0, 0]);
    pub const VERTICAL_SUBSAMPLING: UL = el(0x02, [0x04, 0x01, 0x05, 0x01, 0x10, 0, 0, 0]);
    pub const COLOR_SITING: UL = el(0x01, [0x04, 0x01, 0x05, 0x01, 0x06, 0, 0, 0]);

    // RGBADescriptor
    pub const COMPONENT_MAX_REF: UL = el(0x05, [0x04, 0x01, 0x05, 0x03, 0x0B, 0, 0, 0]);
    pub const COMPONENT_MIN_REF: UL = el(0x05, [0x04, 0x01, 0x05, 0x03, 0x0C, 0, 0, 0]);

    // GenericSoundEssenceDescriptor
    pub const AUDIO_SAMPLING_RATE: UL = el(0x05, [0x04, 0x02, 0x03, 0x01, 0x01, 0x01, 0, 0]);
    pub const LOCKED: UL = el(0x04, [0x04, 0x02, 0x03, 0x01, 0x04, 0, 0, 0]);
    pub const CHANNEL_COUNT: UL = el(0x05, [0x04, 0x02, 0x01, 0x01, 0x04, 0, 0, 0]);
    pub const QUANTIZATION_BITS: UL = el(0x04, [0x04, 0x02, 0x03, 0x03, 0x04, 0, 0, 0]);
    pub const SOUND_ESSENCE_CODING: UL = el(0x02, [0x04, 0x02, 0x04, 0x02, 0, 0, 0, 0]);

    // WaveAudioDescriptor
    pub const BLOCK_ALIGN: UL = el(0x05, [0x04, 0x02, 0x03, 0x02, 0x01, 0, 0, 0]);
    pub const AVERAGE_BYTES_PER_SECOND: UL = el(0x05, [0x04, 0x02, 0x03, 0x03, 0x05, 0, 0, 0]);
    pub const CHANNEL_ASSIGNMENT: UL = el(0x07, [0x04, 0x02, 0x01, 0x01, 0x05, 0, 0, 0]);

    // JPEG2000PictureSubDescriptor
    pub const J2K_RSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x01, 0, 0, 0]);
    pub const J2K_XSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x02, 0, 0, 0]);
    pub const J2K_YSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x03, 0, 0, 0]);
    pub const J2K_XOSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x04, 0, 0, 0]);
    pub const J2K_YOSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x05, 0, 0, 0]);
    pub const J2K_XTSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x06, 0, 0, 0]);
    pub const J2K_YTSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x07, 0, 0, 0]);
    pub const J2K_CSIZ: UL = el(0x0A, [0x04, 0x01, 0x06, 0x03, 0x0A, 0, 0, 0]);

    // MCALabelSubDescriptor
    pub const MCA_LABEL_DICTIONARY_ID: UL = el(0x0E, [0x01, 0x03, 0x07, 0x01, 0x01, 0, 0, 0]);
    pub const MCA_TAG_SYMBOL: UL = el(0x0E, [0x01, 0x03, 0x07, 0x01, 0x02, 0, 0, 0]);
    pub const MCA_TAG_NAME: UL = el(0x0E, [0x01, 0x03, 0x07, 0x01, 0x03, 0, 0, 0]);
    pub const MCA_LINK_ID: UL = el(0x0E, [0x01, 0x03, 0x07, 0x01, 0x05, 0, 0, 0]);
    pub const MCA_CHANNEL_ID: UL = el(0x0E, [0x01, 0x03, 0x04, 0x0A, 0, 0, 0, 0]);
    pub const SOUNDFIELD_GROUP_LINK_ID: UL = el(0x0E, [0x01, 0x03, 0x07, 0x01, 0x06, 0, 0, 0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal_label() {
        let ul = UniversalLabel::new(labels::PRIMER_PACK);
        assert!(ul.is_smpte());
        assert!(ul.is_primer_pack());
        assert!(!ul.is_partition_pack());
    }

    #[test]
    fn test_partition_detection() {
        let mut ul = labels::PARTITION_PACK_BASE;
        ul[13] = 0x02;
        ul[14] = 0x04;
        let ul = UniversalLabel::new(ul);
        assert!(ul.is_partition_pack());
        assert!(!ul.is_primer_pack());
        assert_eq!(ul.name(), "Header Partition (Closed Complete)");
    }

    #[test]
    fn test_label_kind() {
        assert_eq!(
            UniversalLabel::new(labels::PRIMER_PACK).kind(),
            LabelKind::PrimerPack
        );
        assert_eq!(
            UniversalLabel::new(labels::FILL_ITEM).kind(),
            LabelKind::FillItem
        );
        assert_eq!(
            UniversalLabel::new(labels::RANDOM_INDEX_PACK).kind(),
            LabelKind::RandomIndexPack
        );
        assert_eq!(
            UniversalLabel::new(labels::INDEX_TABLE_SEGMENT).kind(),
            LabelKind::IndexTable
        );
        assert_eq!(
            UniversalLabel::new(labels::CDCI_DESCRIPTOR).kind(),
            LabelKind::MetadataSet
        );
    }

    #[test]
    fn test_version_insensitive_match() {
        let mut fill_v1 = labels::FILL_ITEM;
        fill_v1[7] = 0x01;
        let fill_v1 = UniversalLabel::new(fill_v1);
        assert!(fill_v1.is_fill_item());
        assert!(fill_v1.matches(&labels::FILL_ITEM));
        assert_eq!(fill_v1.normalized(), UniversalLabel::new(labels::FILL_ITEM).normalized());

        let mut other = labels::FILL_ITEM;
        other[12] = 0x02;
        assert!(!fill_v1.matches(&other));
    }

    #[test]
    fn test_label_name_lookup() {
        assert_eq!(labels::lookup_name(&labels::PRIMER_PACK), "Primer Pack");
        assert_eq!(labels::lookup_name(&labels::PREFACE), "Preface");
        assert_eq!(
            labels::lookup_name(&labels::WAVE_AUDIO_DESCRIPTOR),
            "Wave Audio Descriptor"
        );
    }

    #[test]
    fn test_urn_round_trip() {
        let ul = UniversalLabel::new(labels::PREFACE);
        let urn = ul.to_urn();
        assert_eq!(urn, "urn:smpte:ul:060e2b34.02530101.0d010101.01012f00");
        assert_eq!(UniversalLabel::parse_urn(&urn), Some(ul));
        assert_eq!(UniversalLabel::parse_urn("urn:smpte:ul:0102"), None);
    }
}
