//! Header metadata sets
//!
//! Each metadata KLV in a header partition is a local set: a sequence of
//! (local tag, length, value) properties whose tags resolve to labels through
//! the primer pack. [`InterchangeObject::decode`] keeps every property by
//! label so nothing is lost, and additionally decodes the sets this crate
//! understands into typed [`MetadataSet`] variants. Sets with an unrecognized
//! key are kept as [`MetadataSet::Unknown`].
//!
//! Objects refer to each other only by instance UID; the header partition
//! owns every object and resolves references by lookup.

use crate::error::{MxfError, Result};
use crate::klv::{read_local_set, KlvHeader};
use crate::primer::PrimerPack;
use crate::types::{
    decode_bool, decode_int, decode_timestamp, decode_u32, decode_uint, decode_ul,
    decode_ul_batch, decode_umid, decode_utf16, decode_uuid, decode_uuid_batch, decode_rational,
    MxfTimestamp, Umid,
};
use crate::ul::{elements, labels, UniversalLabel, UL};
use imf_core::Rational;
use serde::Serialize;
use uuid::Uuid;

/// One property of a local set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Local tag as written in the file
    pub tag: u16,
    /// Label resolved through the primer, if the primer lists the tag
    pub ul: Option<UniversalLabel>,
    /// Raw value bytes
    pub value: Vec<u8>,
    /// Absolute offset of the property's tag
    pub byte_offset: u64,
}

/// Kind of a generic package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PackageKind {
    Material,
    Source,
}

/// Kind of a track set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackKind {
    Timeline,
    Static,
    Event,
}

/// Essence descriptor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DescriptorKind {
    File,
    GenericPicture,
    Cdci,
    Rgba,
    GenericSound,
    GenericData,
    Multiple,
    Aes3Audio,
    WaveAudio,
}

impl DescriptorKind {
    fn from_key(key: &UniversalLabel) -> Option<Self> {
        const KEYS: &[(UL, DescriptorKind)] = &[
            (labels::FILE_DESCRIPTOR, DescriptorKind::File),
            (labels::GENERIC_PICTURE_DESCRIPTOR, DescriptorKind::GenericPicture),
            (labels::CDCI_DESCRIPTOR, DescriptorKind::Cdci),
            (labels::RGBA_DESCRIPTOR, DescriptorKind::Rgba),
            (labels::GENERIC_SOUND_DESCRIPTOR, DescriptorKind::GenericSound),
            (labels::GENERIC_DATA_DESCRIPTOR, DescriptorKind::GenericData),
            (labels::MULTIPLE_DESCRIPTOR, DescriptorKind::Multiple),
            (labels::AES3_AUDIO_DESCRIPTOR, DescriptorKind::Aes3Audio),
            (labels::WAVE_AUDIO_DESCRIPTOR, DescriptorKind::WaveAudio),
        ];
        KEYS.iter()
            .find(|(ul, _)| key.matches(ul))
            .map(|(_, kind)| *kind)
    }
}

/// Sub-descriptor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubDescriptorKind {
    Jpeg2000Picture,
    AudioChannelLabel,
    SoundfieldGroupLabel,
    GroupOfSoundfieldGroupsLabel,
}

impl SubDescriptorKind {
    fn from_key(key: &UniversalLabel) -> Option<Self> {
        const KEYS: &[(UL, SubDescriptorKind)] = &[
            (labels::JPEG2000_SUB_DESCRIPTOR, SubDescriptorKind::Jpeg2000Picture),
            (
                labels::AUDIO_CHANNEL_LABEL_SUB_DESCRIPTOR,
                SubDescriptorKind::AudioChannelLabel,
            ),
            (
                labels::SOUNDFIELD_GROUP_LABEL_SUB_DESCRIPTOR,
                SubDescriptorKind::SoundfieldGroupLabel,
            ),
            (
                labels::GROUP_OF_SOUNDFIELD_GROUPS_LABEL_SUB_DESCRIPTOR,
                SubDescriptorKind::GroupOfSoundfieldGroupsLabel,
            ),
        ];
        KEYS.iter()
            .find(|(ul, _)| key.matches(ul))
            .map(|(_, kind)| *kind)
    }
}

/// Preface: root of the header metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preface {
    pub last_modified_date: Option<MxfTimestamp>,
    pub version: Option<u64>,
    pub identifications: Vec<Uuid>,
    pub content_storage: Option<Uuid>,
    pub operational_pattern: Option<UniversalLabel>,
    pub essence_containers: Vec<UniversalLabel>,
    pub dm_schemes: Vec<UniversalLabel>,
    /// Weak reference to the primary package
    pub primary_package: Option<Uuid>,
}

/// Identification of the application that wrote the file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Identification {
    pub this_generation_uid: Option<Uuid>,
    pub company_name: Option<String>,
    pub product_name: Option<String>,
    pub version_string: Option<String>,
    pub product_uid: Option<Uuid>,
    pub modification_date: Option<MxfTimestamp>,
}

/// Content storage: owns packages and essence container data
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentStorage {
    pub packages: Vec<Uuid>,
    pub essence_container_data: Vec<Uuid>,
}

/// Link between a file package and its essence container
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EssenceContainerData {
    pub linked_package_uid: Option<Umid>,
    pub index_sid: Option<u32>,
    pub body_sid: Option<u32>,
}

/// Material or source package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericPackage {
    pub kind: PackageKind,
    pub package_uid: Option<Umid>,
    pub name: Option<String>,
    pub creation_date: Option<MxfTimestamp>,
    pub modified_date: Option<MxfTimestamp>,
    pub tracks: Vec<Uuid>,
    /// Essence descriptor (source packages only)
    pub descriptor: Option<Uuid>,
}

/// Timeline, static or event track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub kind: TrackKind,
    pub track_id: Option<u32>,
    /// Non-zero for tracks that carry essence
    pub track_number: Option<u32>,
    pub name: Option<String>,
    pub sequence: Option<Uuid>,
    pub edit_rate: Option<Rational>,
    pub origin: Option<i64>,
}

/// Ordered list of structural components
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sequence {
    pub data_definition: Option<UniversalLabel>,
    pub duration: Option<i64>,
    pub structural_components: Vec<Uuid>,
}

/// Reference into a source package track
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceClip {
    pub data_definition: Option<UniversalLabel>,
    pub duration: Option<i64>,
    pub start_position: Option<i64>,
    pub source_package_id: Option<Umid>,
    pub source_track_id: Option<u32>,
}

/// Timecode track component
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimecodeComponent {
    pub duration: Option<i64>,
    pub rounded_timecode_base: Option<u64>,
    pub start_timecode: Option<i64>,
    pub drop_frame: Option<bool>,
}

/// Essence descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EssenceDescriptor {
    pub kind: DescriptorKind,
    pub linked_track_id: Option<u32>,
    pub sample_rate: Option<Rational>,
    pub container_duration: Option<i64>,
    pub essence_container: Option<UniversalLabel>,
    pub codec: Option<UniversalLabel>,
    pub locators: Vec<Uuid>,
    /// Sub-descriptors in reference order
    pub sub_descriptors: Vec<Uuid>,
    /// Child descriptors of a multiple descriptor
    pub file_descriptors: Vec<Uuid>,
}

/// Sub-descriptor hanging off an essence descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubDescriptor {
    pub kind: SubDescriptorKind,
    /// Nested sub-descriptors, if any
    pub sub_descriptors: Vec<Uuid>,
}

/// Typed view of a metadata set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MetadataSet {
    Preface(Preface),
    Identification(Identification),
    ContentStorage(ContentStorage),
    EssenceContainerData(EssenceContainerData),
    Package(GenericPackage),
    Track(Track),
    Sequence(Sequence),
    SourceClip(SourceClip),
    TimecodeComponent(TimecodeComponent),
    EssenceDescriptor(EssenceDescriptor),
    SubDescriptor(SubDescriptor),
    /// Set with an unrecognized key, kept opaquely
    Unknown,
}

impl MetadataSet {
    /// Short name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            MetadataSet::Preface(_) => "Preface",
            MetadataSet::Identification(_) => "Identification",
            MetadataSet::ContentStorage(_) => "ContentStorage",
            MetadataSet::EssenceContainerData(_) => "EssenceContainerData",
            MetadataSet::Package(p) => match p.kind {
                PackageKind::Material => "MaterialPackage",
                PackageKind::Source => "SourcePackage",
            },
            MetadataSet::Track(_) => "Track",
            MetadataSet::Sequence(_) => "Sequence",
            MetadataSet::SourceClip(_) => "SourceClip",
            MetadataSet::TimecodeComponent(_) => "TimecodeComponent",
            MetadataSet::EssenceDescriptor(_) => "EssenceDescriptor",
            MetadataSet::SubDescriptor(_) => "SubDescriptor",
            MetadataSet::Unknown => "Unknown",
        }
    }
}

/// One decoded metadata set
#[derive(Debug, Clone)]
pub struct InterchangeObject {
    /// Header of the set's KLV unit
    pub header: KlvHeader,
    /// Instance UID (nil for unknown sets that carry none)
    pub instance_uid: Uuid,
    /// All properties in file order
    pub properties: Vec<Property>,
    /// Typed view
    pub set: MetadataSet,
}

impl InterchangeObject {
    /// Decode a local set value, resolving tags through `primer`
    pub fn decode(header: &KlvHeader, value: &[u8], primer: &PrimerPack) -> Result<Self> {
        let properties: Vec<Property> = read_local_set(value, header.value_offset())?
            .into_iter()
            .map(|entry| {
                let ul = primer.lookup(entry.tag).copied();
                if ul.is_none() {
                    tracing::warn!(
                        offset = entry.byte_offset,
                        tag = entry.tag,
                        "Local tag missing from primer"
                    );
                }
                Property {
                    tag: entry.tag,
                    ul,
                    value: entry.value.to_vec(),
                    byte_offset: entry.byte_offset,
                }
            })
            .collect();

        let view = Properties(&properties);
        let set = decode_set(&header.key, &view)?;

        let instance_uid = match view.get(&elements::INSTANCE_UID) {
            Some(p) => decode_uuid(&p.value, p.byte_offset)?,
            None if matches!(set, MetadataSet::Unknown) => Uuid::nil(),
            None => {
                return Err(MxfError::klv(
                    header.byte_offset,
                    format!("{} set has no InstanceUID", set.name()),
                ))
            }
        };

        Ok(InterchangeObject {
            header: *header,
            instance_uid,
            properties,
            set,
        })
    }

    /// Property with the given label, ignoring the version byte
    pub fn property(&self, ul: &UL) -> Option<&Property> {
        Properties(&self.properties).get(ul)
    }

    /// Absolute offset of the set's key
    pub fn byte_offset(&self) -> u64 {
        self.header.byte_offset
    }

    /// Instance UIDs this set owns through strong references, in property order
    pub fn strong_references(&self) -> Vec<Uuid> {
        match &self.set {
            MetadataSet::Preface(p) => p
                .identifications
                .iter()
                .chain(p.content_storage.iter())
                .copied()
                .collect(),
            MetadataSet::ContentStorage(c) => c
                .packages
                .iter()
                .chain(c.essence_container_data.iter())
                .copied()
                .collect(),
            MetadataSet::Package(p) => p.tracks.iter().chain(p.descriptor.iter()).copied().collect(),
            MetadataSet::Track(t) => t.sequence.iter().copied().collect(),
            MetadataSet::Sequence(s) => s.structural_components.clone(),
            MetadataSet::EssenceDescriptor(d) => d
                .locators
                .iter()
                .chain(d.sub_descriptors.iter())
                .chain(d.file_descriptors.iter())
                .copied()
                .collect(),
            MetadataSet::SubDescriptor(s) => s.sub_descriptors.clone(),
            MetadataSet::Identification(_)
            | MetadataSet::EssenceContainerData(_)
            | MetadataSet::SourceClip(_)
            | MetadataSet::TimecodeComponent(_)
            | MetadataSet::Unknown => Vec::new(),
        }
    }

    /// The essence descriptor view, if this is one
    pub fn as_descriptor(&self) -> Option<&EssenceDescriptor> {
        match &self.set {
            MetadataSet::EssenceDescriptor(d) => Some(d),
            _ => None,
        }
    }

    /// The package view, if this is one
    pub fn as_package(&self) -> Option<&GenericPackage> {
        match &self.set {
            MetadataSet::Package(p) => Some(p),
            _ => None,
        }
    }

    /// The track view, if this is one
    pub fn as_track(&self) -> Option<&Track> {
        match &self.set {
            MetadataSet::Track(t) => Some(t),
            _ => None,
        }
    }
}

struct Properties<'a>(&'a [Property]);

impl<'a> Properties<'a> {
    fn get(&self, ul: &UL) -> Option<&'a Property> {
        self.0
            .iter()
            .find(|p| p.ul.map(|u| u.matches(ul)).unwrap_or(false))
    }

    fn decode<T>(&self, ul: &UL, f: fn(&[u8], u64) -> Result<T>) -> Result<Option<T>> {
        self.get(ul).map(|p| f(&p.value, p.byte_offset)).transpose()
    }

    fn refs(&self, ul: &UL) -> Result<Vec<Uuid>> {
        Ok(self.decode(ul, decode_uuid_batch)?.unwrap_or_default())
    }

    fn labels(&self, ul: &UL) -> Result<Vec<UniversalLabel>> {
        Ok(self.decode(ul, decode_ul_batch)?.unwrap_or_default())
    }
}

fn decode_set(key: &UniversalLabel, p: &Properties<'_>) -> Result<MetadataSet> {
    if let Some(kind) = DescriptorKind::from_key(key) {
        return Ok(MetadataSet::EssenceDescriptor(EssenceDescriptor {
            kind,
            linked_track_id: p.decode(&elements::LINKED_TRACK_ID, decode_u32)?,
            sample_rate: p.decode(&elements::SAMPLE_RATE, decode_rational)?,
            container_duration: p.decode(&elements::CONTAINER_DURATION, decode_int)?,
            essence_container: p.decode(&elements::ESSENCE_CONTAINER, decode_ul)?,
            codec: p.decode(&elements::CODEC, decode_ul)?,
            locators: p.refs(&elements::LOCATORS)?,
            sub_descriptors: p.refs(&elements::SUB_DESCRIPTORS)?,
            file_descriptors: p.refs(&elements::FILE_DESCRIPTORS)?,
        }));
    }
    if let Some(kind) = SubDescriptorKind::from_key(key) {
        return Ok(MetadataSet::SubDescriptor(SubDescriptor {
            kind,
            sub_descriptors: p.refs(&elements::SUB_DESCRIPTORS)?,
        }));
    }

    let track_kind = if key.matches(&labels::TIMELINE_TRACK) {
        Some(TrackKind::Timeline)
    } else if key.matches(&labels::STATIC_TRACK) {
        Some(TrackKind::Static)
    } else if key.matches(&labels::EVENT_TRACK) {
        Some(TrackKind::Event)
    } else {
        None
    };
    if let Some(kind) = track_kind {
        return Ok(MetadataSet::Track(Track {
            kind,
            track_id: p.decode(&elements::TRACK_ID, decode_u32)?,
            track_number: p.decode(&elements::TRACK_NUMBER, decode_u32)?,
            name: p.decode(&elements::TRACK_NAME, decode_utf16)?,
            sequence: p.decode(&elements::TRACK_SEQUENCE, decode_uuid)?,
            edit_rate: p.decode(&elements::EDIT_RATE, decode_rational)?,
            origin: p.decode(&elements::ORIGIN, decode_int)?,
        }));
    }

    let package_kind = if key.matches(&labels::MATERIAL_PACKAGE) {
        Some(PackageKind::Material)
    } else if key.matches(&labels::SOURCE_PACKAGE) {
        Some(PackageKind::Source)
    } else {
        None
    };
    if let Some(kind) = package_kind {
        return Ok(MetadataSet::Package(GenericPackage {
            kind,
            package_uid: p.decode(&elements::PACKAGE_UID, decode_umid)?,
            name: p.decode(&elements::PACKAGE_NAME, decode_utf16)?,
            creation_date: p.decode(&elements::PACKAGE_CREATION_DATE, decode_timestamp)?,
            modified_date: p.decode(&elements::PACKAGE_MODIFIED_DATE, decode_timestamp)?,
            tracks: p.refs(&elements::TRACKS)?,
            descriptor: match kind {
                PackageKind::Source => p.decode(&elements::DESCRIPTOR, decode_uuid)?,
                PackageKind::Material => None,
            },
        }));
    }

    let set = if key.matches(&labels::PREFACE) {
        MetadataSet::Preface(Preface {
            last_modified_date: p.decode(&elements::LAST_MODIFIED_DATE, decode_timestamp)?,
            version: p.decode(&elements::VERSION, decode_uint)?,
            identifications: p.refs(&elements::IDENTIFICATIONS)?,
            content_storage: p.decode(&elements::CONTENT_STORAGE, decode_uuid)?,
            operational_pattern: p.decode(&elements::OPERATIONAL_PATTERN, decode_ul)?,
            essence_containers: p.labels(&elements::ESSENCE_CONTAINERS)?,
            dm_schemes: p.labels(&elements::DM_SCHEMES)?,
            primary_package: p.decode(&elements::PRIMARY_PACKAGE, decode_uuid)?,
        })
    } else if key.matches(&labels::IDENTIFICATION) {
        MetadataSet::Identification(Identification {
            this_generation_uid: p.decode(&elements::THIS_GENERATION_UID, decode_uuid)?,
            company_name: p.decode(&elements::COMPANY_NAME, decode_utf16)?,
            product_name: p.decode(&elements::PRODUCT_NAME, decode_utf16)?,
            version_string: p.decode(&elements::VERSION_STRING, decode_utf16)?,
            product_uid: p.decode(&elements::PRODUCT_UID, decode_uuid)?,
            modification_date: p.decode(&elements::MODIFICATION_DATE, decode_timestamp)?,
        })
    } else if key.matches(&labels::CONTENT_STORAGE) {
        MetadataSet::ContentStorage(ContentStorage {
            packages: p.refs(&elements::PACKAGES)?,
            essence_container_data: p.refs(&elements::ESSENCE_CONTAINER_DATA)?,
        })
    } else if key.matches(&labels::ESSENCE_CONTAINER_DATA) {
        MetadataSet::EssenceContainerData(EssenceContainerData {
            linked_package_uid: p.decode(&elements::LINKED_PACKAGE_UID, decode_umid)?,
            index_sid: p.decode(&elements::INDEX_SID, decode_u32)?,
            body_sid: p.decode(&elements::BODY_SID, decode_u32)?,
        })
    } else if key.matches(&labels::SEQUENCE) {
        MetadataSet::Sequence(Sequence {
            data_definition: p.decode(&elements::DATA_DEFINITION, decode_ul)?,
            duration: p.decode(&elements::DURATION, decode_int)?,
            structural_components: p.refs(&elements::STRUCTURAL_COMPONENTS)?,
        })
    } else if key.matches(&labels::SOURCE_CLIP) {
        MetadataSet::SourceClip(SourceClip {
            data_definition: p.decode(&elements::DATA_DEFINITION, decode_ul)?,
            duration: p.decode(&elements::DURATION, decode_int)?,
            start_position: p.decode(&elements::START_POSITION, decode_int)?,
            source_package_id: p.decode(&elements::SOURCE_PACKAGE_ID, decode_umid)?,
            source_track_id: p.decode(&elements::SOURCE_TRACK_ID, decode_u32)?,
        })
    } else if key.matches(&labels::TIMECODE_COMPONENT) {
        MetadataSet::TimecodeComponent(TimecodeComponent {
            duration: p.decode(&elements::DURATION, decode_int)?,
            rounded_timecode_base: p.decode(&elements::ROUNDED_TIMECODE_BASE, decode_uint)?,
            start_timecode: p.decode(&elements::START_TIMECODE, decode_int)?,
            drop_frame: p.decode(&elements::DROP_FRAME, decode_bool)?,
        })
    } else {
        tracing::debug!(key = %key, "Keeping unrecognized metadata set");
        MetadataSet::Unknown
    };
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klv::write_local_set;

    fn primer() -> PrimerPack {
        let mut primer = PrimerPack::new();
        primer.add(0x3C0A, elements::INSTANCE_UID);
        primer.add(0x3001, elements::SAMPLE_RATE);
        primer.add(0x3004, elements::ESSENCE_CONTAINER);
        primer.add(0x8001, elements::SUB_DESCRIPTORS);
        primer.add(0x4801, elements::TRACK_ID);
        primer.add(0x4B01, elements::EDIT_RATE);
        primer
    }

    fn header(key: UL, value: &[u8]) -> KlvHeader {
        KlvHeader {
            key: UniversalLabel(key),
            key_length_size: 20,
            value_size: value.len() as u64,
            byte_offset: 1000,
        }
    }

    fn refs(ids: &[Uuid]) -> Vec<u8> {
        let mut out = (ids.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(&16u32.to_be_bytes());
        for id in ids {
            out.extend_from_slice(id.as_bytes());
        }
        out
    }

    #[test]
    fn test_decode_descriptor() {
        let uid = Uuid::new_v4();
        let sub = Uuid::new_v4();
        let mut value = Vec::new();
        write_local_set(&mut value, 0x3C0A, uid.as_bytes()).unwrap();
        write_local_set(&mut value, 0x3001, &[0, 0, 0, 24, 0, 0, 0, 1]).unwrap();
        write_local_set(&mut value, 0x3004, &labels::ESSENCE_JPEG2000).unwrap();
        write_local_set(&mut value, 0x8001, &refs(&[sub])).unwrap();
        write_local_set(&mut value, 0x7777, &[1, 2]).unwrap();

        let obj = InterchangeObject::decode(&header(labels::RGBA_DESCRIPTOR, &value), &value, &primer())
            .unwrap();
        assert_eq!(obj.instance_uid, uid);
        assert_eq!(obj.properties.len(), 5);
        assert!(obj.properties[4].ul.is_none());
        assert_eq!(obj.properties[0].byte_offset, 1020);

        let descriptor = obj.as_descriptor().unwrap();
        assert_eq!(descriptor.kind, DescriptorKind::Rgba);
        assert_eq!(descriptor.sample_rate, Some(Rational::new(24, 1)));
        assert_eq!(
            descriptor.essence_container,
            Some(UniversalLabel(labels::ESSENCE_JPEG2000))
        );
        assert_eq!(obj.strong_references(), vec![sub]);
    }

    #[test]
    fn test_decode_track() {
        let mut value = Vec::new();
        write_local_set(&mut value, 0x3C0A, Uuid::new_v4().as_bytes()).unwrap();
        write_local_set(&mut value, 0x4801, &2u32.to_be_bytes()).unwrap();
        write_local_set(&mut value, 0x4B01, &[0, 0, 0xBB, 0x80, 0, 0, 0, 1]).unwrap();

        let obj = InterchangeObject::decode(&header(labels::TIMELINE_TRACK, &value), &value, &primer())
            .unwrap();
        let track = obj.as_track().unwrap();
        assert_eq!(track.kind, TrackKind::Timeline);
        assert_eq!(track.track_id, Some(2));
        assert_eq!(track.edit_rate, Some(Rational::new(48000, 1)));
        assert!(track.sequence.is_none());
    }

    #[test]
    fn test_unknown_set_kept() {
        let key = labels::set_key(0x7F);
        let mut value = Vec::new();
        write_local_set(&mut value, 0x9000, &[0xAB]).unwrap();

        let obj = InterchangeObject::decode(&header(key, &value), &value, &primer()).unwrap();
        assert_eq!(obj.set, MetadataSet::Unknown);
        assert!(obj.instance_uid.is_nil());
        assert_eq!(obj.properties[0].value, vec![0xAB]);
    }

    #[test]
    fn test_known_set_requires_instance_uid() {
        let mut value = Vec::new();
        write_local_set(&mut value, 0x4801, &1u32.to_be_bytes()).unwrap();
        let err = InterchangeObject::decode(&header(labels::TIMELINE_TRACK, &value), &value, &primer())
            .unwrap_err();
        assert!(matches!(err, MxfError::MalformedKlv { offset: 1000, .. }));
    }

    #[test]
    fn test_bad_property_value_reports_offset() {
        let mut value = Vec::new();
        write_local_set(&mut value, 0x3C0A, Uuid::new_v4().as_bytes()).unwrap();
        write_local_set(&mut value, 0x3001, &[0, 0, 0, 24]).unwrap();

        let err =
            InterchangeObject::decode(&header(labels::CDCI_DESCRIPTOR, &value), &value, &primer())
                .unwrap_err();
        // second property starts after the 20-byte InstanceUID entry
        assert!(matches!(err, MxfError::MalformedKlv { offset: 1040, .. }));
    }
}
