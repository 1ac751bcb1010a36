//! Synthetic IMF track file writer for integration tests
//!
//! Produces a header partition with metadata, one body partition carrying a
//! single essence element, a footer partition and a random index pack.
//! Options break individual rules so tests can check what gets reported.

#![allow(dead_code)]

use imf_mxf::klv::{write_local_set, Klv};
use imf_mxf::ul::{elements, labels, UniversalLabel, UL};
use imf_mxf::{
    ByteRange, MemoryByteRangeProvider, MxfError, PartitionKind, PartitionPack,
    PartitionStatus, PrimerPack, RandomIndexPack, ResourceByteRangeProvider, RipEntry, Umid,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use uuid::Uuid;

pub const TRACK_FILE_ID: Uuid = Uuid::from_u128(0x5f1e_0000_4a2b_4c3d_8e9f_0123_4567_89ab);
pub const PREFACE: Uuid = Uuid::from_u128(0x01);
pub const CONTENT_STORAGE: Uuid = Uuid::from_u128(0x02);
pub const MATERIAL_PACKAGE: Uuid = Uuid::from_u128(0x03);
pub const SOURCE_PACKAGE: Uuid = Uuid::from_u128(0x04);
pub const MATERIAL_TRACK: Uuid = Uuid::from_u128(0x05);
pub const SOURCE_TRACK: Uuid = Uuid::from_u128(0x06);
pub const ESSENCE_CONTAINER_DATA: Uuid = Uuid::from_u128(0x07);
pub const DESCRIPTOR: Uuid = Uuid::from_u128(0x08);
pub const J2K_SUB_DESCRIPTOR: Uuid = Uuid::from_u128(0x09);
pub const SECOND_MATERIAL_PACKAGE: Uuid = Uuid::from_u128(0x0A);
pub const MISSING: Uuid = Uuid::from_u128(0xDEAD);

/// Local tag that the primer never maps
pub const UNMAPPED_TAG: u16 = 0xFF01;

const ESSENCE_ELEMENT: UL = [
    0x06, 0x0E, 0x2B, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x01, 0x15, 0x01, 0x08,
    0x01,
];

/// What to write, and which rules to break
#[derive(Debug, Clone)]
pub struct TrackFileOptions {
    pub edit_rate: (i32, i32),
    pub sample_rate: Option<(i32, i32)>,
    pub header_status: PartitionStatus,
    pub header_body_sid: u32,
    pub operational_pattern: UL,
    pub second_material_package: bool,
    pub dangling_sub_descriptor: bool,
    pub unknown_property: bool,
    pub footer_metadata: bool,
    pub write_rip: bool,
    /// Essence bytes stored in the header partition after its metadata
    pub header_essence: usize,
    /// Write the header metadata size into the header partition pack
    pub declare_header_byte_count: bool,
}

impl Default for TrackFileOptions {
    fn default() -> Self {
        TrackFileOptions {
            edit_rate: (24, 1),
            sample_rate: Some((24, 1)),
            header_status: PartitionStatus::ClosedComplete,
            header_body_sid: 0,
            operational_pattern: labels::OP1A,
            second_material_package: false,
            dangling_sub_descriptor: false,
            unknown_property: false,
            footer_metadata: false,
            write_rip: true,
            header_essence: 0,
            declare_header_byte_count: true,
        }
    }
}

fn primer() -> PrimerPack {
    let mut primer = PrimerPack::new();
    for (tag, ul) in [
        (0x3C0A, elements::INSTANCE_UID),
        (0x3B03, elements::CONTENT_STORAGE),
        (0x3B09, elements::OPERATIONAL_PATTERN),
        (0x3B0A, elements::ESSENCE_CONTAINERS),
        (0x1901, elements::PACKAGES),
        (0x1902, elements::ESSENCE_CONTAINER_DATA),
        (0x2701, elements::LINKED_PACKAGE_UID),
        (0x3F06, elements::INDEX_SID),
        (0x3F07, elements::BODY_SID),
        (0x4401, elements::PACKAGE_UID),
        (0x4403, elements::TRACKS),
        (0x4701, elements::DESCRIPTOR),
        (0x4801, elements::TRACK_ID),
        (0x4804, elements::TRACK_NUMBER),
        (0x4B01, elements::EDIT_RATE),
        (0x3001, elements::SAMPLE_RATE),
        (0x3004, elements::ESSENCE_CONTAINER),
        (0x3203, elements::STORED_WIDTH),
        (0x3202, elements::STORED_HEIGHT),
        (0x8001, elements::SUB_DESCRIPTORS),
        (0x8002, elements::J2K_RSIZ),
        (0x8003, elements::J2K_XSIZ),
        (0x8004, elements::J2K_YSIZ),
    ] {
        primer.add(tag, ul);
    }
    primer
}

fn batch(items: &[&[u8]], item_size: u32) -> Vec<u8> {
    let mut out = (items.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(&item_size.to_be_bytes());
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

fn refs(ids: &[Uuid]) -> Vec<u8> {
    let items: Vec<&[u8]> = ids.iter().map(|id| id.as_bytes().as_slice()).collect();
    batch(&items, 16)
}

fn rational(num: i32, den: i32) -> Vec<u8> {
    let mut out = num.to_be_bytes().to_vec();
    out.extend_from_slice(&den.to_be_bytes());
    out
}

fn set(key: UL, uid: Uuid, props: Vec<(u16, Vec<u8>)>) -> Vec<u8> {
    let mut value = Vec::new();
    write_local_set(&mut value, 0x3C0A, uid.as_bytes()).unwrap();
    for (tag, v) in &props {
        write_local_set(&mut value, *tag, v).unwrap();
    }
    let mut out = Vec::new();
    Klv::new(key, value).write(&mut out).unwrap();
    out
}

fn umid(material: Uuid) -> Vec<u8> {
    Umid::from_material_number(material).0.to_vec()
}

/// Primer pack followed by the metadata sets
pub fn header_metadata(options: &TrackFileOptions) -> Vec<u8> {
    let mut out = Vec::new();
    primer().write(&mut out).unwrap();

    let mut packages = vec![MATERIAL_PACKAGE, SOURCE_PACKAGE];
    if options.second_material_package {
        packages.push(SECOND_MATERIAL_PACKAGE);
    }
    let (rate_num, rate_den) = options.edit_rate;

    out.extend(set(
        labels::PREFACE,
        PREFACE,
        vec![
            (0x3B03, CONTENT_STORAGE.as_bytes().to_vec()),
            (0x3B09, options.operational_pattern.to_vec()),
            (0x3B0A, batch(&[&labels::ESSENCE_JPEG2000], 16)),
        ],
    ));
    out.extend(set(
        labels::CONTENT_STORAGE,
        CONTENT_STORAGE,
        vec![
            (0x1901, refs(&packages)),
            (0x1902, refs(&[ESSENCE_CONTAINER_DATA])),
        ],
    ));
    out.extend(set(
        labels::ESSENCE_CONTAINER_DATA,
        ESSENCE_CONTAINER_DATA,
        vec![
            (0x2701, umid(TRACK_FILE_ID)),
            (0x3F06, 0u32.to_be_bytes().to_vec()),
            (0x3F07, 1u32.to_be_bytes().to_vec()),
        ],
    ));
    out.extend(set(
        labels::MATERIAL_PACKAGE,
        MATERIAL_PACKAGE,
        vec![
            (0x4401, umid(Uuid::from_u128(0xAA))),
            (0x4403, refs(&[MATERIAL_TRACK])),
        ],
    ));
    if options.second_material_package {
        out.extend(set(
            labels::MATERIAL_PACKAGE,
            SECOND_MATERIAL_PACKAGE,
            vec![(0x4401, umid(Uuid::from_u128(0xBB))), (0x4403, refs(&[]))],
        ));
    }
    out.extend(set(
        labels::TIMELINE_TRACK,
        MATERIAL_TRACK,
        vec![
            (0x4801, 1u32.to_be_bytes().to_vec()),
            (0x4804, 0u32.to_be_bytes().to_vec()),
            (0x4B01, rational(rate_num, rate_den)),
        ],
    ));
    out.extend(set(
        labels::SOURCE_PACKAGE,
        SOURCE_PACKAGE,
        vec![
            (0x4401, umid(TRACK_FILE_ID)),
            (0x4403, refs(&[SOURCE_TRACK])),
            (0x4701, DESCRIPTOR.as_bytes().to_vec()),
        ],
    ));
    out.extend(set(
        labels::TIMELINE_TRACK,
        SOURCE_TRACK,
        vec![
            (0x4801, 2u32.to_be_bytes().to_vec()),
            (0x4804, 0x1501_0801u32.to_be_bytes().to_vec()),
            (0x4B01, rational(rate_num, rate_den)),
        ],
    ));

    let sub_descriptor = if options.dangling_sub_descriptor {
        MISSING
    } else {
        J2K_SUB_DESCRIPTOR
    };
    let mut descriptor = vec![
        (0x3004, labels::ESSENCE_JPEG2000.to_vec()),
        (0x3203, 1920u32.to_be_bytes().to_vec()),
        (0x3202, 1080u32.to_be_bytes().to_vec()),
        (0x8001, refs(&[sub_descriptor])),
    ];
    if let Some((num, den)) = options.sample_rate {
        descriptor.push((0x3001, rational(num, den)));
    }
    if options.unknown_property {
        descriptor.push((UNMAPPED_TAG, vec![0xCA, 0xFE]));
    }
    out.extend(set(labels::RGBA_DESCRIPTOR, DESCRIPTOR, descriptor));
    out.extend(set(
        labels::JPEG2000_SUB_DESCRIPTOR,
        J2K_SUB_DESCRIPTOR,
        vec![
            (0x8002, 0x0307u16.to_be_bytes().to_vec()),
            (0x8003, 1920u32.to_be_bytes().to_vec()),
            (0x8004, 1080u32.to_be_bytes().to_vec()),
        ],
    ));
    out
}

fn pack(kind: PartitionKind, status: PartitionStatus, options: &TrackFileOptions) -> PartitionPack {
    let mut pack = PartitionPack::new(kind, status);
    pack.operational_pattern = UniversalLabel(options.operational_pattern);
    pack.add_essence_container(UniversalLabel(labels::ESSENCE_JPEG2000));
    pack
}

fn written_len(pack: &PartitionPack) -> u64 {
    let mut out = Vec::new();
    pack.write(&mut out).unwrap() as u64
}

/// Write a complete track file
pub fn track_file(options: &TrackFileOptions) -> Vec<u8> {
    let metadata = header_metadata(options);
    let mut essence = Vec::new();
    Klv::new(ESSENCE_ELEMENT, vec![0xFF, 0x4F, 0xFF, 0x51, 0, 0, 0, 0])
        .write(&mut essence)
        .unwrap();
    let mut header_essence = Vec::new();
    if options.header_essence > 0 {
        Klv::new(ESSENCE_ELEMENT, vec![0x5A; options.header_essence])
            .write(&mut header_essence)
            .unwrap();
    }

    let mut header = pack(PartitionKind::Header, options.header_status, options);
    if options.declare_header_byte_count {
        header.header_byte_count = metadata.len() as u64;
    }
    header.body_sid = options.header_body_sid;

    let mut body = pack(PartitionKind::Body, PartitionStatus::ClosedComplete, options);
    body.body_sid = 1;

    let mut footer = pack(PartitionKind::Footer, PartitionStatus::ClosedComplete, options);
    if options.footer_metadata {
        footer.header_byte_count = metadata.len() as u64;
    }

    let body_offset =
        written_len(&header) + metadata.len() as u64 + header_essence.len() as u64;
    let footer_offset = body_offset + written_len(&body) + essence.len() as u64;

    header.footer_partition = footer_offset;
    body.this_partition = body_offset;
    body.footer_partition = footer_offset;
    footer.this_partition = footer_offset;
    footer.previous_partition = body_offset;
    footer.footer_partition = footer_offset;

    let mut out = Vec::new();
    header.write(&mut out).unwrap();
    out.extend_from_slice(&metadata);
    out.extend_from_slice(&header_essence);
    body.write(&mut out).unwrap();
    out.extend_from_slice(&essence);
    footer.write(&mut out).unwrap();
    if options.footer_metadata {
        out.extend_from_slice(&metadata);
    }

    if options.write_rip {
        let entries = [
            RipEntry {
                body_sid: header.body_sid,
                byte_offset: 0,
            },
            RipEntry {
                body_sid: 1,
                byte_offset: body_offset,
            },
            RipEntry {
                body_sid: 0,
                byte_offset: footer_offset,
            },
        ];
        RandomIndexPack::write(&entries, &mut out).unwrap();
    }
    out
}

/// In-memory provider that counts the ranges it serves and records the
/// largest one
pub struct CountingProvider {
    inner: MemoryByteRangeProvider,
    fetches: AtomicUsize,
    largest: AtomicU64,
}

impl CountingProvider {
    pub fn new(bytes: Vec<u8>) -> Self {
        CountingProvider {
            inner: MemoryByteRangeProvider::new(bytes),
            fetches: AtomicUsize::new(0),
            largest: AtomicU64::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn largest_fetch(&self) -> u64 {
        self.largest.load(Ordering::SeqCst)
    }
}

impl ResourceByteRangeProvider for CountingProvider {
    fn resource_size(&self) -> u64 {
        self.inner.resource_size()
    }

    fn byte_range(&self, start: u64, end_inclusive: u64) -> Result<ByteRange, MxfError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let len = end_inclusive.saturating_sub(start).saturating_add(1);
        self.largest.fetch_max(len, Ordering::SeqCst);
        self.inner.byte_range(start, end_inclusive)
    }
}
