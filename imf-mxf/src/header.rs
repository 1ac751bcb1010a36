//! Header partition: primer pack plus the resolved metadata graph
//!
//! The header partition owns every metadata object it decodes. Objects
//! reference each other by instance UID; references are checked once, when
//! the partition is parsed, and followed by lookup afterwards. A parsed
//! `HeaderPartition` is immutable and may be shared across threads.

use crate::error::{MxfError, Result};
use crate::klv::KlvReader;
use crate::metadata::{
    ContentStorage, EssenceContainerData, GenericPackage, InterchangeObject, MetadataSet,
    PackageKind, Preface, Track,
};
use crate::partition::PartitionPack;
use crate::primer::PrimerPack;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A package reached through a reference, discriminated by kind
#[derive(Debug, Clone, Copy)]
pub enum PackageRef<'a> {
    Source {
        object: &'a InterchangeObject,
        package: &'a GenericPackage,
    },
    Material {
        object: &'a InterchangeObject,
        package: &'a GenericPackage,
    },
}

impl<'a> PackageRef<'a> {
    fn new(object: &'a InterchangeObject, package: &'a GenericPackage) -> Self {
        match package.kind {
            PackageKind::Source => PackageRef::Source { object, package },
            PackageKind::Material => PackageRef::Material { object, package },
        }
    }

    /// The package's metadata object
    pub fn object(&self) -> &'a InterchangeObject {
        match self {
            PackageRef::Source { object, .. } | PackageRef::Material { object, .. } => object,
        }
    }

    /// The package fields
    pub fn package(&self) -> &'a GenericPackage {
        match self {
            PackageRef::Source { package, .. } | PackageRef::Material { package, .. } => package,
        }
    }

    /// True for a source package
    pub fn is_source(&self) -> bool {
        matches!(self, PackageRef::Source { .. })
    }
}

/// Parsed header partition
#[derive(Debug)]
pub struct HeaderPartition {
    partition_pack: PartitionPack,
    primer: PrimerPack,
    objects: Vec<InterchangeObject>,
    by_uid: HashMap<Uuid, usize>,
}

impl HeaderPartition {
    /// Parse a header partition from `bytes`, which start with the partition
    /// pack located at absolute offset `byte_offset`
    ///
    /// Metadata is read for `HeaderByteCount` bytes after the partition pack,
    /// or up to the first non-metadata unit when the count is zero.
    pub fn parse(bytes: &[u8], byte_offset: u64) -> Result<Self> {
        let mut reader = KlvReader::new(bytes, byte_offset);
        let (pack_header, pack_value) = reader.read_klv()?.ok_or_else(|| {
            MxfError::MalformedPartition {
                offset: byte_offset,
                message: "empty header partition".into(),
            }
        })?;
        let partition_pack = PartitionPack::parse(&pack_header, pack_value)?;

        let metadata_start = reader.position();
        let metadata_end = if partition_pack.header_byte_count == 0 {
            bytes.len()
        } else {
            let end = (metadata_start as u64).saturating_add(partition_pack.header_byte_count);
            if end > bytes.len() as u64 {
                return Err(MxfError::MalformedPartition {
                    offset: byte_offset,
                    message: format!(
                        "header byte count {} runs past the partition ({} bytes available)",
                        partition_pack.header_byte_count,
                        bytes.len() - metadata_start
                    ),
                });
            }
            end as usize
        };

        let region = &bytes[metadata_start..metadata_end];
        let mut reader = KlvReader::new(region, byte_offset + metadata_start as u64);

        let mut primer = None;
        while let Some((header, value)) = reader.read_klv()? {
            if header.key.is_fill_item() {
                continue;
            }
            if !header.key.is_primer_pack() {
                return Err(MxfError::klv(
                    header.byte_offset,
                    format!("header metadata starts with {}, not a primer pack", header.key.name()),
                ));
            }
            primer = Some(PrimerPack::parse(&header, value)?);
            break;
        }
        let primer = primer.ok_or_else(|| {
            MxfError::klv(reader.offset(), "header partition has no primer pack")
        })?;

        let mut objects = Vec::new();
        while let Some((header, value)) = reader.read_klv()? {
            if header.key.is_fill_item() {
                continue;
            }
            if !header.key.is_metadata() {
                tracing::debug!(
                    offset = header.byte_offset,
                    key = header.key.name(),
                    "End of header metadata"
                );
                break;
            }
            objects.push(InterchangeObject::decode(&header, value, &primer)?);
        }

        let mut by_uid = HashMap::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            if object.instance_uid.is_nil() {
                continue;
            }
            if by_uid.insert(object.instance_uid, i).is_some() {
                tracing::warn!(
                    offset = object.byte_offset(),
                    uid = %object.instance_uid,
                    "Duplicate instance UID"
                );
            }
        }

        let partition = HeaderPartition {
            partition_pack,
            primer,
            objects,
            by_uid,
        };
        partition.check_references()?;

        tracing::debug!(
            offset = byte_offset,
            sets = partition.objects.len(),
            "Parsed header metadata"
        );
        Ok(partition)
    }

    fn check_references(&self) -> Result<()> {
        for object in &self.objects {
            for target in object.strong_references() {
                if !self.by_uid.contains_key(&target) {
                    return Err(MxfError::DanglingReference {
                        offset: object.byte_offset(),
                        source_uid: object.instance_uid,
                        target_uid: target,
                    });
                }
            }
        }
        Ok(())
    }

    /// The partition pack this metadata belongs to
    pub fn partition_pack(&self) -> &PartitionPack {
        &self.partition_pack
    }

    /// The primer pack
    pub fn primer(&self) -> &PrimerPack {
        &self.primer
    }

    /// All metadata objects in file order
    pub fn objects(&self) -> &[InterchangeObject] {
        &self.objects
    }

    /// Look up an object by instance UID
    pub fn object(&self, uid: &Uuid) -> Option<&InterchangeObject> {
        self.by_uid.get(uid).map(|&i| &self.objects[i])
    }

    /// The preface object and its fields
    pub fn preface(&self) -> Option<(&InterchangeObject, &Preface)> {
        self.objects.iter().find_map(|o| match &o.set {
            MetadataSet::Preface(p) => Some((o, p)),
            _ => None,
        })
    }

    /// Content storage referenced by the preface
    pub fn content_storage(&self) -> Option<&ContentStorage> {
        let (_, preface) = self.preface()?;
        match &self.object(preface.content_storage.as_ref()?)?.set {
            MetadataSet::ContentStorage(c) => Some(c),
            _ => None,
        }
    }

    /// Essence container data sets listed by content storage
    pub fn essence_container_data(&self) -> Vec<(&InterchangeObject, &EssenceContainerData)> {
        let storage = match self.content_storage() {
            Some(storage) => storage,
            None => return Vec::new(),
        };
        storage
            .essence_container_data
            .iter()
            .filter_map(|uid| self.object(uid))
            .filter_map(|o| match &o.set {
                MetadataSet::EssenceContainerData(d) => Some((o, d)),
                _ => None,
            })
            .collect()
    }

    /// All packages in file order
    pub fn packages(&self) -> Vec<PackageRef<'_>> {
        self.objects
            .iter()
            .filter_map(|o| o.as_package().map(|p| PackageRef::new(o, p)))
            .collect()
    }

    /// Material packages in file order
    pub fn material_packages(&self) -> Vec<PackageRef<'_>> {
        self.packages().into_iter().filter(|p| !p.is_source()).collect()
    }

    /// Follow an essence container data set to the package it links
    pub fn linked_package(&self, data: &EssenceContainerData) -> Option<PackageRef<'_>> {
        let linked = data.linked_package_uid?;
        self.packages()
            .into_iter()
            .find(|p| p.package().package_uid == Some(linked))
    }

    /// The file package: the source package linked from the single
    /// essence container data set
    ///
    /// Returns `None` when there is no such link or it leads to a material
    /// package.
    pub fn file_package(&self) -> Option<(&InterchangeObject, &GenericPackage)> {
        let data = self.essence_container_data();
        let (_, data) = data.first()?;
        match self.linked_package(data)? {
            PackageRef::Source { object, package } => Some((object, package)),
            PackageRef::Material { .. } => None,
        }
    }

    /// Track file id: the material number of the file package's UMID
    pub fn track_file_id(&self) -> Option<Uuid> {
        let (_, package) = self.file_package()?;
        package.package_uid.map(|umid| umid.material_number())
    }

    /// Tracks owned by a package, in reference order
    pub fn tracks(&self, package: &GenericPackage) -> Vec<(&InterchangeObject, &Track)> {
        package
            .tracks
            .iter()
            .filter_map(|uid| self.object(uid))
            .filter_map(|o| o.as_track().map(|t| (o, t)))
            .collect()
    }

    /// Descriptor referenced by a source package
    pub fn descriptor(&self, package: &GenericPackage) -> Option<&InterchangeObject> {
        self.object(package.descriptor.as_ref()?)
            .filter(|o| o.as_descriptor().is_some())
    }

    /// Top-level essence descriptors in file order
    ///
    /// Descriptors owned by a multiple descriptor are reached through it and
    /// are not listed on their own.
    pub fn essence_descriptors(&self) -> Vec<&InterchangeObject> {
        let owned: HashSet<Uuid> = self
            .objects
            .iter()
            .filter_map(|o| o.as_descriptor())
            .flat_map(|d| d.file_descriptors.iter().copied())
            .collect();
        self.objects
            .iter()
            .filter(|o| o.as_descriptor().is_some() && !owned.contains(&o.instance_uid))
            .collect()
    }

    /// Sub-descriptor closure of a descriptor, depth first in reference order
    pub fn sub_descriptors(&self, descriptor: &InterchangeObject) -> Vec<&InterchangeObject> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(descriptor.instance_uid);
        self.collect_sub_descriptors(descriptor, &mut seen, &mut out);
        out
    }

    fn collect_sub_descriptors<'a>(
        &'a self,
        parent: &InterchangeObject,
        seen: &mut HashSet<Uuid>,
        out: &mut Vec<&'a InterchangeObject>,
    ) {
        let children = match &parent.set {
            MetadataSet::EssenceDescriptor(d) => &d.sub_descriptors,
            MetadataSet::SubDescriptor(s) => &s.sub_descriptors,
            _ => return,
        };
        for uid in children {
            if !seen.insert(*uid) {
                continue;
            }
            if let Some(child) = self.object(uid) {
                out.push(child);
                self.collect_sub_descriptors(child, seen, out);
            }
        }
    }
}
