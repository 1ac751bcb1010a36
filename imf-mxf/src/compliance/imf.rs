//! IMF track file constraints, checked on top of OP1A

use super::op1a::{HeaderPartitionOp1a, PartitionListOp1a};
use super::{ComplianceViolation, Rule};
use crate::error::{MxfError, Result};
use crate::error_logger::{ErrorLogger, Severity};
use crate::header::HeaderPartition;
use crate::metadata::{DescriptorKind, EssenceDescriptor, GenericPackage, InterchangeObject};
use imf_core::Rational;
use uuid::Uuid;

fn finish<T>(view: Option<T>, violations: Vec<ComplianceViolation>, logger: &ErrorLogger) -> Result<T> {
    match view {
        Some(view) if violations.is_empty() => Ok(view),
        _ => {
            for violation in &violations {
                logger.log_violation(Severity::NonFatal, violation);
            }
            Err(MxfError::Compliance(violations))
        }
    }
}

/// Partition list that satisfies the IMF partition rules
#[derive(Debug, Clone, Copy)]
pub struct PartitionListImf<'a> {
    op1a: PartitionListOp1a<'a>,
}

impl<'a> PartitionListImf<'a> {
    /// Narrow an OP1A-validated partition list
    pub fn validate(op1a: PartitionListOp1a<'a>, logger: &ErrorLogger) -> Result<Self> {
        let mut violations = Vec::new();

        for pack in op1a.partitions() {
            if pack.index_table_present() && pack.has_essence() {
                violations.push(
                    ComplianceViolation::new(
                        Rule::ImfPartitionEssenceIndexMixed,
                        format!(
                            "partition carries both index (IndexSID {}) and essence (BodySID {})",
                            pack.index_sid, pack.body_sid
                        ),
                    )
                    .at_offset(pack.byte_offset),
                );
            }
        }

        let header = op1a.header();
        if header.has_essence() {
            violations.push(
                ComplianceViolation::new(
                    Rule::ImfHeaderEssence,
                    format!("header partition has BodySID {}", header.body_sid),
                )
                .at_offset(header.byte_offset),
            );
        }

        finish(Some(PartitionListImf { op1a }), violations, logger)
    }

    /// The underlying OP1A view
    pub fn op1a(&self) -> PartitionListOp1a<'a> {
        self.op1a
    }
}

/// Header partition that satisfies the IMF metadata rules
///
/// Holds the facts the rules proved: the file package, its single essence
/// track's edit rate, and its single essence descriptor.
#[derive(Debug, Clone, Copy)]
pub struct HeaderPartitionImf<'a> {
    header: &'a HeaderPartition,
    file_package: &'a GenericPackage,
    descriptor: &'a InterchangeObject,
    edit_rate: Rational,
}

impl<'a> HeaderPartitionImf<'a> {
    /// Narrow an OP1A-validated header partition
    pub fn validate(op1a: HeaderPartitionOp1a<'a>, logger: &ErrorLogger) -> Result<Self> {
        let header = op1a.header();
        let offset = header.partition_pack().byte_offset;
        let mut violations = Vec::new();

        let file_package = header.file_package();
        if file_package.is_none() {
            violations.push(
                ComplianceViolation::new(
                    Rule::ImfFilePackageType,
                    "essence container data does not link a source package",
                )
                .at_offset(offset),
            );
        }

        let mut edit_rate = None;
        let mut descriptor = None;
        if let Some((package_object, package)) = file_package {
            let essence_tracks: Vec<_> = header
                .tracks(package)
                .into_iter()
                .filter(|(_, t)| t.track_number.unwrap_or(0) != 0)
                .collect();
            if essence_tracks.len() != 1 {
                violations.push(
                    ComplianceViolation::new(
                        Rule::ImfEssenceTrackCount,
                        format!("file package has {} essence tracks", essence_tracks.len()),
                    )
                    .at_offset(package_object.byte_offset())
                    .for_object(package_object.instance_uid),
                );
            }
            if let [(track_object, track)] = essence_tracks.as_slice() {
                edit_rate = track.edit_rate;
                if edit_rate.is_none() {
                    violations.push(
                        ComplianceViolation::new(Rule::ImfEditRate, "essence track has no EditRate")
                            .at_offset(track_object.byte_offset())
                            .for_object(track_object.instance_uid),
                    );
                }
            }

            match header.descriptor(package) {
                Some(object) => match object.as_descriptor() {
                    Some(d) if d.kind == DescriptorKind::Multiple => violations.push(
                        ComplianceViolation::new(
                            Rule::ImfDescriptorCount,
                            "file package uses a multiple descriptor",
                        )
                        .at_offset(object.byte_offset())
                        .for_object(object.instance_uid),
                    ),
                    Some(d) => {
                        check_descriptor_fields(object, d, edit_rate, &mut violations);
                        descriptor = Some(object);
                    }
                    None => {}
                },
                None => violations.push(
                    ComplianceViolation::new(
                        Rule::ImfDescriptorCount,
                        "file package has no essence descriptor",
                    )
                    .at_offset(package_object.byte_offset())
                    .for_object(package_object.instance_uid),
                ),
            }
        }

        let view = match (file_package, descriptor, edit_rate) {
            (Some((_, file_package)), Some(descriptor), Some(edit_rate)) => Some(HeaderPartitionImf {
                header,
                file_package,
                descriptor,
                edit_rate,
            }),
            _ => None,
        };
        if view.is_some() {
            tracing::info!(offset, "Header partition satisfies IMF constraints");
        }
        finish(view, violations, logger)
    }

    /// The validated header partition
    pub fn header(&self) -> &'a HeaderPartition {
        self.header
    }

    /// The file (top-level source) package
    pub fn file_package(&self) -> &'a GenericPackage {
        self.file_package
    }

    /// The single essence descriptor
    pub fn essence_descriptor(&self) -> &'a InterchangeObject {
        self.descriptor
    }

    /// Edit rate of the essence track
    pub fn edit_rate(&self) -> Rational {
        self.edit_rate
    }

    /// Track file id referenced by playlists
    pub fn track_file_id(&self) -> Option<Uuid> {
        self.file_package.package_uid.map(|umid| umid.material_number())
    }

    /// Check that every playlist resource referencing this track file uses
    /// the essence edit rate
    pub fn check_resource_edit_rates(&self, rates: &[Rational], logger: &ErrorLogger) -> Result<()> {
        let violations: Vec<ComplianceViolation> = rates
            .iter()
            .enumerate()
            .filter(|(_, rate)| rate.reduce() != self.edit_rate.reduce())
            .map(|(i, rate)| {
                ComplianceViolation::new(
                    Rule::ImfEditRate,
                    format!(
                        "resource {} uses edit rate {}, track file essence is {}",
                        i, rate, self.edit_rate
                    ),
                )
                .at_offset(self.descriptor.byte_offset())
                .for_object(self.descriptor.instance_uid)
            })
            .collect();
        finish(Some(()), violations, logger)
    }
}

fn check_descriptor_fields(
    object: &InterchangeObject,
    descriptor: &EssenceDescriptor,
    edit_rate: Option<Rational>,
    violations: &mut Vec<ComplianceViolation>,
) {
    let mut missing = Vec::new();
    if descriptor.sample_rate.is_none() {
        missing.push("SampleRate");
    }
    if descriptor.essence_container.is_none() {
        missing.push("EssenceContainer");
    }
    if !missing.is_empty() {
        violations.push(
            ComplianceViolation::new(
                Rule::ImfDescriptorFields,
                format!("descriptor lacks {}", missing.join(", ")),
            )
            .at_offset(object.byte_offset())
            .for_object(object.instance_uid),
        );
    }

    if let (Some(sample_rate), Some(edit_rate)) = (descriptor.sample_rate, edit_rate) {
        if sample_rate.reduce() != edit_rate.reduce() {
            violations.push(
                ComplianceViolation::new(
                    Rule::ImfEditRate,
                    format!(
                        "descriptor sample rate {} differs from track edit rate {}",
                        sample_rate, edit_rate
                    ),
                )
                .at_offset(object.byte_offset())
                .for_object(object.instance_uid),
            );
        }
    }
}
