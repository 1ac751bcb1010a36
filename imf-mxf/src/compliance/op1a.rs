//! Operational pattern 1A checks

use super::{ComplianceViolation, Rule};
use crate::error::{MxfError, Result};
use crate::error_logger::{ErrorLogger, Severity};
use crate::header::{HeaderPartition, PackageRef};
use crate::partition::{PartitionKind, PartitionPack};
use crate::rip::RandomIndexPack;
use crate::ul::{labels, UniversalLabel};
use std::collections::BTreeSet;
use uuid::Uuid;

/// OP1A compares the label up to the item and package complexity bytes;
/// the trailing qualifier bytes vary between writers.
fn is_op1a(ul: &UniversalLabel) -> bool {
    ul.as_bytes()[..14]
        .iter()
        .zip(labels::OP1A[..14].iter())
        .enumerate()
        .all(|(i, (a, b))| i == 7 || a == b)
}

fn finish<T>(view: T, violations: Vec<ComplianceViolation>, logger: &ErrorLogger) -> Result<T> {
    if violations.is_empty() {
        return Ok(view);
    }
    for violation in &violations {
        logger.log_violation(Severity::NonFatal, violation);
    }
    Err(MxfError::Compliance(violations))
}

/// Partition list that satisfies the OP1A partition layout rules
#[derive(Debug, Clone, Copy)]
pub struct PartitionListOp1a<'a> {
    partitions: &'a [PartitionPack],
}

impl<'a> PartitionListOp1a<'a> {
    /// Check the partition packs read at the offsets listed in `rip`
    pub fn validate(
        partitions: &'a [PartitionPack],
        rip: &RandomIndexPack,
        logger: &ErrorLogger,
    ) -> Result<Self> {
        let mut violations = Vec::new();

        match partitions.first() {
            Some(first) if first.kind == PartitionKind::Header => {
                if !first.status.is_closed() || !first.status.is_complete() {
                    violations.push(
                        ComplianceViolation::new(
                            Rule::Op1aHeaderClosedComplete,
                            format!("header partition status is {:?}", first.status),
                        )
                        .at_offset(first.byte_offset),
                    );
                }
                if first.essence_container_count() != 1 {
                    violations.push(
                        ComplianceViolation::new(
                            Rule::Op1aEssenceContainerCount,
                            format!(
                                "header partition pack lists {} essence containers",
                                first.essence_container_count()
                            ),
                        )
                        .at_offset(first.byte_offset),
                    );
                }
            }
            Some(first) => violations.push(
                ComplianceViolation::new(
                    Rule::Op1aFirstPartitionHeader,
                    format!("first partition is a {:?} partition", first.kind),
                )
                .at_offset(first.byte_offset),
            ),
            None => violations.push(ComplianceViolation::new(
                Rule::Op1aFirstPartitionHeader,
                "resource has no partitions",
            )),
        }

        let headers: Vec<&PartitionPack> = partitions
            .iter()
            .filter(|p| p.kind == PartitionKind::Header)
            .collect();
        if headers.len() > 1 {
            for extra in &headers[1..] {
                violations.push(
                    ComplianceViolation::new(
                        Rule::Op1aSingleHeader,
                        format!("{} header partitions", headers.len()),
                    )
                    .at_offset(extra.byte_offset),
                );
            }
        }

        let last = partitions.len().saturating_sub(1);
        for (i, pack) in partitions.iter().enumerate() {
            if pack.kind != PartitionKind::Footer {
                continue;
            }
            if i != last {
                violations.push(
                    ComplianceViolation::new(
                        Rule::Op1aFooterLast,
                        "footer partition is not the last partition",
                    )
                    .at_offset(pack.byte_offset),
                );
            } else if !pack.status.is_closed() {
                violations.push(
                    ComplianceViolation::new(Rule::Op1aFooterLast, "footer partition is open")
                        .at_offset(pack.byte_offset),
                );
            }
        }

        let footer_offset = partitions
            .iter()
            .find(|p| p.kind == PartitionKind::Footer)
            .map(|p| p.byte_offset);
        for (i, pack) in partitions.iter().enumerate() {
            let previous = if i == 0 {
                0
            } else {
                partitions[i - 1].byte_offset
            };
            let mut offset_violation = |message: String| {
                violations.push(
                    ComplianceViolation::new(Rule::Op1aPartitionOffsets, message)
                        .at_offset(pack.byte_offset),
                )
            };
            if pack.this_partition != pack.byte_offset {
                offset_violation(format!(
                    "ThisPartition {} disagrees with the partition's position",
                    pack.this_partition
                ));
            }
            if pack.previous_partition != previous {
                offset_violation(format!(
                    "PreviousPartition {} should be {}",
                    pack.previous_partition, previous
                ));
            }
            if let Some(footer) = footer_offset {
                if pack.status.is_closed() && pack.footer_partition != footer {
                    offset_violation(format!(
                        "FooterPartition {} should be {}",
                        pack.footer_partition, footer
                    ));
                }
            }
            if let Some(entry) = rip.entries.get(i) {
                if entry.body_sid != pack.body_sid {
                    offset_violation(format!(
                        "random index pack lists BodySID {}, partition has {}",
                        entry.body_sid, pack.body_sid
                    ));
                }
            }
        }

        finish(PartitionListOp1a { partitions }, violations, logger)
    }

    /// All partition packs in file order
    pub fn partitions(&self) -> &'a [PartitionPack] {
        self.partitions
    }

    /// The header partition pack
    pub fn header(&self) -> &'a PartitionPack {
        &self.partitions[0]
    }

    /// The footer partition pack, if the file has one
    pub fn footer(&self) -> Option<&'a PartitionPack> {
        self.partitions
            .last()
            .filter(|p| p.kind == PartitionKind::Footer)
    }
}

/// Header partition that satisfies the OP1A metadata rules
#[derive(Debug, Clone, Copy)]
pub struct HeaderPartitionOp1a<'a> {
    header: &'a HeaderPartition,
}

impl<'a> HeaderPartitionOp1a<'a> {
    /// Check header metadata, and its repetition in the footer when present
    pub fn validate(
        header: &'a HeaderPartition,
        footer: Option<&HeaderPartition>,
        logger: &ErrorLogger,
    ) -> Result<Self> {
        let mut violations = Vec::new();
        let pack = header.partition_pack();

        if !is_op1a(&pack.operational_pattern) {
            violations.push(
                ComplianceViolation::new(
                    Rule::Op1aOperationalPattern,
                    format!(
                        "partition pack operational pattern is {}",
                        pack.operational_pattern
                    ),
                )
                .at_offset(pack.byte_offset),
            );
        }

        match header.preface() {
            Some((object, preface)) => {
                let op = preface.operational_pattern;
                if !op.map(|ul| is_op1a(&ul)).unwrap_or(false) {
                    violations.push(
                        ComplianceViolation::new(
                            Rule::Op1aOperationalPattern,
                            "preface operational pattern is missing or not OP1A",
                        )
                        .at_offset(object.byte_offset())
                        .for_object(object.instance_uid),
                    );
                }
                if preface.essence_containers.len() != 1 {
                    violations.push(
                        ComplianceViolation::new(
                            Rule::Op1aEssenceContainerCount,
                            format!(
                                "preface lists {} essence containers",
                                preface.essence_containers.len()
                            ),
                        )
                        .at_offset(object.byte_offset())
                        .for_object(object.instance_uid),
                    );
                }
            }
            None => violations.push(
                ComplianceViolation::new(Rule::Op1aOperationalPattern, "header has no preface")
                    .at_offset(pack.byte_offset),
            ),
        }

        let data = header.essence_container_data();
        if data.len() != 1 {
            violations.push(
                ComplianceViolation::new(
                    Rule::Op1aEssenceContainerData,
                    format!("{} essence container data sets", data.len()),
                )
                .at_offset(pack.byte_offset),
            );
        }
        for (object, ecd) in &data {
            match header.linked_package(ecd) {
                Some(PackageRef::Source { .. }) => {}
                Some(PackageRef::Material { .. }) => violations.push(
                    ComplianceViolation::new(
                        Rule::Op1aEssenceContainerData,
                        "essence container data links a material package",
                    )
                    .at_offset(object.byte_offset())
                    .for_object(object.instance_uid),
                ),
                None => violations.push(
                    ComplianceViolation::new(
                        Rule::Op1aEssenceContainerData,
                        "essence container data links no package in this file",
                    )
                    .at_offset(object.byte_offset())
                    .for_object(object.instance_uid),
                ),
            }
        }

        let materials = header.material_packages();
        if materials.len() != 1 {
            violations.push(
                ComplianceViolation::new(
                    Rule::Op1aMaterialPackageCount,
                    format!("{} material packages", materials.len()),
                )
                .at_offset(pack.byte_offset),
            );
        }

        if let Some(footer) = footer {
            check_footer_equivalence(header, footer, &mut violations);
        }

        finish(HeaderPartitionOp1a { header }, violations, logger)
    }

    /// The validated header partition
    pub fn header(&self) -> &'a HeaderPartition {
        self.header
    }
}

fn metadata_identity(header: &HeaderPartition) -> BTreeSet<(UniversalLabel, Uuid)> {
    header
        .objects()
        .iter()
        .map(|o| (o.header.key.normalized(), o.instance_uid))
        .collect()
}

fn check_footer_equivalence(
    header: &HeaderPartition,
    footer: &HeaderPartition,
    violations: &mut Vec<ComplianceViolation>,
) {
    let offset = footer.partition_pack().byte_offset;
    let mut push = |message: String| {
        violations.push(
            ComplianceViolation::new(Rule::Op1aFooterEquivalence, message).at_offset(offset),
        )
    };

    let (header_pack, footer_pack) = (header.partition_pack(), footer.partition_pack());
    if header_pack.operational_pattern.normalized() != footer_pack.operational_pattern.normalized()
    {
        push("footer operational pattern differs from the header".into());
    }
    if header_pack.essence_containers != footer_pack.essence_containers {
        push("footer essence containers differ from the header".into());
    }

    let ours = metadata_identity(header);
    let theirs = metadata_identity(footer);
    if ours != theirs {
        push(format!(
            "footer metadata differs: {} sets only in header, {} only in footer",
            ours.difference(&theirs).count(),
            theirs.difference(&ours).count()
        ));
    }
}
