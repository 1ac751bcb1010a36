//! Structural compliance validation
//!
//! Validation runs in two passes. The OP1A pass checks the partition list
//! and header partition against the single-item, single-package operational
//! pattern; the IMF pass narrows an OP1A-validated file further. Each pass
//! evaluates every rule, collects all violations, and only then decides.
//! A successful pass returns a view type whose existence proves the rules
//! held; the views borrow the underlying header partition.

mod imf;
mod op1a;

pub use imf::{HeaderPartitionImf, PartitionListImf};
pub use op1a::{HeaderPartitionOp1a, PartitionListOp1a};

use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Identifier of a structural rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Op1aFirstPartitionHeader,
    Op1aSingleHeader,
    Op1aFooterLast,
    Op1aHeaderClosedComplete,
    Op1aPartitionOffsets,
    Op1aOperationalPattern,
    Op1aEssenceContainerCount,
    Op1aEssenceContainerData,
    Op1aMaterialPackageCount,
    Op1aFooterEquivalence,
    ImfPartitionEssenceIndexMixed,
    ImfHeaderEssence,
    ImfFilePackageType,
    ImfEssenceTrackCount,
    ImfDescriptorCount,
    ImfDescriptorFields,
    ImfEditRate,
}

impl Rule {
    /// Stable rule id used in reports
    pub fn id(&self) -> &'static str {
        match self {
            Rule::Op1aFirstPartitionHeader => "OP1A-FIRST-PARTITION-HEADER",
            Rule::Op1aSingleHeader => "OP1A-SINGLE-HEADER",
            Rule::Op1aFooterLast => "OP1A-FOOTER-LAST",
            Rule::Op1aHeaderClosedComplete => "OP1A-HEADER-CLOSED-COMPLETE",
            Rule::Op1aPartitionOffsets => "OP1A-PARTITION-OFFSETS",
            Rule::Op1aOperationalPattern => "OP1A-OPERATIONAL-PATTERN",
            Rule::Op1aEssenceContainerCount => "OP1A-ESSENCE-CONTAINER-COUNT",
            Rule::Op1aEssenceContainerData => "OP1A-ESSENCE-CONTAINER-DATA",
            Rule::Op1aMaterialPackageCount => "OP1A-MATERIAL-PACKAGE-COUNT",
            Rule::Op1aFooterEquivalence => "OP1A-FOOTER-EQUIVALENCE",
            Rule::ImfPartitionEssenceIndexMixed => "IMF-PARTITION-ESSENCE-INDEX-MIXED",
            Rule::ImfHeaderEssence => "IMF-HEADER-ESSENCE",
            Rule::ImfFilePackageType => "IMF-FILE-PACKAGE-TYPE",
            Rule::ImfEssenceTrackCount => "IMF-ESSENCE-TRACK-COUNT",
            Rule::ImfDescriptorCount => "IMF-DESCRIPTOR-COUNT",
            Rule::ImfDescriptorFields => "IMF-DESCRIPTOR-FIELDS",
            Rule::ImfEditRate => "IMF-EDIT-RATE",
        }
    }

    /// True for rules of the OP1A pass
    pub fn is_op1a(&self) -> bool {
        self.id().starts_with("OP1A-")
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

/// One failed structural predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceViolation {
    /// Rule that failed
    pub rule: Rule,
    /// Human-readable description
    pub message: String,
    /// Absolute offset of the offending structure
    pub byte_offset: Option<u64>,
    /// Instance UID of the offending metadata object
    pub object_uid: Option<Uuid>,
}

impl ComplianceViolation {
    /// Create a violation with no location
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        ComplianceViolation {
            rule,
            message: message.into(),
            byte_offset: None,
            object_uid: None,
        }
    }

    /// Attach the offset of the offending structure
    pub fn at_offset(mut self, offset: u64) -> Self {
        self.byte_offset = Some(offset);
        self
    }

    /// Attach the offending object's instance UID
    pub fn for_object(mut self, uid: Uuid) -> Self {
        self.object_uid = Some(uid);
        self
    }
}

impl fmt::Display for ComplianceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)?;
        if let Some(offset) = self.byte_offset {
            write!(f, " (offset {})", offset)?;
        }
        if let Some(uid) = self.object_uid {
            write!(f, " (object {})", uid)?;
        }
        Ok(())
    }
}
