//! Error types for MXF track file parsing

use crate::compliance::ComplianceViolation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Result type for MXF operations
pub type Result<T> = std::result::Result<T, MxfError>;

/// Errors that can occur while reading an MXF track file
#[derive(Error, Debug)]
pub enum MxfError {
    /// A byte range outside the resource was requested
    #[error("Byte range [{start}, {end}] out of bounds for resource of {size} bytes")]
    OutOfRange { start: u64, end: u64, size: u64 },

    /// A KLV header or value could not be decoded
    #[error("Malformed KLV at offset {offset}: {message}")]
    MalformedKlv { offset: u64, message: String },

    /// The resource does not end with a random index pack
    #[error("Missing random index pack in resource of {resource_size} bytes: {message}")]
    MissingIndex { resource_size: u64, message: String },

    /// The random index pack is present but its contents are inconsistent
    #[error("Malformed random index pack at offset {offset}: {message}")]
    MalformedIndex { offset: u64, message: String },

    /// A partition pack has inconsistent fields
    #[error("Malformed partition pack at offset {offset}: {message}")]
    MalformedPartition { offset: u64, message: String },

    /// A strong reference names an instance absent from the metadata set
    #[error("Dangling reference at offset {offset}: {source_uid} references missing {target_uid}")]
    DanglingReference {
        offset: u64,
        source_uid: Uuid,
        target_uid: Uuid,
    },

    /// A set or property has no registry mapping and strict mode is on
    #[error("No registry entry for {ul} at offset {offset}")]
    UnknownRegistryEntry { ul: String, offset: u64 },

    /// One or more structural rules failed
    #[error("{} compliance violation(s), first: {}", .0.len(), first_violation(.0))]
    Compliance(Vec<ComplianceViolation>),

    /// IO error from a provider or staging file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writer error
    #[error("XML error: {0}")]
    Xml(String),

    /// Registry data could not be loaded
    #[error("Registry error: {0}")]
    Registry(String),

    /// Reader configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the core crate
    #[error(transparent)]
    Core(#[from] imf_core::Error),
}

fn first_violation(violations: &[ComplianceViolation]) -> String {
    violations
        .first()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl From<quick_xml::Error> for MxfError {
    fn from(err: quick_xml::Error) -> Self {
        MxfError::Xml(err.to_string())
    }
}

impl From<serde_json::Error> for MxfError {
    fn from(err: serde_json::Error) -> Self {
        MxfError::Registry(err.to_string())
    }
}

/// Stable classification of [`MxfError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    OutOfRange,
    MalformedKlv,
    MissingIndex,
    MalformedIndex,
    MalformedPartition,
    DanglingReference,
    UnknownRegistryEntry,
    ComplianceViolation,
    Io,
    Xml,
    Registry,
    Config,
    Core,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::OutOfRange => "OutOfRangeError",
            ErrorKind::MalformedKlv => "MalformedKLVError",
            ErrorKind::MissingIndex => "MissingIndexError",
            ErrorKind::MalformedIndex => "MalformedIndexError",
            ErrorKind::MalformedPartition => "MalformedPartitionError",
            ErrorKind::DanglingReference => "DanglingReferenceError",
            ErrorKind::UnknownRegistryEntry => "UnknownRegistryEntryError",
            ErrorKind::ComplianceViolation => "ComplianceViolation",
            ErrorKind::Io => "IOError",
            ErrorKind::Xml => "XMLError",
            ErrorKind::Registry => "RegistryError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Core => "CoreError",
        };
        f.write_str(name)
    }
}

impl MxfError {
    /// Classify this error without inspecting its payload
    pub fn kind(&self) -> ErrorKind {
        match self {
            MxfError::OutOfRange { .. } => ErrorKind::OutOfRange,
            MxfError::MalformedKlv { .. } => ErrorKind::MalformedKlv,
            MxfError::MissingIndex { .. } => ErrorKind::MissingIndex,
            MxfError::MalformedIndex { .. } => ErrorKind::MalformedIndex,
            MxfError::MalformedPartition { .. } => ErrorKind::MalformedPartition,
            MxfError::DanglingReference { .. } => ErrorKind::DanglingReference,
            MxfError::UnknownRegistryEntry { .. } => ErrorKind::UnknownRegistryEntry,
            MxfError::Compliance(_) => ErrorKind::ComplianceViolation,
            MxfError::Io(_) => ErrorKind::Io,
            MxfError::Xml(_) => ErrorKind::Xml,
            MxfError::Registry(_) => ErrorKind::Registry,
            MxfError::Config(_) => ErrorKind::Config,
            MxfError::Core(_) => ErrorKind::Core,
        }
    }

    /// Absolute byte offset the error refers to, when it has one
    pub fn byte_offset(&self) -> Option<u64> {
        match self {
            MxfError::OutOfRange { start, .. } => Some(*start),
            MxfError::MalformedKlv { offset, .. }
            | MxfError::MalformedIndex { offset, .. }
            | MxfError::MalformedPartition { offset, .. }
            | MxfError::DanglingReference { offset, .. }
            | MxfError::UnknownRegistryEntry { offset, .. } => Some(*offset),
            MxfError::Compliance(violations) => violations.first().and_then(|v| v.byte_offset),
            _ => None,
        }
    }

    /// Shorthand for a KLV decoding failure
    pub(crate) fn klv(offset: u64, message: impl Into<String>) -> Self {
        MxfError::MalformedKlv {
            offset,
            message: message.into(),
        }
    }
}
