//! MXF track file reading for IMF
//!
//! This crate reads MXF (Material eXchange Format) track files the way an
//! IMF package validator needs them: through random byte-range access, with
//! every error pinned to an absolute byte offset.
//!
//! # Features
//!
//! - Byte-range providers over memory and files, staging large ranges to disk
//! - KLV (Key-Length-Value) decoding with BER lengths
//! - Random index pack and partition pack parsing
//! - Primer-resolved header metadata with strong reference checking
//! - OP1A and IMF compliance passes that collect every violation
//! - Essence descriptor projection to XML through a symbol registry
//!
//! # Example
//!
//! ```no_run
//! use imf_mxf::{FileByteRangeProvider, MxfEssenceReader, ReaderConfig};
//!
//! let config = ReaderConfig::default();
//! let provider = FileByteRangeProvider::with_config("video.mxf", &config)?;
//! let reader = MxfEssenceReader::new(provider, config)?;
//! let track_file = reader.read()?;
//!
//! println!("Track file: {:?}", track_file.track_file_id);
//! for xml in &track_file.essence_descriptors {
//!     println!("{}", xml);
//! }
//! # Ok::<(), imf_mxf::MxfError>(())
//! ```

mod byte_range;
pub mod compliance;
mod config;
mod error;
mod error_logger;
mod header;
pub mod klv;
pub mod metadata;
mod partition;
mod primer;
mod reader;
pub mod registry;
mod regxml;
mod rip;
pub mod types;
pub mod ul;

pub use byte_range::{
    check_range, ByteRange, FileByteRangeProvider, MemoryByteRangeProvider,
    ResourceByteRangeProvider, StagedRange,
};
pub use compliance::{
    ComplianceViolation, HeaderPartitionImf, HeaderPartitionOp1a, PartitionListImf,
    PartitionListOp1a, Rule,
};
pub use config::{ReaderConfig, DEFAULT_STAGING_THRESHOLD};
pub use error::{ErrorKind, MxfError, Result};
pub use error_logger::{ErrorEntry, ErrorLocation, ErrorLogger, Severity};
pub use header::{HeaderPartition, PackageRef};
pub use klv::{Klv, KlvHeader, KlvReader};
pub use metadata::{EssenceDescriptor, InterchangeObject, MetadataSet};
pub use partition::{PartitionKind, PartitionPack, PartitionStatus};
pub use primer::PrimerPack;
pub use reader::{MxfEssenceReader, TrackFile};
pub use registry::{default_registry, Registry};
pub use regxml::DescriptorProjector;
pub use rip::{RandomIndexPack, RipEntry};
pub use types::{MxfTimestamp, Umid};
pub use ul::{UniversalLabel, UL};
