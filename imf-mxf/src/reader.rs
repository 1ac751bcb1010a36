//! Track file reader
//!
//! Drives the full parse of one resource: random index pack, partition
//! packs, header metadata, the OP1A and IMF passes, and descriptor
//! projection. Each step depends on offsets found by the previous one, so a
//! reader is strictly sequential. Independent resources are read by
//! independent readers, one per provider.

use crate::byte_range::ResourceByteRangeProvider;
use crate::compliance::{HeaderPartitionImf, HeaderPartitionOp1a, PartitionListImf, PartitionListOp1a};
use crate::config::ReaderConfig;
use crate::error::{MxfError, Result};
use crate::error_logger::{ErrorLogger, Severity};
use crate::header::HeaderPartition;
use crate::klv::probe_header;
use crate::partition::{PartitionKind, PartitionPack};
use crate::registry::{default_registry, Registry};
use crate::regxml::DescriptorProjector;
use crate::rip::RandomIndexPack;
use imf_core::Rational;
use std::borrow::Cow;
use uuid::Uuid;

/// Everything read from one track file
#[derive(Debug)]
pub struct TrackFile {
    /// Random index pack
    pub random_index_pack: RandomIndexPack,
    /// Partition packs in file order
    pub partitions: Vec<PartitionPack>,
    /// Header partition metadata
    pub header: HeaderPartition,
    /// Material number of the file package
    pub track_file_id: Option<Uuid>,
    /// Essence edit rate, when the IMF pass ran
    pub edit_rate: Option<Rational>,
    /// XML projection of each essence descriptor
    pub essence_descriptors: Vec<String>,
}

/// Reads and validates one MXF track file
pub struct MxfEssenceReader<P> {
    provider: P,
    config: ReaderConfig,
    registry: Cow<'static, Registry>,
    logger: ErrorLogger,
}

impl<P: ResourceByteRangeProvider> MxfEssenceReader<P> {
    /// Create a reader, loading the configured registry if any
    pub fn new(provider: P, config: ReaderConfig) -> Result<Self> {
        let registry = match &config.registry_path {
            Some(path) => Cow::Owned(Registry::from_json_file(path)?),
            None => Cow::Borrowed(default_registry()),
        };
        Ok(MxfEssenceReader {
            provider,
            config,
            registry,
            logger: ErrorLogger::new(),
        })
    }

    /// Report into a shared logger
    pub fn with_logger(mut self, logger: ErrorLogger) -> Self {
        self.logger = logger;
        self
    }

    /// The logger this reader reports into
    pub fn logger(&self) -> &ErrorLogger {
        &self.logger
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Registry used for descriptor projection
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Locate the random index pack
    pub fn random_index_pack(&self) -> Result<RandomIndexPack> {
        RandomIndexPack::locate(&self.provider)
    }

    /// Read the partition pack at every offset the index lists
    pub fn partition_packs(&self, rip: &RandomIndexPack) -> Result<Vec<PartitionPack>> {
        rip.entries
            .iter()
            .map(|entry| PartitionPack::read(&self.provider, entry.byte_offset))
            .collect()
    }

    /// Parse the header partition's metadata
    pub fn header_partition(
        &self,
        rip: &RandomIndexPack,
        partitions: &[PartitionPack],
    ) -> Result<HeaderPartition> {
        let first = partitions.first().ok_or_else(|| MxfError::MissingIndex {
            resource_size: self.provider.resource_size(),
            message: "no partitions listed".into(),
        })?;
        self.parse_partition_metadata(rip, partitions, 0, first)
    }

    /// Parse the header metadata repeated in the footer, if present
    pub fn footer_header_partition(
        &self,
        rip: &RandomIndexPack,
        partitions: &[PartitionPack],
    ) -> Result<Option<HeaderPartition>> {
        match partitions.last() {
            Some(last)
                if partitions.len() > 1
                    && last.kind == PartitionKind::Footer
                    && last.has_header_metadata() =>
            {
                let index = partitions.len() - 1;
                self.parse_partition_metadata(rip, partitions, index, last)
                    .map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Fetch the partition pack and its header metadata, nothing after it
    fn parse_partition_metadata(
        &self,
        rip: &RandomIndexPack,
        partitions: &[PartitionPack],
        index: usize,
        pack: &PartitionPack,
    ) -> Result<HeaderPartition> {
        let partition_end = partitions
            .get(index + 1)
            .map(|next| next.byte_offset)
            .unwrap_or(rip.byte_offset);
        let start = pack.byte_offset;
        if partition_end <= start {
            return Err(MxfError::MalformedPartition {
                offset: start,
                message: format!("partition ends at {} before it starts", partition_end),
            });
        }

        let metadata_start = start.saturating_add(pack.encoded_len());
        let end = if pack.header_byte_count > 0 {
            metadata_start
                .saturating_add(pack.header_byte_count)
                .min(partition_end)
        } else {
            self.metadata_end(metadata_start, partition_end)?
        };
        let range = self.provider.byte_range(start, end - 1)?;
        let bytes = range.into_bytes()?;
        HeaderPartition::parse(&bytes, start)
    }

    /// End of undeclared header metadata: the first unit that is neither
    /// primer, metadata set nor fill, or the end of the partition
    fn metadata_end(&self, mut offset: u64, partition_end: u64) -> Result<u64> {
        while offset < partition_end {
            let header = probe_header(&self.provider, offset)?;
            let key = &header.key;
            if !(key.is_primer_pack() || key.is_metadata() || key.is_fill_item()) {
                break;
            }
            offset = header.end_offset();
        }
        Ok(offset.min(partition_end))
    }

    /// Project every essence descriptor of a header partition
    pub fn project_descriptors(&self, header: &HeaderPartition) -> Result<Vec<String>> {
        DescriptorProjector::new(&self.provider, header, &self.registry)
            .strict(self.config.strict_registry)
            .project_all()
    }

    /// Parse the structure and project the essence descriptors, without
    /// running compliance checks
    pub fn essence_descriptors(&self) -> Result<Vec<String>> {
        let rip = self.random_index_pack()?;
        let partitions = self.partition_packs(&rip)?;
        let header = self.header_partition(&rip, &partitions)?;
        self.project_descriptors(&header)
    }

    /// Read and validate the whole track file
    ///
    /// A structural decode error aborts the read after logging exactly one
    /// fatal entry. Compliance passes log every violation they find before
    /// the read fails.
    pub fn read(&self) -> Result<TrackFile> {
        let fatal = |err: MxfError| {
            self.logger.log_error(Severity::Fatal, &err);
            err
        };

        let rip = self.random_index_pack().map_err(fatal)?;
        let partitions = self.partition_packs(&rip).map_err(fatal)?;
        let header = self.header_partition(&rip, &partitions).map_err(fatal)?;
        let footer = self
            .footer_header_partition(&rip, &partitions)
            .map_err(fatal)?;

        let list = PartitionListOp1a::validate(&partitions, &rip, &self.logger);
        let op1a = HeaderPartitionOp1a::validate(&header, footer.as_ref(), &self.logger);
        let (list, op1a) = combine(list, op1a)?;

        let mut edit_rate = None;
        if self.config.validate_imf {
            let list = PartitionListImf::validate(list, &self.logger);
            let imf = HeaderPartitionImf::validate(op1a, &self.logger);
            let (_, imf) = combine(list, imf)?;
            edit_rate = Some(imf.edit_rate());
        }

        let essence_descriptors = self.project_descriptors(&header).map_err(fatal)?;
        let track_file_id = header.track_file_id();

        tracing::info!(
            partitions = partitions.len(),
            sets = header.objects().len(),
            track_file_id = ?track_file_id,
            "Read track file"
        );

        Ok(TrackFile {
            random_index_pack: rip,
            partitions,
            header,
            track_file_id,
            edit_rate,
            essence_descriptors,
        })
    }
}

/// Join two independent passes, keeping every violation of both
fn combine<A, B>(a: Result<A>, b: Result<B>) -> Result<(A, B)> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(MxfError::Compliance(mut first)), Err(MxfError::Compliance(second))) => {
            first.extend(second);
            Err(MxfError::Compliance(first))
        }
        (Err(err), _) | (_, Err(err)) => Err(err),
    }
}
