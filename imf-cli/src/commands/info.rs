//! Track file inspection command.

use clap::Args;
use console::style;
use imf_core::uuid_to_urn;
use imf_mxf::{
    HeaderPartition, MxfEssenceReader, PartitionPack, ReaderConfig, ResourceByteRangeProvider,
};
use serde::Serialize;
use std::path::PathBuf;

/// Partition summary for display.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionInfo {
    /// Offset of the partition pack.
    pub offset: u64,
    /// Header, body or footer.
    pub kind: String,
    /// Open/closed and complete/incomplete flags.
    pub status: String,
    /// Essence stream id (0 when the partition carries none).
    pub body_sid: u32,
    /// Index stream id (0 when the partition carries none).
    pub index_sid: u32,
    /// Header metadata bytes following the pack.
    pub header_byte_count: u64,
}

/// Descriptor summary for display.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorInfo {
    /// Metadata set name.
    pub set: String,
    /// Instance UID as a URN.
    pub instance_uid: String,
    /// Sample rate as `num/den`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
    /// Names of resolved sub-descriptors.
    pub sub_descriptors: Vec<String>,
}

/// Track file information.
#[derive(Debug, Clone, Serialize)]
pub struct TrackFileInfo {
    /// File path.
    pub file: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Track file id as a URN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_file_id: Option<String>,
    /// Operational pattern label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operational_pattern: Option<String>,
    /// Edit rate of the file package's essence track.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_rate: Option<String>,
    /// Number of header metadata sets.
    pub metadata_sets: usize,
    /// Partitions in file order.
    pub partitions: Vec<PartitionInfo>,
    /// Essence descriptors in file order.
    pub descriptors: Vec<DescriptorInfo>,
}

/// Inspect a track file.
#[derive(Args, Debug)]
pub struct CmdInfo {
    /// Path to the track file.
    pub file: PathBuf,

    /// Output in JSON format.
    #[arg(long)]
    pub json: bool,
}

impl CmdInfo {
    /// Execute the info command.
    pub fn run(&self, config: &ReaderConfig) -> anyhow::Result<()> {
        let reader = super::open_reader(&self.file, config.clone())?;
        let info = self.analyze(&reader)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print_track_file_info(&info);
        }
        Ok(())
    }

    fn analyze<P: ResourceByteRangeProvider>(
        &self,
        reader: &MxfEssenceReader<P>,
    ) -> anyhow::Result<TrackFileInfo> {
        let rip = reader.random_index_pack()?;
        let partitions = reader.partition_packs(&rip)?;
        let header = reader.header_partition(&rip, &partitions)?;

        Ok(TrackFileInfo {
            file: self.file.display().to_string(),
            size_bytes: reader.provider().resource_size(),
            track_file_id: header.track_file_id().map(|id| uuid_to_urn(&id)),
            operational_pattern: header
                .preface()
                .and_then(|(_, preface)| preface.operational_pattern)
                .map(|ul| ul.to_string()),
            edit_rate: essence_edit_rate(&header),
            metadata_sets: header.objects().len(),
            partitions: partitions.iter().map(partition_info).collect(),
            descriptors: header
                .essence_descriptors()
                .into_iter()
                .map(|object| DescriptorInfo {
                    set: object.set.name().to_string(),
                    instance_uid: uuid_to_urn(&object.instance_uid),
                    sample_rate: object
                        .as_descriptor()
                        .and_then(|d| d.sample_rate)
                        .map(|r| r.to_string()),
                    sub_descriptors: header
                        .sub_descriptors(object)
                        .iter()
                        .map(|sub| sub.set.name().to_string())
                        .collect(),
                })
                .collect(),
        })
    }
}

fn partition_info(pack: &PartitionPack) -> PartitionInfo {
    PartitionInfo {
        offset: pack.byte_offset,
        kind: format!("{:?}", pack.kind).to_lowercase(),
        status: format!("{:?}", pack.status),
        body_sid: pack.body_sid,
        index_sid: pack.index_sid,
        header_byte_count: pack.header_byte_count,
    }
}

/// Edit rate of the first essence track of the file package.
fn essence_edit_rate(header: &HeaderPartition) -> Option<String> {
    let (_, package) = header.file_package()?;
    header
        .tracks(package)
        .into_iter()
        .map(|(_, track)| track)
        .find(|track| track.track_number.unwrap_or(0) != 0)
        .and_then(|track| track.edit_rate)
        .map(|rate| rate.to_string())
}

fn print_track_file_info(info: &TrackFileInfo) {
    println!();
    println!("{}", style("Track File").cyan().bold());
    println!();

    println!("  {:<20} {}", style("File:").white(), info.file);
    println!(
        "  {:<20} {}",
        style("Size:").white(),
        format_size(info.size_bytes)
    );
    if let Some(id) = &info.track_file_id {
        println!("  {:<20} {}", style("Track File ID:").white(), id);
    }
    if let Some(op) = &info.operational_pattern {
        println!("  {:<20} {}", style("Pattern:").white(), op);
    }
    if let Some(rate) = &info.edit_rate {
        println!("  {:<20} {}", style("Edit Rate:").white(), rate);
    }
    println!(
        "  {:<20} {}",
        style("Metadata Sets:").white(),
        info.metadata_sets
    );

    println!();
    println!("{}", style("Partitions:").cyan().bold());
    for partition in &info.partitions {
        println!(
            "  {:>12}  {:<7} {:<17} body_sid={} index_sid={}",
            partition.offset,
            style(&partition.kind).yellow(),
            partition.status,
            partition.body_sid,
            partition.index_sid
        );
    }

    if !info.descriptors.is_empty() {
        println!();
        println!("{}", style("Descriptors:").cyan().bold());
        for descriptor in &info.descriptors {
            println!();
            println!(
                "  {} {}",
                style(&descriptor.set).yellow(),
                style(&descriptor.instance_uid).dim()
            );
            if let Some(rate) = &descriptor.sample_rate {
                println!("    {:<18} {}", style("Sample Rate:").dim(), rate);
            }
            for sub in &descriptor.sub_descriptors {
                println!("    {:<18} {}", style("Sub-descriptor:").dim(), sub);
            }
        }
    }

    println!();
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_missing_file() {
        let cmd = CmdInfo {
            file: PathBuf::from("/nonexistent/track.mxf"),
            json: true,
        };
        let err = cmd.run(&ReaderConfig::default()).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
