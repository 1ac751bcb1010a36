//! CLI subcommand implementations.

pub mod completions;
pub mod descriptors;
pub mod info;
pub mod validate;

pub use completions::CmdCompletions;
pub use descriptors::CmdDescriptors;
pub use info::CmdInfo;
pub use validate::CmdValidate;

use anyhow::Context;
use imf_mxf::{FileByteRangeProvider, MxfEssenceReader, ReaderConfig};
use std::path::Path;

/// Open a track file for reading.
pub(crate) fn open_reader(
    file: &Path,
    config: ReaderConfig,
) -> anyhow::Result<MxfEssenceReader<FileByteRangeProvider>> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let provider = FileByteRangeProvider::with_config(file, &config)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    Ok(MxfEssenceReader::new(provider, config)?)
}
