//! Essence descriptor projection command.

use clap::Args;
use imf_mxf::ReaderConfig;
use std::path::PathBuf;

/// Print the essence descriptors of a track file as RegXML fragments.
#[derive(Args, Debug)]
pub struct CmdDescriptors {
    /// Path to the track file.
    pub file: PathBuf,

    /// Fail on sets or properties missing from the registry.
    #[arg(long)]
    pub strict: bool,

    /// Output a JSON array of fragments.
    #[arg(long)]
    pub json: bool,
}

impl CmdDescriptors {
    /// Execute the descriptors command.
    pub fn run(&self, config: ReaderConfig) -> anyhow::Result<()> {
        let config = if self.strict {
            config.with_strict_registry(true)
        } else {
            config
        };
        let reader = super::open_reader(&self.file, config)?;
        let fragments = reader.essence_descriptors()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&fragments)?);
        } else {
            for fragment in &fragments {
                println!("{}", fragment);
            }
        }
        Ok(())
    }
}
