//! Metadata registry: set and property definitions for XML projection
//!
//! The registry maps set keys to group definitions and property labels to
//! item definitions (XML symbol and value type). Groups inherit items from
//! their parent group. The built-in table covers the SMPTE essence
//! descriptor and sub-descriptor families; an external, versioned table can
//! be loaded from JSON instead. Registries are immutable once built.

use crate::error::{MxfError, Result};
use crate::ul::{elements, labels, UniversalLabel, UL};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Namespace of the built-in element symbols
pub const DEFAULT_NAMESPACE: &str = "http://www.smpte-ra.org/reg/395/2014/13/1-aaf";

/// Value layout of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int32,
    Int64,
    Boolean,
    Rational,
    Uuid,
    Ul,
    Umid,
    Utf16String,
    Timestamp,
    Version,
    StrongRef,
    StrongRefArray,
    UlBatch,
    Bytes,
}

/// One property definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub ul: UniversalLabel,
    pub symbol: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

/// One set definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Set key; abstract groups have none
    #[serde(default)]
    pub ul: Option<UniversalLabel>,
    pub symbol: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

/// Registry of group and item definitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub version: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub groups: Vec<GroupDefinition>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Registry {
    /// Build a registry, checking that every parent group exists
    pub fn new(version: impl Into<String>, groups: Vec<GroupDefinition>) -> Result<Self> {
        let registry = Registry {
            version: version.into(),
            namespace: default_namespace(),
            groups,
        };
        registry.check()?;
        Ok(registry)
    }

    /// Load a registry from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let registry: Registry = serde_json::from_str(text)?;
        registry.check()?;
        tracing::debug!(
            version = %registry.version,
            groups = registry.groups.len(),
            "Loaded registry"
        );
        Ok(registry)
    }

    /// Load a registry from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            MxfError::Registry(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json(&text)
    }

    fn check(&self) -> Result<()> {
        let mut symbols = HashSet::new();
        for group in &self.groups {
            if !symbols.insert(group.symbol.as_str()) {
                return Err(MxfError::Registry(format!(
                    "group {} defined twice",
                    group.symbol
                )));
            }
        }
        for group in &self.groups {
            if let Some(parent) = &group.parent {
                if !symbols.contains(parent.as_str()) {
                    return Err(MxfError::Registry(format!(
                        "group {} has unknown parent {}",
                        group.symbol, parent
                    )));
                }
            }
        }
        Ok(())
    }

    /// Group whose key matches `key`, ignoring the version byte
    pub fn group(&self, key: &UniversalLabel) -> Option<&GroupDefinition> {
        self.groups
            .iter()
            .find(|g| g.ul.map(|ul| ul.matches(key.as_bytes())).unwrap_or(false))
    }

    /// Group by XML symbol
    pub fn group_by_symbol(&self, symbol: &str) -> Option<&GroupDefinition> {
        self.groups.iter().find(|g| g.symbol == symbol)
    }

    /// Items of a group including inherited ones, ancestors first
    pub fn items<'a>(&'a self, group: &'a GroupDefinition) -> Vec<&'a ItemDefinition> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(group);
        while let Some(g) = current {
            if !seen.insert(g.symbol.as_str()) {
                break;
            }
            chain.push(g);
            current = g.parent.as_deref().and_then(|p| self.group_by_symbol(p));
        }
        chain.iter().rev().flat_map(|g| g.items.iter()).collect()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if the registry defines no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The process-wide built-in registry
pub fn default_registry() -> &'static Registry {
    static DEFAULT: OnceLock<Registry> = OnceLock::new();
    DEFAULT.get_or_init(builtin)
}

fn item(ul: UL, symbol: &str, item_type: ItemType) -> ItemDefinition {
    ItemDefinition {
        ul: UniversalLabel(ul),
        symbol: symbol.to_string(),
        item_type,
    }
}

fn group(ul: Option<UL>, symbol: &str, parent: Option<&str>, items: Vec<ItemDefinition>) -> GroupDefinition {
    GroupDefinition {
        ul: ul.map(UniversalLabel),
        symbol: symbol.to_string(),
        parent: parent.map(str::to_string),
        items,
    }
}

fn builtin() -> Registry {
    use ItemType::*;

    let groups = vec![
        group(
            None,
            "InterchangeObject",
            None,
            vec![
                item(elements::INSTANCE_UID, "InstanceID", Uuid),
                item(elements::GENERATION_UID, "GenerationID", Uuid),
            ],
        ),
        group(
            None,
            "GenericDescriptor",
            Some("InterchangeObject"),
            vec![
                item(elements::LOCATORS, "Locators", StrongRefArray),
                item(elements::SUB_DESCRIPTORS, "SubDescriptors", StrongRefArray),
            ],
        ),
        group(
            Some(labels::FILE_DESCRIPTOR),
            "FileDescriptor",
            Some("GenericDescriptor"),
            vec![
                item(elements::LINKED_TRACK_ID, "LinkedTrackID", UInt32),
                item(elements::SAMPLE_RATE, "SampleRate", Rational),
                item(elements::CONTAINER_DURATION, "ContainerDuration", Int64),
                item(elements::ESSENCE_CONTAINER, "ContainerFormat", Ul),
                item(elements::CODEC, "Codec", Ul),
            ],
        ),
        group(
            Some(labels::GENERIC_PICTURE_DESCRIPTOR),
            "GenericPictureEssenceDescriptor",
            Some("FileDescriptor"),
            vec![
                item(elements::FRAME_LAYOUT, "FrameLayout", UInt8),
                item(elements::STORED_WIDTH, "StoredWidth", UInt32),
                item(elements::STORED_HEIGHT, "StoredHeight", UInt32),
                item(elements::DISPLAY_WIDTH, "DisplayWidth", UInt32),
                item(elements::DISPLAY_HEIGHT, "DisplayHeight", UInt32),
                item(elements::ASPECT_RATIO, "ImageAspectRatio", Rational),
                item(elements::TRANSFER_CHARACTERISTIC, "TransferCharacteristic", Ul),
                item(elements::COLOR_PRIMARIES, "ColorPrimaries", Ul),
                item(elements::CODING_EQUATIONS, "CodingEquations", Ul),
                item(elements::PICTURE_ESSENCE_CODING, "PictureCompression", Ul),
            ],
        ),
        group(
            Some(labels::CDCI_DESCRIPTOR),
            "CDCIDescriptor",
            Some("GenericPictureEssenceDescriptor"),
            vec![
                item(elements::COMPONENT_DEPTH, "ComponentDepth", UInt32),
                item(elements::HORIZONTAL_SUBSAMPLING, "HorizontalSubsampling", UInt32),
                item(elements::VERTICAL_SUBSAMPLING, "VerticalSubsampling", UInt32),
                item(elements::COLOR_SITING, "ColorSiting", UInt8),
            ],
        ),
        group(
            Some(labels::RGBA_DESCRIPTOR),
            "RGBADescriptor",
            Some("GenericPictureEssenceDescriptor"),
            vec![
                item(elements::COMPONENT_MAX_REF, "ComponentMaxRef", UInt32),
                item(elements::COMPONENT_MIN_REF, "ComponentMinRef", UInt32),
            ],
        ),
        group(
            Some(labels::GENERIC_SOUND_DESCRIPTOR),
            "GenericSoundEssenceDescriptor",
            Some("FileDescriptor"),
            vec![
                item(elements::AUDIO_SAMPLING_RATE, "AudioSampleRate", Rational),
                item(elements::LOCKED, "Locked", Boolean),
                item(elements::CHANNEL_COUNT, "ChannelCount", UInt32),
                item(elements::QUANTIZATION_BITS, "QuantizationBits", UInt32),
                item(elements::SOUND_ESSENCE_CODING, "SoundCompression", Ul),
            ],
        ),
        group(
            Some(labels::WAVE_AUDIO_DESCRIPTOR),
            "WAVEPCMDescriptor",
            Some("GenericSoundEssenceDescriptor"),
            vec![
                item(elements::BLOCK_ALIGN, "BlockAlign", UInt16),
                item(elements::AVERAGE_BYTES_PER_SECOND, "AverageBytesPerSecond", UInt32),
                item(elements::CHANNEL_ASSIGNMENT, "ChannelAssignment", Ul),
            ],
        ),
        group(
            Some(labels::AES3_AUDIO_DESCRIPTOR),
            "AES3PCMDescriptor",
            Some("WAVEPCMDescriptor"),
            Vec::new(),
        ),
        group(
            Some(labels::GENERIC_DATA_DESCRIPTOR),
            "GenericDataEssenceDescriptor",
            Some("FileDescriptor"),
            Vec::new(),
        ),
        group(
            Some(labels::MULTIPLE_DESCRIPTOR),
            "MultipleDescriptor",
            Some("FileDescriptor"),
            vec![item(elements::FILE_DESCRIPTORS, "FileDescriptors", StrongRefArray)],
        ),
        group(None, "SubDescriptor", Some("InterchangeObject"), Vec::new()),
        group(
            Some(labels::JPEG2000_SUB_DESCRIPTOR),
            "JPEG2000SubDescriptor",
            Some("SubDescriptor"),
            vec![
                item(elements::J2K_RSIZ, "Rsiz", UInt16),
                item(elements::J2K_XSIZ, "Xsiz", UInt32),
                item(elements::J2K_YSIZ, "Ysiz", UInt32),
                item(elements::J2K_XOSIZ, "XOsiz", UInt32),
                item(elements::J2K_YOSIZ, "YOsiz", UInt32),
                item(elements::J2K_XTSIZ, "XTsiz", UInt32),
                item(elements::J2K_YTSIZ, "YTsiz", UInt32),
                item(elements::J2K_CSIZ, "Csiz", UInt16),
            ],
        ),
        group(
            None,
            "MCALabelSubDescriptor",
            Some("SubDescriptor"),
            vec![
                item(elements::MCA_LABEL_DICTIONARY_ID, "MCALabelDictionaryID", Ul),
                item(elements::MCA_LINK_ID, "MCALinkID", Uuid),
                item(elements::MCA_TAG_SYMBOL, "MCATagSymbol", Utf16String),
                item(elements::MCA_TAG_NAME, "MCATagName", Utf16String),
                item(elements::MCA_CHANNEL_ID, "MCAChannelID", UInt32),
            ],
        ),
        group(
            Some(labels::AUDIO_CHANNEL_LABEL_SUB_DESCRIPTOR),
            "AudioChannelLabelSubDescriptor",
            Some("MCALabelSubDescriptor"),
            vec![item(elements::SOUNDFIELD_GROUP_LINK_ID, "SoundfieldGroupLinkID", Uuid)],
        ),
        group(
            Some(labels::SOUNDFIELD_GROUP_LABEL_SUB_DESCRIPTOR),
            "SoundfieldGroupLabelSubDescriptor",
            Some("MCALabelSubDescriptor"),
            Vec::new(),
        ),
        group(
            Some(labels::GROUP_OF_SOUNDFIELD_GROUPS_LABEL_SUB_DESCRIPTOR),
            "GroupOfSoundfieldGroupsLabelSubDescriptor",
            Some("MCALabelSubDescriptor"),
            Vec::new(),
        ),
    ];

    Registry {
        version: "builtin-1".to_string(),
        namespace: default_namespace(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_inheritance() {
        let registry = default_registry();
        let cdci = registry
            .group(&UniversalLabel(labels::CDCI_DESCRIPTOR))
            .unwrap();
        assert_eq!(cdci.symbol, "CDCIDescriptor");

        let symbols: Vec<&str> = registry
            .items(cdci)
            .iter()
            .map(|i| i.symbol.as_str())
            .collect();
        assert_eq!(symbols[0], "InstanceID");
        assert!(symbols.contains(&"SampleRate"));
        assert!(symbols.contains(&"StoredWidth"));
        assert_eq!(symbols.last(), Some(&"ColorSiting"));
    }

    #[test]
    fn test_group_lookup_ignores_version() {
        let mut key = labels::WAVE_AUDIO_DESCRIPTOR;
        key[7] = 0x02;
        let group = default_registry().group(&UniversalLabel(key)).unwrap();
        assert_eq!(group.symbol, "WAVEPCMDescriptor");
        assert!(default_registry()
            .group(&UniversalLabel(labels::PREFACE))
            .is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let json = default_registry().to_json().unwrap();
        let loaded = Registry::from_json(&json).unwrap();
        assert_eq!(&loaded, default_registry());
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let json = r#"{
            "version": "test",
            "groups": [{ "symbol": "Child", "parent": "Missing", "items": [] }]
        }"#;
        assert!(matches!(Registry::from_json(json), Err(MxfError::Registry(_))));
    }

    #[test]
    fn test_json_item_types() {
        let json = r#"{
            "version": "2",
            "groups": [{
                "ul": "urn:smpte:ul:060e2b34.02530101.0d010101.01012900",
                "symbol": "Picture",
                "items": [{
                    "ul": "urn:smpte:ul:060e2b34.01010101.04010502.02000000",
                    "symbol": "Width",
                    "type": "UInt32"
                }]
            }]
        }"#;
        let registry = Registry::from_json(json).unwrap();
        assert_eq!(registry.namespace, DEFAULT_NAMESPACE);
        let group = registry.group(&UniversalLabel(labels::RGBA_DESCRIPTOR)).unwrap();
        assert_eq!(registry.items(group)[0].item_type, ItemType::UInt32);
    }
}
