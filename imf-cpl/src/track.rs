//! Virtual tracks of a composition playlist.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use imf_core::Rational;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::{CplError, Result};
use crate::resource::{EditResource, ResourceIdTuple};
use crate::sequencer::{self, Equivalence};

/// Kind of content a virtual track carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SequenceType {
    MainImage,
    MainAudio,
    Subtitles,
    HearingImpairedCaptions,
    VisuallyImpairedText,
    Commentary,
    Karaoke,
    ForcedNarrative,
    AncillaryData,
    Marker,
    /// A sequence this library has no model for, kept by name.
    Unknown(String),
}

const NAMES: &[(&str, SequenceType)] = &[
    ("MainImageSequence", SequenceType::MainImage),
    ("MainAudioSequence", SequenceType::MainAudio),
    ("SubtitlesSequence", SequenceType::Subtitles),
    ("HearingImpairedCaptionsSequence", SequenceType::HearingImpairedCaptions),
    ("VisuallyImpairedTextSequence", SequenceType::VisuallyImpairedText),
    ("CommentarySequence", SequenceType::Commentary),
    ("KaraokeSequence", SequenceType::Karaoke),
    ("ForcedNarrativeSequence", SequenceType::ForcedNarrative),
    ("AncillaryDataSequence", SequenceType::AncillaryData),
    ("MarkerSequence", SequenceType::Marker),
];

impl SequenceType {
    /// Element name used in playlists.
    pub fn name(&self) -> &str {
        match self {
            SequenceType::Unknown(name) => name,
            known => NAMES
                .iter()
                .find(|(_, t)| t == known)
                .map(|(name, _)| *name)
                .unwrap_or("Unknown"),
        }
    }

    pub fn is_essence(&self) -> bool {
        !matches!(self, SequenceType::Marker | SequenceType::Unknown(_))
    }
}

impl FromStr for SequenceType {
    type Err = CplError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(CplError::InvalidSequenceType(s.into()));
        }
        Ok(NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, t)| t.clone())
            .unwrap_or_else(|| SequenceType::Unknown(s.into())))
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SequenceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A playlist timeline built from ordered track file resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualTrack {
    id: Uuid,
    sequence_type: SequenceType,
    resources: Vec<EditResource>,
}

impl VirtualTrack {
    pub fn new(id: Uuid, sequence_type: SequenceType, resources: Vec<EditResource>) -> Result<Self> {
        if resources.is_empty() {
            return Err(CplError::EmptyTrack { id });
        }
        Ok(Self {
            id,
            sequence_type,
            resources,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sequence_type(&self) -> &SequenceType {
        &self.sequence_type
    }

    pub fn resources(&self) -> &[EditResource] {
        &self.resources
    }

    /// Track file and encoding of every resource, in order.
    pub fn resource_ids(&self) -> Vec<ResourceIdTuple> {
        self.resources.iter().map(|r| r.resource_id()).collect()
    }

    /// Distinct track files, in order of first use.
    pub fn track_file_ids(&self) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.resources
            .iter()
            .map(|r| r.track_file_id())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Total timeline duration in seconds.
    pub fn duration_seconds(&self) -> Result<Rational> {
        self.resources
            .iter()
            .try_fold(Rational::zero(), |total, r| Ok(total + r.duration_seconds()?))
    }

    /// Whether both tracks play the same source content in the same order.
    pub fn equivalent(&self, other: &VirtualTrack) -> bool {
        self.compare(other).equivalent
    }

    /// Compare with another track, reporting where they first diverge.
    pub fn compare(&self, other: &VirtualTrack) -> Equivalence {
        sequencer::compare(&self.resources, &other.resources)
    }
}

/// Drop tracks equivalent to an earlier track of the same sequence type.
pub fn distinct_tracks(tracks: &[VirtualTrack]) -> Vec<&VirtualTrack> {
    let mut kept: Vec<&VirtualTrack> = Vec::new();
    for track in tracks {
        let duplicate = kept
            .iter()
            .find(|k| k.sequence_type == track.sequence_type && k.equivalent(track));
        match duplicate {
            Some(original) => tracing::debug!(
                track = %track.id,
                original = %original.id,
                "Skipping equivalent virtual track"
            ),
            None => kept.push(track),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(id: Uuid, entry: u64, duration: u64) -> EditResource {
        EditResource::new(id, Uuid::nil(), Rational::edit_rate(24, 1).unwrap(), entry, duration).unwrap()
    }

    #[test]
    fn test_sequence_type_names() {
        let t: SequenceType = "MainAudioSequence".parse().unwrap();
        assert_eq!(t, SequenceType::MainAudio);
        assert_eq!(t.to_string(), "MainAudioSequence");

        let custom: SequenceType = "IABSequence".parse().unwrap();
        assert_eq!(custom, SequenceType::Unknown("IABSequence".into()));
        assert_eq!(custom.name(), "IABSequence");
        assert!(!custom.is_essence());
        assert!("".parse::<SequenceType>().is_err());
    }

    #[test]
    fn test_empty_track_rejected() {
        let id = Uuid::new_v4();
        assert_eq!(
            VirtualTrack::new(id, SequenceType::MainImage, Vec::new()),
            Err(CplError::EmptyTrack { id })
        );
    }

    #[test]
    fn test_track_queries() {
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();
        let track = VirtualTrack::new(
            Uuid::new_v4(),
            SequenceType::MainImage,
            vec![res(t1, 0, 24), res(t2, 0, 48), res(t1, 24, 24)],
        )
        .unwrap();
        assert_eq!(track.track_file_ids(), vec![t1, t2]);
        assert_eq!(track.resource_ids().len(), 3);
        assert_eq!(track.duration_seconds().unwrap(), Rational::from_int(4));
    }

    #[test]
    fn test_distinct_tracks() {
        let t1 = Uuid::new_v4();
        let a = VirtualTrack::new(Uuid::new_v4(), SequenceType::MainImage, vec![res(t1, 0, 48)]).unwrap();
        let b = VirtualTrack::new(
            Uuid::new_v4(),
            SequenceType::MainImage,
            vec![res(t1, 0, 24), res(t1, 24, 24)],
        )
        .unwrap();
        let c = VirtualTrack::new(Uuid::new_v4(), SequenceType::MainAudio, vec![res(t1, 0, 48)]).unwrap();

        let tracks = [a, b, c];
        let kept = distinct_tracks(&tracks);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id(), tracks[0].id());
        assert_eq!(kept[1].id(), tracks[2].id());
    }
}
