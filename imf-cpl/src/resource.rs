//! Track file resources referenced from a virtual track.

use imf_core::{parse_uuid_urn, EditRate, Rational};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{CplError, Result};

/// Track file and source encoding a resource points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceIdTuple {
    pub track_file_id: Uuid,
    pub source_encoding: Uuid,
}

/// A contiguous slice of a track file, played `repeat_count` times.
///
/// Positions are counted in edit units of `edit_rate`. Construction checks
/// every invariant, so a resource that exists is always comparable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResource {
    track_file_id: Uuid,
    source_encoding: Uuid,
    edit_rate: EditRate,
    entry_point: u64,
    duration: u64,
    repeat_count: u64,
    intrinsic_duration: Option<u64>,
    #[serde(skip)]
    source_start: Rational,
    #[serde(skip)]
    source_end: Rational,
}

impl EditResource {
    /// Create a resource played once.
    pub fn new(
        track_file_id: Uuid,
        source_encoding: Uuid,
        edit_rate: EditRate,
        entry_point: u64,
        duration: u64,
    ) -> Result<Self> {
        Self::build(
            track_file_id,
            source_encoding,
            edit_rate,
            entry_point,
            duration,
            1,
            None,
        )
    }

    /// Create a resource from `urn:uuid:` identifiers.
    pub fn from_urns(
        track_file_id: &str,
        source_encoding: &str,
        edit_rate: EditRate,
        entry_point: u64,
        duration: u64,
    ) -> Result<Self> {
        Self::new(
            parse_uuid_urn(track_file_id)?,
            parse_uuid_urn(source_encoding)?,
            edit_rate,
            entry_point,
            duration,
        )
    }

    /// Play the slice `repeat_count` times.
    pub fn with_repeat_count(self, repeat_count: u64) -> Result<Self> {
        Self::build(
            self.track_file_id,
            self.source_encoding,
            self.edit_rate,
            self.entry_point,
            self.duration,
            repeat_count,
            self.intrinsic_duration,
        )
    }

    /// Bound the slice by the track file's intrinsic duration.
    pub fn with_intrinsic_duration(self, intrinsic_duration: u64) -> Result<Self> {
        Self::build(
            self.track_file_id,
            self.source_encoding,
            self.edit_rate,
            self.entry_point,
            self.duration,
            self.repeat_count,
            Some(intrinsic_duration),
        )
    }

    fn build(
        track_file_id: Uuid,
        source_encoding: Uuid,
        edit_rate: EditRate,
        entry_point: u64,
        duration: u64,
        repeat_count: u64,
        intrinsic_duration: Option<u64>,
    ) -> Result<Self> {
        let invalid = |message: String| CplError::InvalidResource {
            track_file_id,
            message,
        };

        if duration == 0 {
            return Err(invalid("duration must be positive".into()));
        }
        if repeat_count == 0 {
            return Err(invalid("repeat count must be positive".into()));
        }
        let edit_rate = Rational::edit_rate(edit_rate.num, edit_rate.den)?;
        let end = entry_point
            .checked_add(duration)
            .ok_or_else(|| invalid("entry point plus duration overflows".into()))?;
        if let Some(intrinsic) = intrinsic_duration {
            if end > intrinsic {
                return Err(invalid(format!(
                    "entry point {} plus duration {} exceeds intrinsic duration {}",
                    entry_point, duration, intrinsic
                )));
            }
        }
        duration
            .checked_mul(repeat_count)
            .ok_or_else(|| invalid("duration times repeat count overflows".into()))?;

        Ok(EditResource {
            track_file_id,
            source_encoding,
            edit_rate,
            entry_point,
            duration,
            repeat_count,
            intrinsic_duration,
            source_start: edit_rate.units_to_seconds(entry_point)?,
            source_end: edit_rate.units_to_seconds(end)?,
        })
    }

    pub fn track_file_id(&self) -> Uuid {
        self.track_file_id
    }

    pub fn source_encoding(&self) -> Uuid {
        self.source_encoding
    }

    pub fn edit_rate(&self) -> EditRate {
        self.edit_rate
    }

    pub fn entry_point(&self) -> u64 {
        self.entry_point
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn repeat_count(&self) -> u64 {
        self.repeat_count
    }

    pub fn intrinsic_duration(&self) -> Option<u64> {
        self.intrinsic_duration
    }

    /// Identifiers of the referenced track file and encoding.
    pub fn resource_id(&self) -> ResourceIdTuple {
        ResourceIdTuple {
            track_file_id: self.track_file_id,
            source_encoding: self.source_encoding,
        }
    }

    /// Edit units this resource occupies on the timeline.
    pub fn timeline_duration(&self) -> u64 {
        // bounded at construction
        self.duration * self.repeat_count
    }

    /// Source position of the first edit unit, in seconds.
    pub fn source_start(&self) -> Rational {
        self.source_start
    }

    /// Source position one past the last edit unit, in seconds.
    pub fn source_end(&self) -> Rational {
        self.source_end
    }

    /// Timeline duration in seconds.
    pub fn duration_seconds(&self) -> Result<Rational> {
        Ok(self.edit_rate.units_to_seconds(self.timeline_duration())?)
    }
}
