//! Virtual track resources and timeline equivalence.
//!
//! Models the track file resources a composition playlist plays and decides
//! whether two virtual tracks play the same source content, however their
//! resource lists are split.
//!
//! # Example
//!
//! ```
//! use imf_core::Rational;
//! use imf_cpl::{EditResource, SequenceType, VirtualTrack};
//! use uuid::Uuid;
//!
//! let file = Uuid::new_v4();
//! let encoding = Uuid::new_v4();
//! let rate = Rational::edit_rate(24000, 1001)?;
//!
//! // One 100-unit resource
//! let whole = VirtualTrack::new(
//!     Uuid::new_v4(),
//!     SequenceType::MainImage,
//!     vec![EditResource::new(file, encoding, rate, 0, 100)?],
//! )?;
//!
//! // The same content cut into two
//! let split = VirtualTrack::new(
//!     Uuid::new_v4(),
//!     SequenceType::MainImage,
//!     vec![
//!         EditResource::new(file, encoding, rate, 0, 50)?,
//!         EditResource::new(file, encoding, rate, 50, 50)?,
//!     ],
//! )?;
//!
//! assert!(whole.equivalent(&split));
//! # Ok::<(), imf_cpl::CplError>(())
//! ```

mod error;
mod resource;
pub mod sequencer;
mod track;

pub use error::{CplError, Result};
pub use resource::{EditResource, ResourceIdTuple};
pub use sequencer::{Divergence, Equivalence, Run, Span};
pub use track::{distinct_tracks, SequenceType, VirtualTrack};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
