//! # IMF Core
//!
//! Core types shared across the IMF crates.
//!
//! This crate provides the small building blocks that both the track file
//! (MXF) layer and the playlist layer depend on:
//! - Error handling types
//! - Exact rational arithmetic for edit rates and source positions
//! - UUID helpers for the `urn:uuid:` form used throughout IMF documents

pub mod error;
pub mod rational;
pub mod urn;

pub use error::{Error, Result};
pub use rational::{EditRate, Rational};
pub use urn::{parse_uuid_urn, uuid_to_urn};
