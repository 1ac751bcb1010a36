//! UUID helpers for the `urn:uuid:` form used by IMF documents.

use crate::error::{Error, Result};
use uuid::Uuid;

const UUID_URN_PREFIX: &str = "urn:uuid:";

/// Parse a UUID given either as a `urn:uuid:` URN or as a bare UUID string.
///
/// The prefix is matched case-insensitively.
pub fn parse_uuid_urn(value: &str) -> Result<Uuid> {
    let trimmed = value.trim();
    let bare = match trimmed.get(..UUID_URN_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(UUID_URN_PREFIX) => {
            &trimmed[UUID_URN_PREFIX.len()..]
        }
        _ => trimmed,
    };
    Uuid::parse_str(bare).map_err(|_| Error::InvalidUrn(value.to_string()))
}

/// Format a UUID as a lowercase `urn:uuid:` URN.
pub fn uuid_to_urn(uuid: &Uuid) -> String {
    format!("{}{}", UUID_URN_PREFIX, uuid.hyphenated())
}
