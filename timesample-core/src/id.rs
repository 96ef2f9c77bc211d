// Copyright 2025 Timesample Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Sample identifiers.
//!
//! A `SampleId` is an opaque, time-ordered identifier with a fixed layout:
//!
//! ```text
//! bytes [0..4)   big-endian u32, seconds since the Unix epoch (creation time)
//! bytes [4..12)  opaque payload, uniqueness only
//! ```
//!
//! encoded as 24 lowercase hex characters. Only the leading four bytes carry
//! meaning for this crate: they drive day-bucket derivation. The payload is
//! never inspected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SampleError};

/// Encoded identifier length in hex characters (12 bytes).
pub const SAMPLE_ID_LEN: usize = 24;

/// A validated sample identifier. Construction always goes through
/// [`SampleId::parse`] or a generator, so the embedded creation time is
/// available without re-validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleId {
    raw: String,
    created_secs: u32,
}

impl SampleId {
    /// Parse and validate a raw identifier string.
    ///
    /// Uppercase hex is accepted and normalized to lowercase. Fails with
    /// `InvalidIdentifier` if the input is not exactly 24 hex characters.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.len() != SAMPLE_ID_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SampleError::InvalidIdentifier(raw.to_string()));
        }
        let raw = raw.to_ascii_lowercase();
        let created_secs = u32::from_str_radix(&raw[..8], 16)
            .map_err(|_| SampleError::InvalidIdentifier(raw.clone()))?;
        Ok(SampleId { raw, created_secs })
    }

    /// Build an identifier from a creation time and an explicit payload.
    pub fn from_parts(created_at: DateTime<Utc>, payload: [u8; 8]) -> Self {
        let created_secs = created_at.timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        SampleId {
            raw: format!("{:08x}{}", created_secs, hex::encode(payload)),
            created_secs,
        }
    }

    /// Build an identifier with the given creation time and a random payload.
    pub fn generate(created_at: DateTime<Utc>) -> Self {
        Self::from_parts(created_at, rand::random())
    }

    /// The creation time embedded in the identifier, second precision.
    pub fn created_at(&self) -> DateTime<Utc> {
        // u32 seconds always fall inside chrono's supported range
        DateTime::from_timestamp(i64::from(self.created_secs), 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for SampleId {
    type Err = SampleError;

    fn from_str(s: &str) -> Result<Self> {
        SampleId::parse(s)
    }
}

impl Serialize for SampleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for SampleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SampleId::parse(&raw).map_err(D::Error::custom)
    }
}
