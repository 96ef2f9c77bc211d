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

//! Day-bucket derivation.
//!
//! Counter records are partitioned by the calendar day on which their
//! identifiers were created. The bucket key is the identifier's embedded
//! creation time truncated to start of day in a process-wide fixed UTC
//! offset, formatted `%Y-%m-%d` so keys sort lexicographically in date
//! order. The offset must come from configuration, never vary per call.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::SampleId;

/// Day-granularity partition key for counter records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketKey(String);

impl BucketKey {
    pub fn from_date(date: NaiveDate) -> Self {
        BucketKey(date.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for BucketKey {
    fn from(date: NaiveDate) -> Self {
        BucketKey::from_date(date)
    }
}

/// Bucket for an identifier: its creation day in the given offset.
///
/// Identical identifiers always derive the same bucket; identifiers created
/// on the same calendar day derive the same bucket regardless of
/// time-of-day. Parse failures surface earlier, from [`SampleId::parse`].
pub fn derive_bucket(id: &SampleId, offset: FixedOffset) -> BucketKey {
    BucketKey::from_date(id.created_at().with_timezone(&offset).date_naive())
}

/// Calendar day of `now` in the bucket offset, for daily records.
pub fn day_of(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Hour slot (0-23) of `now` in the bucket offset.
pub fn hour_of(now: DateTime<Utc>, offset: FixedOffset) -> u32 {
    now.with_timezone(&offset).hour()
}
