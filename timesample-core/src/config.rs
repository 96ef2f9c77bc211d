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

//! Configuration for the sample counting core.
//!
//! The UTC offset is process-wide: bucket derivation and increment-time
//! hour/day attribution must agree, so both read it from here. Named
//! timezones (DST) are intentionally unsupported.

use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Default upper bound for a single storage call.
pub const DEFAULT_OP_TIMEOUT_MS: u64 = 5_000;

/// Largest representable offset, one minute short of a full day.
const MAX_OFFSET_MINUTES: i32 = 23 * 60 + 59;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Fixed minutes east of UTC for day-bucket and hour attribution.
    pub utc_offset_minutes: i32,

    /// Storage call timeout in milliseconds; expiry surfaces as
    /// `StoreUnavailable`.
    pub op_timeout_ms: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            utc_offset_minutes: 0,
            op_timeout_ms: DEFAULT_OP_TIMEOUT_MS,
        }
    }
}

impl SampleConfig {
    /// UTC buckets with default timeouts.
    pub fn utc() -> Self {
        Self::default()
    }

    pub fn with_offset_minutes(minutes: i32) -> Self {
        SampleConfig {
            utc_offset_minutes: minutes,
            ..Self::default()
        }
    }

    pub fn offset(&self) -> FixedOffset {
        let minutes = self
            .utc_offset_minutes
            .clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        FixedOffset::east_opt(minutes * 60).expect("clamped offset is within bounds")
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_utc() {
        let config = SampleConfig::default();
        assert_eq!(config.offset().local_minus_utc(), 0);
        assert_eq!(config.op_timeout(), Duration::from_millis(5_000));
    }

    #[test]
    fn offset_is_clamped_to_a_day() {
        let config = SampleConfig::with_offset_minutes(10_000);
        assert_eq!(config.offset().local_minus_utc(), MAX_OFFSET_MINUTES * 60);
        let config = SampleConfig::with_offset_minutes(-10_000);
        assert_eq!(config.offset().local_minus_utc(), -MAX_OFFSET_MINUTES * 60);
    }

    #[test]
    fn half_hour_offsets_are_representable() {
        let config = SampleConfig::with_offset_minutes(330); // UTC+5:30
        assert_eq!(config.offset().local_minus_utc(), 330 * 60);
    }
}
