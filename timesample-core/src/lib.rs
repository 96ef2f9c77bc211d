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

//! Timesample Core
//!
//! Fundamental types for time-bucketed sample counting: identifiers with an
//! embedded creation time, day-bucket derivation, counter records, and the
//! workspace-wide error taxonomy.

pub mod bucket;
pub mod config;
pub mod error;
pub mod id;
pub mod record;

pub use bucket::{day_of, derive_bucket, hour_of, BucketKey};
pub use config::{SampleConfig, DEFAULT_OP_TIMEOUT_MS};
pub use error::{Result, SampleError};
pub use id::{SampleId, SAMPLE_ID_LEN};
pub use record::{CounterEntry, CounterRecord, DayFilter, RecordKey, HOURS_PER_DAY};
