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

//! Storage collaborator boundary.
//!
//! The counter store needs exactly two primitives from its backing store:
//! upsert-with-atomic-nested-increment and filtered reads by
//! (type, buckets, day filter). Any persistent key-value or document store
//! providing both satisfies this trait; [`crate::MemoryCounterStore`] is the
//! in-process implementation. Whole-record replacement is deliberately
//! absent from the trait: counters are append-only via increments.

use async_trait::async_trait;
use timesample_core::{BucketKey, CounterRecord, DayFilter, RecordKey, Result, SampleId};

/// One nested-counter increment against a single record.
#[derive(Debug, Clone)]
pub struct IncrementOp {
    pub key: RecordKey,
    pub id: SampleId,
    /// Hour slot 0-23, attributed at increment time.
    pub hour: u32,
    pub amount: u64,
}

/// Whether an upsert hit an existing record or created one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Matched,
    Created,
}

#[async_trait]
pub trait CounterBackend: Send + Sync + 'static {
    /// Apply a batch of upsert-increments in one round trip.
    ///
    /// The batch is unordered and not atomic as a whole: items fail
    /// independently and the result list is positionally aligned with
    /// `ops`. Each applied op must co-increment the entry's `total` and
    /// `hours[hour]` atomically with respect to concurrent increments on
    /// the same record, creating record and entry if absent.
    async fn apply_batch(&self, ops: Vec<IncrementOp>) -> Vec<Result<UpsertOutcome>>;

    /// Records of `sample_type` whose bucket is in `buckets`, narrowed by
    /// the day filter. The bucket set bounds the scan to relevant days.
    async fn read_buckets(
        &self,
        sample_type: &str,
        buckets: &[BucketKey],
        days: DayFilter,
    ) -> Result<Vec<CounterRecord>>;

    /// Records of `sample_type` across all buckets, optionally restricted
    /// to an inclusive bucket range, narrowed by the day filter. Used by
    /// ranking, which has no identifier set to bound the scan.
    async fn scan_type(
        &self,
        sample_type: &str,
        bucket_range: Option<(BucketKey, BucketKey)>,
        days: DayFilter,
    ) -> Result<Vec<CounterRecord>>;
}
